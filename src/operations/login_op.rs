use crate::cli::PASSWORD_ENV_VAR;
use crate::config_loader::{self, MasterConfig};
use crate::shinobi::login::{apply_credentials, LoginRequest};
use crate::shinobi::ShinobiClient;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use log::info;
use std::env;

pub async fn handle_login_cli(
    master_config: &mut MasterConfig,
    config_path: &str,
    client: &ShinobiClient,
    args: &ArgMatches,
) -> Result<()> {
    let server = args
        .get_one::<String>("server")
        .cloned()
        .unwrap_or_else(|| master_config.shinobi.server.clone());
    let email = args
        .get_one::<String>("email")
        .cloned()
        .ok_or_else(|| anyhow!("--email is required"))?;
    let password = env::var(PASSWORD_ENV_VAR)
        .with_context(|| format!("Password not found in environment variable '{}'", PASSWORD_ENV_VAR))?;

    let request = LoginRequest { server, email, password };
    request.validate().map_err(|msg| anyhow!(msg))?;

    let credentials = request.submit(client).await.context("Login failed")?;
    apply_credentials(master_config, &request.server_base(), credentials);
    config_loader::save_config(config_path, master_config)?;
    info!("🔑 Stored API key and group key in '{}'.", config_path);
    Ok(())
}
