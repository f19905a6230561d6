use anyhow::{bail, Context, Result};
use log::{debug, error, info};
use shinobi_view::common::logging_setup;
use shinobi_view::shinobi::ShinobiClient;
use shinobi_view::{cli, config_loader, operations, ui};
use std::sync::Arc;
use std::time::Instant;

fn main() -> Result<()> {
    let main_start_time = Instant::now();
    let matches = cli::build_cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or(cli::DEFAULT_CONFIG_PATH)
        .to_string();

    let config_load_start_time = Instant::now();
    let mut master_config = match config_loader::load_config(&config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            info!("✅ Configuration loaded from: {} in {:?}", config_path, config_load_start_time.elapsed());
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!("❌ Failed to load configuration from '{}': {:#}. Exiting.", config_path, e);
            return Err(e.context(format!("Failed to load configuration from '{}'", config_path)));
        }
    };

    info!("🚀 Shinobi View starting with {} monitors enabled.", master_config.monitors.len());

    // The window owns the main thread, so network work runs on its own runtime.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("shinobi-net")
        .build()
        .context("Failed to start async runtime")?;
    let client = ShinobiClient::new(&master_config.app_settings).context("Failed to build HTTP client")?;

    if let Some((operation_name, sub_matches)) = matches.subcommand() {
        debug!("🎬 Dispatching to subcommand: {}", operation_name);
        let op_start_time = Instant::now();

        let op_result: Result<()> = runtime.block_on(async {
            match operation_name {
                "list-monitors" => operations::list_monitors_op::handle_list_monitors_cli(&master_config, &client).await,
                "login" => {
                    operations::login_op::handle_login_cli(&mut master_config, &config_path, &client, sub_matches).await
                }
                "snapshot" => operations::snapshot_op::handle_snapshot_cli(&master_config, &client, sub_matches).await,
                "test" => operations::diagnostic_op::handle_diagnostic_cli(&master_config, &client).await,
                _ => bail!("Subcommand '{}' not implemented.", operation_name),
            }
        });

        if let Err(e) = op_result {
            error!("❌ Operation '{}' failed after {:?}: {:#}", operation_name, op_start_time.elapsed(), e);
            return Err(e);
        }
        info!("✅ Operation '{}' completed successfully in {:?}.", operation_name, op_start_time.elapsed());
    } else {
        let fullscreen = matches.get_flag("fullscreen") || master_config.app_settings.fullscreen;
        ui::run_viewer(master_config, config_path, runtime, Arc::new(client), fullscreen)?;
    }

    info!("🏁 Shinobi View finished in {:?}.", main_start_time.elapsed());
    Ok(())
}
