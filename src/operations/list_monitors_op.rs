use crate::config_loader::MasterConfig;
use crate::operations::op_helper;
use crate::shinobi::ShinobiClient;
use anyhow::{Context, Result};
use log::info;

pub async fn handle_list_monitors_cli(master_config: &MasterConfig, client: &ShinobiClient) -> Result<()> {
    op_helper::require_connection(master_config)?;
    let shinobi = &master_config.shinobi;
    let monitors = client
        .list_monitors(shinobi.server_base(), &shinobi.api_key, &shinobi.group_key)
        .await
        .context("Failed to list monitors")?;

    if monitors.is_empty() {
        println!("No monitors to show");
        return Ok(());
    }

    println!("{:<4} {:<8} {:<24} {:<24} GROUPS", "#", "ENABLED", "ID", "NAME");
    for (i, monitor) in monitors.iter().enumerate() {
        let enabled = master_config.monitors.iter().position(|m| m == &monitor.mid);
        let enabled_str = enabled.map(|p| format!("yes ({})", p + 1)).unwrap_or_else(|| "no".to_string());
        println!(
            "{:<4} {:<8} {:<24} {:<24} {}",
            i + 1,
            enabled_str,
            monitor.mid,
            monitor.name,
            monitor.groups.join(",")
        );
    }
    info!("📋 Listed {} monitor(s).", monitors.len());
    Ok(())
}
