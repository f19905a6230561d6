use crate::common::file_utils;
use crate::config_loader::MasterConfig;
use crate::core::snapshot_source::{SnapshotFrame, SnapshotSource};
use crate::operations::op_helper;
use crate::shinobi::ShinobiClient;
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Fetches one snapshot per monitor and writes `{mid}_{timestamp}.jpg` to the output directory.
pub async fn handle_snapshot_cli(
    master_config: &MasterConfig,
    client: &ShinobiClient,
    args: &ArgMatches,
) -> Result<()> {
    let op_start_time = Instant::now();
    let operation_display_name = "Snapshot";
    op_helper::require_connection(master_config)?;

    let targets = op_helper::determine_target_monitors(
        master_config,
        args.get_one::<String>("monitors"),
        operation_display_name,
    );
    if targets.is_empty() {
        info!("No monitors selected or enabled for snapshots. Exiting.");
        return Ok(());
    }

    let output_arg = args
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("snapshots");
    let output_dir = file_utils::ensure_output_directory(output_arg)
        .with_context(|| format!("Failed to prepare output directory '{}'", output_arg))?;
    info!("📸 Saving snapshots of {} monitor(s) to {}", targets.len(), output_dir.display());

    let server = Arc::new(master_config.shinobi.server_base().to_string());
    let client = Arc::new(client.clone());
    let timestamp_format = Arc::new(master_config.app_settings.snapshot_timestamp_format.clone());
    let output_dir = Arc::new(output_dir);

    let results = op_helper::run_per_monitor(targets, operation_display_name, move |mid, path| {
        let server = Arc::clone(&server);
        let client = Arc::clone(&client);
        let timestamp_format = Arc::clone(&timestamp_format);
        let output_dir = Arc::clone(&output_dir);
        async move { save_one_snapshot(&client, &server, &mid, &path, &timestamp_format, &output_dir).await }
    })
    .await;

    let saved: Vec<PathBuf> = results.into_iter().filter_map(|(_, r)| r.ok()).collect();
    if saved.is_empty() {
        warn!("🖼️ No snapshots were saved.");
    } else {
        info!("✅ Saved {} snapshot(s) in {:?}:", saved.len(), op_start_time.elapsed());
        for path in saved {
            info!("  -> {}", path.display());
        }
    }
    Ok(())
}

async fn save_one_snapshot(
    client: &ShinobiClient,
    server: &str,
    mid: &str,
    monitor_path: &str,
    timestamp_format: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let metadata = client
        .fetch_metadata(server, monitor_path)
        .await
        .with_context(|| format!("metadata for monitor '{}'", mid))?;
    let bytes = client
        .fetch_snapshot(server, &metadata.snapshot)
        .await
        .with_context(|| format!("snapshot for monitor '{}'", mid))?;

    // refuse to write error pages with a .jpg name
    let frame = SnapshotFrame::decode_jpeg(&bytes)
        .with_context(|| format!("snapshot for monitor '{}'", mid))?;
    debug!("Monitor '{}': {}x{} snapshot, {} bytes.", mid, frame.width, frame.height, bytes.len());

    let filename = file_utils::generate_timestamped_filename(mid, timestamp_format, "jpg");
    let path = output_dir.join(filename);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
