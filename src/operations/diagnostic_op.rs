use crate::config_loader::MasterConfig;
use crate::core::snapshot_source::{SnapshotFrame, SnapshotSource};
use crate::operations::op_helper;
use crate::shinobi::ShinobiClient;
use anyhow::{bail, Result};
use log::{info, warn, error, debug};
use std::time::Instant;

struct DiagnosticResult {
    test_name: String,
    success: bool,
    details: String,
}

impl DiagnosticResult {
    fn pass(test_name: String, details: String) -> Self {
        DiagnosticResult { test_name, success: true, details }
    }

    fn fail(test_name: String, details: String) -> Self {
        DiagnosticResult { test_name, success: false, details }
    }
}

pub async fn handle_diagnostic_cli(master_config: &MasterConfig, client: &ShinobiClient) -> Result<()> {
    let overall_diag_start_time = Instant::now();
    info!("🩺 Starting diagnostic test suite...");
    op_helper::require_connection(master_config)?;
    let shinobi = &master_config.shinobi;
    let server = shinobi.server_base();
    let mut results: Vec<DiagnosticResult> = Vec::new();

    // 1. Server reachable and keys accepted
    info!("  DIAGNOSTIC [Global]: Listing monitors on {}...", server);
    let list_start = Instant::now();
    let known_ids: Option<Vec<String>> = match client.list_monitors(server, &shinobi.api_key, &shinobi.group_key).await {
        Ok(monitors) => {
            results.push(DiagnosticResult::pass(
                "Monitor list".to_string(),
                format!("{} monitor(s) in {:?}", monitors.len(), list_start.elapsed()),
            ));
            Some(monitors.into_iter().map(|m| m.mid).collect())
        }
        Err(e) => {
            error!("    DIAGNOSTIC [Global]: Monitor list FAILED in {:?}: {}", list_start.elapsed(), e);
            results.push(DiagnosticResult::fail("Monitor list".to_string(), e.to_string()));
            None
        }
    };

    if master_config.monitors.is_empty() {
        warn!("⚠️ DIAGNOSTIC: No monitors enabled. Skipping per-monitor tests.");
    }

    // 2. Per monitor: metadata then one snapshot
    for (mid, path) in master_config.monitor_paths() {
        info!("  DIAGNOSTIC [{}]: Running tests...", mid);
        if let Some(ids) = &known_ids {
            if !ids.contains(&mid) {
                results.push(DiagnosticResult::fail(
                    format!("Enabled ('{}')", mid),
                    "not in the server's monitor list".to_string(),
                ));
            }
        }

        let meta_start = Instant::now();
        let metadata = match client.fetch_metadata(server, &path).await {
            Ok(m) => {
                results.push(DiagnosticResult::pass(
                    format!("Metadata ('{}')", mid),
                    format!("snapshot path {} in {:?}", m.snapshot, meta_start.elapsed()),
                ));
                m
            }
            Err(e) => {
                results.push(DiagnosticResult::fail(format!("Metadata ('{}')", mid), e.to_string()));
                continue;
            }
        };

        let snap_start = Instant::now();
        let snapshot = client
            .fetch_snapshot(server, &metadata.snapshot)
            .await
            .and_then(|bytes| SnapshotFrame::decode_jpeg(&bytes).map(|f| (bytes.len(), f)));
        match snapshot {
            Ok((len, frame)) => {
                debug!("    DIAGNOSTIC [{}]: {} bytes decoded.", mid, len);
                results.push(DiagnosticResult::pass(
                    format!("Snapshot ('{}')", mid),
                    format!("{}x{} JPEG, {} bytes in {:?}", frame.width, frame.height, len, snap_start.elapsed()),
                ));
            }
            Err(e) => {
                results.push(DiagnosticResult::fail(format!("Snapshot ('{}')", mid), e.to_string()));
            }
        }
    }

    info!("📋 ----- Diagnostic Test Summary (Total Suite Time: {:?}) -----", overall_diag_start_time.elapsed());
    let mut overall_success = true;
    for result in results {
        let status_emoji = if result.success { "✅ PASS" } else { "❌ FAIL" };
        info!("Test: {:<40} | Status: {:<10} | Details: {}", result.test_name, status_emoji, result.details);
        if !result.success {
            overall_success = false;
        }
    }
    info!("----------------------------------------------------------------------");
    if overall_success {
        info!("🎉 All diagnostic tests passed.");
        Ok(())
    } else {
        error!("🔥 One or more diagnostic tests failed. Please review logs above.");
        bail!("Diagnostic checks failed")
    }
}
