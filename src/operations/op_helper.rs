use crate::config_loader::MasterConfig;
use anyhow::{bail, Result};
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::future::Future;
use std::time::Instant;

/// Checks that the config can reach a server before an operation starts.
pub fn require_connection(master_config: &MasterConfig) -> Result<()> {
    if master_config.shinobi.server_base().is_empty() {
        bail!("❌ No server configured. Set shinobi.server or run `login --server URL`.");
    }
    if !master_config.has_credentials() {
        bail!("❌ No API key / group key configured. Run `login` first.");
    }
    Ok(())
}

/// Parses a comma-separated list of monitor IDs from the CLI.
pub fn parse_monitor_ids_arg(ids_str_opt: Option<&String>) -> Option<Vec<String>> {
    ids_str_opt.map(|ids_str| {
        ids_str.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    })
}

/// `(monitor id, metadata path)` pairs for the requested monitors, or every
/// enabled monitor when none were requested.
pub fn determine_target_monitors(
    master_config: &MasterConfig,
    ids_arg: Option<&String>,
    operation_display_name: &str,
) -> Vec<(String, String)> {
    let all = master_config.monitor_paths();
    match parse_monitor_ids_arg(ids_arg) {
        Some(ids) => {
            let selected: Vec<(String, String)> = ids
                .iter()
                .filter_map(|id| {
                    let found = all.iter().find(|(mid, _)| mid == id).cloned();
                    if found.is_none() {
                        warn!("⚠️ Monitor '{}' is not enabled in the configuration; skipping it for {}.", id, operation_display_name);
                    }
                    found
                })
                .collect();
            debug!("Selected {} of {} enabled monitor(s) for {}.", selected.len(), all.len(), operation_display_name);
            selected
        }
        None => all,
    }
}

/// Runs `per_monitor_op` for every target on its own task and returns each
/// monitor's result, in target order.
///
/// Failures are logged here; the caller decides whether they are fatal.
pub async fn run_per_monitor<F, Fut, T>(
    targets: Vec<(String, String)>,
    operation_display_name: &str,
    per_monitor_op: F,
) -> Vec<(String, Result<T>)>
where
    F: Fn(String, String) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let start_time = Instant::now();
    info!("🎯 Running {} for {} monitor(s).", operation_display_name, targets.len());

    let mut ids = Vec::with_capacity(targets.len());
    let mut tasks = Vec::with_capacity(targets.len());
    for (mid, path) in targets {
        let op = per_monitor_op.clone();
        ids.push(mid.clone());
        tasks.push(tokio::spawn(async move { op(mid, path).await }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (mid, joined) in ids.into_iter().zip(join_all(tasks).await) {
        let result = match joined {
            Ok(res) => res,
            Err(join_err) => Err(anyhow::anyhow!("task failed: {}", join_err)),
        };
        if let Err(e) = &result {
            error!("❌ {} failed for monitor '{}': {:#}", operation_display_name, mid, e);
        }
        results.push((mid, result));
    }

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();
    if failures == 0 {
        info!("✅ {} finished for all {} monitor(s) in {:?}.", operation_display_name, results.len(), start_time.elapsed());
    } else {
        warn!("⚠️ {} finished with {} error(s) out of {} monitor(s) in {:?}.", operation_display_name, failures, results.len(), start_time.elapsed());
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MasterConfig {
        let mut cfg = MasterConfig::default();
        cfg.shinobi.server = "https://nvr".into();
        cfg.shinobi.api_key = "K".into();
        cfg.shinobi.group_key = "G".into();
        cfg.monitors = vec!["a".into(), "b".into(), "c".into()];
        cfg
    }

    #[test]
    fn parses_ids_ignoring_blanks() {
        let arg = " a, ,b ".to_string();
        assert_eq!(parse_monitor_ids_arg(Some(&arg)), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(parse_monitor_ids_arg(None), None);
    }

    #[test]
    fn targets_only_enabled_monitors() {
        let arg = "c,zzz".to_string();
        let targets = determine_target_monitors(&config(), Some(&arg), "test");
        assert_eq!(targets, vec![("c".to_string(), "/K/monitor/G/c".to_string())]);
        assert_eq!(determine_target_monitors(&config(), None, "test").len(), 3);
    }

    #[test]
    fn connection_requires_keys() {
        let mut cfg = config();
        assert!(require_connection(&cfg).is_ok());
        cfg.shinobi.group_key.clear();
        assert!(require_connection(&cfg).is_err());
    }

    #[tokio::test]
    async fn per_monitor_results_keep_target_order() {
        let targets = vec![("a".to_string(), "pa".to_string()), ("b".to_string(), "pb".to_string())];
        let results = run_per_monitor(targets, "test", |mid, path| async move {
            if mid == "b" {
                anyhow::bail!("boom");
            }
            Ok(path)
        })
        .await;
        assert_eq!(results[0].0, "a");
        assert_eq!(results[0].1.as_ref().unwrap(), "pa");
        assert!(results[1].1.is_err());
    }
}
