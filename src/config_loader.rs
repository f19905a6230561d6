use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::app_config::ApplicationConfig;
use crate::shinobi_config::ShinobiConfig;
use crate::common::timestamp_utils;
use crate::shinobi::api_client::monitor_path;
use anyhow::{Result, Context, bail};
use std::collections::HashSet;
use log::{debug, info};
use reqwest::Url;
use std::time::Instant;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MasterConfig {
    #[serde(rename = "application")]
    pub app_settings: ApplicationConfig,
    pub shinobi: ShinobiConfig,
    /// Enabled monitor IDs, in display order.
    pub monitors: Vec<String>,
}

impl MasterConfig {
    pub fn has_credentials(&self) -> bool {
        self.shinobi.has_credentials()
    }

    /// Per-monitor metadata paths, relative to the server base URL.
    pub fn monitor_paths(&self) -> Vec<(String, String)> {
        self.monitors
            .iter()
            .map(|mid| {
                (
                    mid.clone(),
                    monitor_path(&self.shinobi.api_key, &self.shinobi.group_key, mid),
                )
            })
            .collect()
    }
}

/// Loads the configuration file. A missing file yields the defaults so a
/// first launch can go straight to the login popup.
pub fn load_config(path: &str) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    if !Path::new(path).exists() {
        info!("📄 No configuration at '{}', starting with defaults.", path);
        return Ok(MasterConfig::default());
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'. 📖", path))?;
    debug!("Read config file in {:?}", start_time.elapsed());

    let config: MasterConfig = if config_str.trim().is_empty() {
        MasterConfig::default()
    } else {
        serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse YAML configuration from '{}'. 💔", path))?
    };

    validate_master_config(&config).with_context(|| "Master configuration validation failed 👎")?;

    info!("✅ Successfully loaded and validated configuration from '{}' in {:?}", path, start_time.elapsed());
    Ok(config)
}

pub fn save_config(path: &str, config: &MasterConfig) -> Result<()> {
    let start_time = Instant::now();
    let yaml = serde_yaml::to_string(config)
        .context("Failed to serialize configuration to YAML")?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory '{}' 📂💥", parent.display()))?;
        }
    }
    fs::write(path, yaml)
        .with_context(|| format!("Failed to write configuration file '{}'", path))?;
    debug!("💾 Saved configuration to '{}' in {:?}", path, start_time.elapsed());
    Ok(())
}

pub fn validate_master_config(config: &MasterConfig) -> Result<()> {
    debug!("🕵️ Validating master configuration...");
    let server = config.shinobi.server.trim();
    if !server.is_empty() {
        let url = Url::parse(server)
            .with_context(|| format!("❌ Invalid server URL '{}'.", server))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("❌ Server URL '{}' must use http or https.", server);
        }
    }

    if config.shinobi.layout.trim().is_empty() {
        bail!("❌ Layout name cannot be empty. Use 'auto' for the automatic grid.");
    }

    if config.app_settings.poll_interval_ms == 0 {
        bail!("❌ poll_interval_ms must be greater than zero.");
    }
    if config.app_settings.layouts_directory.is_empty() {
        bail!("❌ Application layouts_directory cannot be empty.");
    }
    timestamp_utils::check_timestamp_format(&config.app_settings.snapshot_timestamp_format)
        .context("❌ Invalid application snapshot_timestamp_format.")?;

    let mut seen = HashSet::new();
    for (idx, mid) in config.monitors.iter().enumerate() {
        if mid.trim().is_empty() {
            bail!("❌ Monitor ID cannot be empty (entry #{}).", idx + 1);
        }
        if !seen.insert(mid) {
            bail!("❌ Duplicate monitor ID found: {}", mid);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn config_with(server: &str, monitors: &[&str]) -> MasterConfig {
        let mut cfg = MasterConfig::default();
        cfg.shinobi.server = server.to_string();
        cfg.monitors = monitors.iter().map(|s| s.to_string()).collect();
        cfg
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_master_config(&MasterConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_http_server() {
        let cfg = config_with("ftp://nvr.local", &[]);
        assert!(validate_master_config(&cfg).is_err());
    }

    #[test]
    fn rejects_duplicate_monitors() {
        let cfg = config_with("https://nvr.local", &["a", "b", "a"]);
        let err = validate_master_config(&cfg).unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate monitor ID"));
    }

    #[test]
    fn rejects_unrenderable_timestamp_format() {
        let mut cfg = config_with("https://nvr.local", &[]);
        cfg.app_settings.snapshot_timestamp_format = "%Q".to_string();
        let err = validate_master_config(&cfg).unwrap_err();
        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Config(_))));
    }

    #[test]
    fn bad_timestamp_format_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        fs::write(&path, "application:\n  snapshot_timestamp_format: \"%Q\"\n").unwrap();
        assert!(load_config(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn monitor_paths_follow_enabled_order() {
        let mut cfg = config_with("https://nvr.local/", &["cam2", "cam1"]);
        cfg.shinobi.api_key = "KEY".into();
        cfg.shinobi.group_key = "GRP".into();
        let paths = cfg.monitor_paths();
        assert_eq!(paths[0], ("cam2".to_string(), "/KEY/monitor/GRP/cam2".to_string()));
        assert_eq!(paths[1].1, "/KEY/monitor/GRP/cam1");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: MasterConfig = serde_yaml::from_str("shinobi:\n  server: https://x\n").unwrap();
        assert_eq!(cfg.shinobi.layout, "auto");
        assert_eq!(cfg.app_settings.poll_interval_ms, 1000);
        assert!(cfg.monitors.is_empty());
    }
}
