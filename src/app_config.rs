use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log_level: Option<String>, // CLI --debug takes precedence
    pub layouts_directory: String,
    pub fullscreen: bool,
    pub poll_interval_ms: u64,
    pub metadata_retry_delay_ms: u64,
    pub metadata_timeout_ms: u64,
    pub snapshot_timeout_ms: u64,
    pub accept_invalid_certs: bool, // most self-hosted NVRs run on self-signed certs
    pub snapshot_timestamp_format: String, // strftime format string
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            log_level: Some("info".to_string()),
            layouts_directory: "layouts".to_string(),
            fullscreen: false,
            poll_interval_ms: 1000,
            metadata_retry_delay_ms: 1000,
            metadata_timeout_ms: 60_000,
            snapshot_timeout_ms: 2000,
            accept_invalid_certs: true,
            snapshot_timestamp_format: "%Y%m%d_%H%M%S".to_string(),
        }
    }
}

impl ApplicationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn metadata_retry_delay(&self) -> Duration {
        Duration::from_millis(self.metadata_retry_delay_ms)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_timeout_ms)
    }
}
