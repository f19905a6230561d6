use serde::{Deserialize, Serialize};

pub const AUTO_LAYOUT: &str = "auto";

/// Connection settings for the Shinobi server plus the selected layout.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShinobiConfig {
    pub server: String,
    pub api_key: String,
    pub group_key: String,
    pub layout: String, // "auto" or the stem of a file in the layouts directory
}

impl Default for ShinobiConfig {
    fn default() -> Self {
        ShinobiConfig {
            server: String::new(),
            api_key: String::new(),
            group_key: String::new(),
            layout: AUTO_LAYOUT.to_string(),
        }
    }
}

impl ShinobiConfig {
    pub fn server_base(&self) -> &str {
        self.server.trim().trim_end_matches('/')
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.group_key.trim().is_empty()
    }

    pub fn is_auto_layout(&self) -> bool {
        self.layout == AUTO_LAYOUT
    }
}
