use crate::shinobi::api_client::join_url;
use crate::shinobi::models::MonitorMetadata;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Loading,
    Playing,
}

#[derive(Debug, Clone)]
pub struct MonitorEntity {
    pub monitor_id: String,
    pub server_url: String,
    pub monitor_path: String,
    pub state: MonitorState,
    pub metadata: Option<MonitorMetadata>,
}

impl MonitorEntity {
    pub fn new(monitor_id: String, server_url: String, monitor_path: String) -> Self {
        MonitorEntity {
            monitor_id,
            server_url: server_url.trim_end_matches('/').to_string(),
            monitor_path,
            state: MonitorState::Stopped,
            metadata: None,
        }
    }

    pub fn update_state(&mut self, new_state: MonitorState) {
        if self.state != new_state {
            info!("Monitor '{}' state changed from {:?} to {:?}", self.monitor_id, self.state, new_state);
            self.state = new_state;
        }
    }

    pub fn metadata_url(&self) -> String {
        join_url(&self.server_url, &self.monitor_path)
    }

    pub fn snapshot_url(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .map(|m| join_url(&self.server_url, &m.snapshot))
    }

    /// Forget everything fetched while running.
    pub fn reset(&mut self) {
        self.metadata = None;
        self.update_state(MonitorState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_url_requires_metadata() {
        let mut entity = MonitorEntity::new("m1".into(), "https://nvr/".into(), "/K/monitor/G/m1".into());
        assert_eq!(entity.metadata_url(), "https://nvr/K/monitor/G/m1");
        assert!(entity.snapshot_url().is_none());

        entity.metadata = Some(MonitorMetadata {
            mid: Some("m1".into()),
            name: None,
            snapshot: "/K/jpeg/G/m1/s.jpg".into(),
        });
        assert_eq!(entity.snapshot_url().as_deref(), Some("https://nvr/K/jpeg/G/m1/s.jpg"));

        entity.update_state(MonitorState::Playing);
        entity.reset();
        assert_eq!(entity.state, MonitorState::Stopped);
        assert!(entity.metadata.is_none());
    }
}
