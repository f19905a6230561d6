use crate::app_config::ApplicationConfig;
use crate::core::snapshot_source::SnapshotSource;
use crate::errors::AppError;
use crate::shinobi::models::{
    Credentials, LoginResponse, MetadataBody, MonitorMetadata, MonitorSummary, RawMonitor,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};

/// `/{apiKey}/monitor/{groupKey}/{monitorId}`
pub fn monitor_path(api_key: &str, group_key: &str, monitor_id: &str) -> String {
    format!("/{}/monitor/{}/{}", api_key, group_key, monitor_id)
}

/// Joins a server base and a path with exactly one slash between them.
pub fn join_url(server: &str, path: &str) -> String {
    format!("{}/{}", server.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[derive(Clone)]
pub struct ShinobiClient {
    http: Client,
    metadata_timeout: Duration,
    snapshot_timeout: Duration,
}

impl ShinobiClient {
    pub fn new(app_settings: &ApplicationConfig) -> Result<Self, AppError> {
        if app_settings.accept_invalid_certs {
            debug!("TLS certificate verification disabled for Shinobi requests.");
        }
        let http = Client::builder()
            .danger_accept_invalid_certs(app_settings.accept_invalid_certs)
            .user_agent(concat!("shinobi-view/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(ShinobiClient {
            http,
            metadata_timeout: app_settings.metadata_timeout(),
            snapshot_timeout: app_settings.snapshot_timeout(),
        })
    }

    /// Lists every monitor visible to the given keys.
    pub async fn list_monitors(
        &self,
        server: &str,
        api_key: &str,
        group_key: &str,
    ) -> Result<Vec<MonitorSummary>, AppError> {
        let url = join_url(server, &format!("{}/monitor/{}", api_key, group_key));
        debug!("📋 Listing monitors from {}", url);
        let start_time = Instant::now();

        let response = self
            .http
            .get(&url)
            .timeout(self.metadata_timeout)
            .send()
            .await?;
        let response = ensure_success(response, &url)?;
        let raw: Vec<RawMonitor> = response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("monitor list from {}: {}", url, e)))?;

        let monitors: Vec<MonitorSummary> = raw.into_iter().map(MonitorSummary::from).collect();
        info!("📋 Server reports {} monitor(s) in {:?}", monitors.len(), start_time.elapsed());
        Ok(monitors)
    }

    /// Dashboard login; returns the API key (`auth_token`) and group key (`ke`).
    pub async fn login(
        &self,
        server: &str,
        email: &str,
        password: &str,
        machine_id: &str,
    ) -> Result<Credentials, AppError> {
        let url = format!("{}/?json=true", server.trim_end_matches('/'));
        info!("🔑 Logging in to {} as {}", server, email);

        let response = self
            .http
            .post(&url)
            .timeout(self.metadata_timeout)
            .form(&[
                ("function", "dash"),
                ("machineID", machine_id),
                ("mail", email),
                ("pass", password),
            ])
            .send()
            .await?;
        let response = ensure_success(response, &url)?;
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("login response: {}", e)))?;

        match (body.ok, body.user) {
            (true, Some(user)) => {
                info!("✅ Login succeeded for {}", email);
                Ok(Credentials {
                    api_key: user.auth_token,
                    group_key: user.ke,
                })
            }
            (true, None) => Err(AppError::Decode("login response is missing $user".to_string())),
            (false, _) => {
                warn!("Login rejected for {}: {:?}", email, body.msg);
                Err(AppError::Login("Invalid e-mail or password".to_string()))
            }
        }
    }
}

fn ensure_success(response: Response, url: &str) -> Result<Response, AppError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

#[async_trait]
impl SnapshotSource for ShinobiClient {
    async fn fetch_metadata(&self, server: &str, monitor_path: &str) -> Result<MonitorMetadata, AppError> {
        let url = join_url(server, monitor_path);
        let response = self
            .http
            .get(&url)
            .timeout(self.metadata_timeout)
            .send()
            .await?;
        let response = ensure_success(response, &url)?;
        let body: MetadataBody = response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("metadata from {}: {}", url, e)))?;
        body.into_first()
            .ok_or_else(|| AppError::Decode(format!("empty metadata list from {}", url)))
    }

    async fn fetch_snapshot(&self, server: &str, snapshot_path: &str) -> Result<Vec<u8>, AppError> {
        let url = join_url(server, snapshot_path);
        let response = self
            .http
            .get(&url)
            .timeout(self.snapshot_timeout)
            .send()
            .await?;
        let response = ensure_success(response, &url)?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_monitor_path() {
        assert_eq!(monitor_path("K", "G", "m1"), "/K/monitor/G/m1");
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://nvr/", "/a/b"), "https://nvr/a/b");
        assert_eq!(join_url("https://nvr", "a/b"), "https://nvr/a/b");
        assert_eq!(join_url("https://nvr//", "//snap.jpg"), "https://nvr/snap.jpg");
    }
}
