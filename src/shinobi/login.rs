use crate::config_loader::MasterConfig;
use crate::errors::AppError;
use crate::shinobi::api_client::ShinobiClient;
use crate::shinobi::models::Credentials;
use log::debug;
use reqwest::Url;

#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub server: String,
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// First problem with the form, phrased for display next to the login button.
    pub fn validate(&self) -> Result<(), &'static str> {
        let server = self.server.trim();
        let server_ok = !server.is_empty()
            && Url::parse(server)
                .map(|u| u.scheme() == "http" || u.scheme() == "https")
                .unwrap_or(false);
        if !server_ok {
            return Err("Invalid server URL");
        }
        if self.email.trim().is_empty() {
            return Err("Invalid e-mail");
        }
        if self.password.is_empty() {
            return Err("Invalid password");
        }
        Ok(())
    }

    pub fn server_base(&self) -> String {
        self.server.trim().trim_end_matches('/').to_string()
    }

    pub async fn submit(&self, client: &ShinobiClient) -> Result<Credentials, AppError> {
        self.validate().map_err(|msg| AppError::Login(msg.to_string()))?;
        client
            .login(&self.server_base(), self.email.trim(), &self.password, &machine_id())
            .await
    }
}

/// Identifies this viewer to the dashboard login; the host name, like a browser session would.
pub fn machine_id() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            debug!("Could not read host name ({}), using a generic machine id.", e);
            "shinobi-view".to_string()
        }
    }
}

pub fn apply_credentials(config: &mut MasterConfig, server: &str, credentials: Credentials) {
    config.shinobi.server = server.to_string();
    config.shinobi.api_key = credentials.api_key;
    config.shinobi.group_key = credentials.group_key;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(server: &str, email: &str, password: &str) -> LoginRequest {
        LoginRequest { server: server.into(), email: email.into(), password: password.into() }
    }

    #[test]
    fn validation_messages_in_field_order() {
        assert_eq!(request("", "", "").validate(), Err("Invalid server URL"));
        assert_eq!(request("nvr.local", "a@b", "x").validate(), Err("Invalid server URL"));
        assert_eq!(request("https://nvr.local", " ", "x").validate(), Err("Invalid e-mail"));
        assert_eq!(request("https://nvr.local", "a@b", "").validate(), Err("Invalid password"));
        assert!(request("https://nvr.local/", "a@b", "x").validate().is_ok());
    }

    #[test]
    fn applying_credentials_updates_connection() {
        let mut cfg = MasterConfig::default();
        apply_credentials(
            &mut cfg,
            "https://nvr",
            Credentials { api_key: "tok".into(), group_key: "ke".into() },
        );
        assert!(cfg.has_credentials());
        assert_eq!(cfg.shinobi.server, "https://nvr");
    }
}
