use std::{fmt, time::Duration};

use crate::error::Result;
pub use clap::Parser;
use tcms_app::state::{credential_present, AppConfig};
use tcms_types::{config::BackendConfig, general::RuntimeEnv};
use url::Url;

#[derive(Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "TCMS_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "TCMS_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "TCMS_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the site, as visible to users. Session cookie is secure for https"
    )]
    pub base_url: Url,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "TCMS_SESSION_EXPIRY",
        default_value = "1 day",
        help = "Session expires after this period of inactivity, in human friendly format (e.g. 1d, 1h, 30m - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub session_expiry: Duration,

    #[arg(
        long,
        env = "TCMS_DEFAULT_PAGE_SIZE",
        default_value = "100",
        help = "Default page size",
        value_parser = clap::value_parser!(u32).range(1..=1000)
    )]
    pub default_page_size: u32,

    #[arg(long, env = "TCMS_CORS", help = "Enable permissive CORS")]
    pub cors: bool,

    #[arg(
        long = "env",
        env = "TCMS_ENV",
        value_enum,
        default_value_t = RuntimeEnv::Development,
        help = "Runtime environment, production silences diagnostic logging"
    )]
    pub environment: RuntimeEnv,

    #[arg(
        long,
        env = "TCMS_SERVICE_ROLE_KEY",
        hide_env_values = true,
        help = "Privileged credential, enables delete operations. Only its presence is ever reported"
    )]
    service_role_key: Option<String>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("listen_address", &self.listen_address)
            .field("base_url", &self.base_url)
            .field("backend", &self.backend)
            .field("session_expiry", &self.session_expiry)
            .field("default_page_size", &self.default_page_size)
            .field("cors", &self.cors)
            .field("environment", &self.environment)
            .field("service_role_configured", &self.service_role_configured())
            .finish()
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn database_url(&self) -> String {
        self.backend.database_url()
    }

    pub fn service_role_configured(&self) -> bool {
        credential_present(self.service_role_key.as_deref())
    }

    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            base_url: config.base_url.clone(),
            default_page_size: config.default_page_size,
            environment: config.environment,
            service_role_configured: config.service_role_configured(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut all = vec!["tcms-server", "--data-dir", "/tmp/tcms-config-test"];
        all.extend_from_slice(args);
        ServerConfig::try_parse_from(all).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_page_size, 100);
        assert_eq!(config.session_expiry, Duration::from_secs(24 * 3600));
        assert!(!config.secure_cookies());
        assert_eq!(
            config.database_url(),
            "sqlite:///tmp/tcms-config-test/tcms.db"
        );
    }

    #[test]
    fn test_service_role_presence() {
        let config = parse(&["--service-role-key", "secret-value"]);
        assert!(config.service_role_configured());
        let app_config = AppConfig::from(&config);
        assert!(app_config.service_role_configured);
        assert!(!format!("{config:?}").contains("secret-value"));

        let config = parse(&["--service-role-key", ""]);
        assert!(!config.service_role_configured());
    }

    #[test]
    fn test_production_and_https() {
        let config = parse(&["--env", "production", "--base-url", "https://tcms.example.com"]);
        assert!(config.environment.is_production());
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_page_size_range() {
        let res = ServerConfig::try_parse_from([
            "tcms-server",
            "--data-dir",
            "/tmp/tcms-config-test",
            "--default-page-size",
            "0",
        ]);
        assert!(res.is_err());
    }
}
