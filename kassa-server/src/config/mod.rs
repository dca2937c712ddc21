//! Configuration module for kassa-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments and
//! environment variables. The gateway secrets are environment-only by
//! design: `ROBOKASSA_MERCHANT_LOGIN`, `ROBOKASSA_PASSWORD_1` (outbound
//! signing), `ROBOKASSA_PASSWORD_2` (webhook verification) — two distinct
//! secrets, never interchangeable.

pub mod file;
pub mod runtime;

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::file::FileConfig;
use crate::config::runtime::RuntimeConfig;
use kassa_sdk::config::GatewayConfig;

/// Environment variable holding the merchant login identifier.
pub const ENV_MERCHANT_LOGIN: &str = "ROBOKASSA_MERCHANT_LOGIN";
/// Environment variable holding password #1 (outbound signing).
pub const ENV_OUTBOUND_SECRET: &str = "ROBOKASSA_PASSWORD_1";
/// Environment variable holding password #2 (webhook verification).
pub const ENV_INBOUND_SECRET: &str = "ROBOKASSA_PASSWORD_2";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and resolve the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (defaults apply when the file is absent, so
    ///    the server can run from environment variables alone)
    /// 2. Apply CLI overrides
    /// 3. Merge the environment-sourced gateway secrets
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let mut file_config = if self.config_path.exists() {
            let content = std::fs::read_to_string(&self.config_path)?;
            toml::from_str::<FileConfig>(&content)?
        } else {
            tracing::info!(path = ?self.config_path, "config file not found, using defaults");
            FileConfig::default()
        };

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let gateway = GatewayConfig {
            merchant_login: env_string(ENV_MERCHANT_LOGIN),
            outbound_secret: env_string(ENV_OUTBOUND_SECRET),
            inbound_secret: env_string(ENV_INBOUND_SECRET),
            test_mode: file_config.gateway.test_mode,
            base_url: file_config.gateway.base_url,
        };

        if gateway.outbound_credentials().is_none() {
            tracing::warn!(
                "{ENV_MERCHANT_LOGIN} / {ENV_OUTBOUND_SECRET} not set, payment creation will fail"
            );
        }
        if gateway.inbound_secret().is_none() {
            tracing::warn!("{ENV_INBOUND_SECRET} not set, webhook verification will fail");
        }

        Ok(RuntimeConfig {
            listen: file_config.server.listen,
            gateway,
        })
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<RuntimeConfig, ConfigError> {
        self.load()
    }
}

fn env_string(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
