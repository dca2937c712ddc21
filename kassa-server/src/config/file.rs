//! TOML file configuration structures.
//!
//! These structs directly map to the `kassa-config.toml` file format.
//! Secrets never live here; they come from the environment (see the
//! loader in the parent module).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use kassa_sdk::gateway::DEFAULT_GATEWAY_URL;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewaySection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Gateway configuration section (the non-secret part).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySection {
    /// Base URL of the gateway's payment page.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// When set, every redirect URL carries `IsTest=1`.
    #[serde(default)]
    pub test_mode: bool,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            test_mode: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}
