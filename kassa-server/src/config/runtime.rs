//! Resolved runtime configuration.

use std::net::SocketAddr;

use kassa_sdk::config::GatewayConfig;

/// Fully resolved configuration: TOML file merged with CLI overrides and
/// environment-sourced secrets. Held behind the state's RwLock so SIGHUP
/// can swap it at runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen: SocketAddr,
    pub gateway: GatewayConfig,
}
