//! Application state shared across all request handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::config::runtime::RuntimeConfig;
use kassa_core::events::PaymentNotificationSender;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc
/// or is already a handle).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: Arc<RwLock<RuntimeConfig>>,
    /// Sender half of the payment notification channel.
    pub notifications: PaymentNotificationSender,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(db: PgPool, config: RuntimeConfig, notifications: PaymentNotificationSender) -> Self {
        Self {
            db,
            config: Arc::new(RwLock::new(config)),
            notifications,
        }
    }

    /// Update the configuration (used during SIGHUP reload).
    pub async fn update_config(&self, new_config: RuntimeConfig) {
        let mut config = self.config.write().await;
        *config = new_config;
    }
}
