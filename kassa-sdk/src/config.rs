//! Gateway configuration.

use crate::gateway::DEFAULT_GATEWAY_URL;

/// Merchant-side configuration for talking to the payment gateway.
///
/// The two secrets are distinct by protocol design and never
/// interchangeable: `outbound_secret` (password #1) signs the redirect URL
/// we build, `inbound_secret` (password #2) verifies the Result-URL webhook
/// the gateway sends back.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Merchant login identifier registered with the gateway.
    pub merchant_login: String,
    /// Password #1 — signs outbound redirect URLs.
    pub outbound_secret: String,
    /// Password #2 — verifies inbound webhook notifications.
    pub inbound_secret: String,
    /// When set, every redirect URL carries `IsTest=1`.
    pub test_mode: bool,
    /// Base URL of the gateway's payment page.
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_login: String::new(),
            outbound_secret: String::new(),
            inbound_secret: String::new(),
            test_mode: false,
            base_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Merchant login and password #1, if both are configured.
    pub fn outbound_credentials(&self) -> Option<(&str, &str)> {
        if self.merchant_login.is_empty() || self.outbound_secret.is_empty() {
            None
        } else {
            Some((&self.merchant_login, &self.outbound_secret))
        }
    }

    /// Password #2, if configured.
    pub fn inbound_secret(&self) -> Option<&str> {
        if self.inbound_secret.is_empty() {
            None
        } else {
            Some(&self.inbound_secret)
        }
    }
}
