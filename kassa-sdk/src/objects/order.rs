//! Order status types for API responses.

use serde::{Deserialize, Serialize};

/// Order status for API responses.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `kassa-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// Response returned by the status polling endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub order_number: String,
    pub status: OrderStatus,
    /// Charged amount, formatted to two decimal places.
    pub amount: String,
    /// Unix timestamp of the payment confirmation; absent while unpaid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
}
