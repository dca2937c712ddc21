pub mod order;

pub use order::{NewOrder, NewOrderItem, OrderItemRecord, OrderRecord};

use kassa_sdk::objects::OrderStatus as SdkOrderStatus;

/// Default settlement currency of the gateway.
pub const DEFAULT_CURRENCY: &str = "RUB";

/// Order status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `kassa_sdk::objects::OrderStatus`. Paid, Cancelled and Refunded are
/// terminal: once an order enters one of them, no further transition is
/// performed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
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

impl From<OrderStatus> for SdkOrderStatus {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => SdkOrderStatus::Pending,
            OrderStatus::Paid => SdkOrderStatus::Paid,
            OrderStatus::Cancelled => SdkOrderStatus::Cancelled,
            OrderStatus::Refunded => SdkOrderStatus::Refunded,
        }
    }
}

impl From<SdkOrderStatus> for OrderStatus {
    fn from(value: SdkOrderStatus) -> Self {
        match value {
            SdkOrderStatus::Pending => OrderStatus::Pending,
            SdkOrderStatus::Paid => OrderStatus::Paid,
            SdkOrderStatus::Cancelled => OrderStatus::Cancelled,
            SdkOrderStatus::Refunded => OrderStatus::Refunded,
        }
    }
}
