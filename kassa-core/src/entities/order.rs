use rust_decimal::Decimal;
use time::PrimitiveDateTime;
use uuid::Uuid;

use super::OrderStatus;

/// A persisted order row.
///
/// Mutated only through the two narrow store operations
/// (`set_payment_url`, `transition_to_paid`); everything else is written
/// once at creation.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub order_number: String,
    pub invoice_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_url: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_type: Option<String>,
    pub delivery_cost: Option<Decimal>,
    pub order_comment: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
    pub paid_at: Option<PrimitiveDateTime>,
}

impl OrderRecord {
    /// Payment confirmation time as unix seconds, if paid.
    pub fn paid_at_unix(&self) -> Option<i64> {
        self.paid_at.map(|at| at.assume_utc().unix_timestamp())
    }
}

/// A persisted order line item. Items are owned exclusively by their order
/// and are never queried independently of it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderItemRecord {
    pub id: i64,
    pub order_id: Uuid,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub created_at: PrimitiveDateTime,
}

/// Field set for inserting a new order. The store assigns `id`, the
/// timestamps, and the initial `pending` status.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub invoice_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub delivery_address: Option<String>,
    pub delivery_type: Option<String>,
    pub delivery_cost: Option<Decimal>,
    pub order_comment: Option<String>,
}

/// Field set for inserting one order line item.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}
