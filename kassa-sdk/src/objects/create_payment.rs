//! Request/response objects for payment creation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cart position as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Request payload for creating a payable order.
///
/// Sent by the first-party storefront. The amount is the total to charge;
/// it may legitimately differ from the cart item subtotal (delivery cost,
/// discounts), so the two are never reconciled, only compared for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub user_name: String,
    pub user_email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub user_address: Option<String>,
    #[serde(default)]
    pub order_comment: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    /// Optional override for the gateway's success redirect.
    #[serde(default)]
    pub success_url: Option<String>,
    /// Optional override for the gateway's failure redirect.
    #[serde(default)]
    pub fail_url: Option<String>,
    /// Request a test payment regardless of the configured mode.
    #[serde(default)]
    pub is_test: bool,
}

/// Response returned once an order is persisted and its redirect URL built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    pub payment_url: String,
    pub order_id: Uuid,
    pub order_number: String,
    pub invoice_id: i64,
    /// Charged amount, formatted to two decimal places.
    pub amount: String,
}
