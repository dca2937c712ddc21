//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /api/payments`                      – create a payable order, returns the redirect URL
//! - `POST /api/payments/result`               – gateway Result-URL webhook
//! - `GET  /api/orders/{order_number}/status`  – poll order status

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

mod payments;
mod status;
mod webhook;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(payments::create_payment))
        .route("/payments/result", post(webhook::payment_result))
        .route(
            "/orders/{order_number}/status",
            get(status::order_status),
        )
}
