//! Read-only order status projection for polling clients.

use kassa_sdk::objects::StatusResponse;

use super::format_amount;
use crate::store::{OrderStore, StoreError};

/// Errors produced by status queries.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("no order with number {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only projection of an order's current state. No side effects.
pub struct StatusQueryService<S> {
    store: S,
}

impl<S: OrderStore> StatusQueryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_status(&self, order_number: &str) -> Result<StatusResponse, StatusError> {
        let order = self
            .store
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| StatusError::NotFound(order_number.to_string()))?;

        Ok(StatusResponse {
            order_number: order.order_number.clone(),
            status: order.status.into(),
            amount: format_amount(order.amount),
            paid_at: order.paid_at_unix(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::entities::{DEFAULT_CURRENCY, NewOrder};
    use crate::store::MemoryOrderStore;
    use kassa_sdk::objects::OrderStatus;
    use rust_decimal::Decimal;

    async fn store_with_order() -> MemoryOrderStore {
        let store = MemoryOrderStore::new();
        store
            .create(
                NewOrder {
                    order_number: "ORD-20260806-12345".to_string(),
                    invoice_id: 12345,
                    user_name: "Ivan".to_string(),
                    user_email: "ivan@example.com".to_string(),
                    user_phone: None,
                    amount: Decimal::new(10000, 2),
                    currency: DEFAULT_CURRENCY.to_string(),
                    delivery_address: None,
                    delivery_type: None,
                    delivery_cost: None,
                    order_comment: None,
                },
                Vec::new(),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn pending_order_has_no_paid_at() {
        let store = store_with_order().await;
        let service = StatusQueryService::new(store);

        let status = service.get_status("ORD-20260806-12345").await.unwrap();
        assert_eq!(status.status, OrderStatus::Pending);
        assert_eq!(status.amount, "100.00");
        assert!(status.paid_at.is_none());
    }

    #[tokio::test]
    async fn paid_order_reports_payment_time() {
        let store = store_with_order().await;
        store.transition_to_paid(12345).await.unwrap();
        let service = StatusQueryService::new(store);

        let status = service.get_status("ORD-20260806-12345").await.unwrap();
        assert_eq!(status.status, OrderStatus::Paid);
        assert!(status.paid_at.is_some());
    }

    #[tokio::test]
    async fn unknown_order_number_is_not_found() {
        let service = StatusQueryService::new(MemoryOrderStore::new());
        let err = service.get_status("ORD-00000000-0").await.unwrap_err();
        assert!(matches!(err, StatusError::NotFound(_)));
    }
}
