//! In-memory order store.
//!
//! Mirrors the Postgres implementation's semantics, including the UNIQUE
//! constraints and the compare-and-swap transition, behind a single write
//! lock. Used by the test suites and for running the service without a
//! database.

use std::collections::HashMap;
use std::sync::Arc;

use time::{OffsetDateTime, PrimitiveDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderStore, PaidTransition, StoreError};
use crate::entities::{NewOrder, NewOrderItem, OrderItemRecord, OrderRecord, OrderStatus};

/// Constraint names are kept identical to the Postgres schema so callers
/// observe the same [`StoreError::UniqueViolation`] payloads.
const INVOICE_ID_CONSTRAINT: &str = "orders_invoice_id_key";
const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

#[derive(Debug, Default)]
struct Inner {
    orders: HashMap<Uuid, OrderRecord>,
    items: HashMap<Uuid, Vec<OrderItemRecord>>,
    by_invoice: HashMap<i64, Uuid>,
    by_number: HashMap<String, Uuid>,
    next_item_id: i64,
}

/// [`OrderStore`] implementation on process memory. Cloning yields another
/// handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Administrative status override, available to in-crate tests only.
    /// The service surface never mutates status outside
    /// [`OrderStore::transition_to_paid`].
    #[cfg(test)]
    pub(crate) async fn set_status(&self, invoice_id: i64, status: OrderStatus) {
        let mut inner = self.inner.write().await;
        if let Some(id) = inner.by_invoice.get(&invoice_id).copied() {
            if let Some(order) = inner.orders.get_mut(&id) {
                order.status = status;
                order.updated_at = now();
            }
        }
    }
}

#[async_trait::async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderRecord, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.by_invoice.contains_key(&order.invoice_id) {
            return Err(StoreError::UniqueViolation(INVOICE_ID_CONSTRAINT.to_string()));
        }
        if inner.by_number.contains_key(&order.order_number) {
            return Err(StoreError::UniqueViolation(ORDER_NUMBER_CONSTRAINT.to_string()));
        }

        let id = Uuid::new_v4();
        let created_at = now();
        let record = OrderRecord {
            id,
            order_number: order.order_number.clone(),
            invoice_id: order.invoice_id,
            user_name: order.user_name,
            user_email: order.user_email,
            user_phone: order.user_phone,
            amount: order.amount,
            currency: order.currency,
            status: OrderStatus::Pending,
            payment_url: None,
            delivery_address: order.delivery_address,
            delivery_type: order.delivery_type,
            delivery_cost: order.delivery_cost,
            order_comment: order.order_comment,
            created_at,
            updated_at: created_at,
            paid_at: None,
        };

        let item_records: Vec<OrderItemRecord> = items
            .into_iter()
            .map(|item| {
                inner.next_item_id += 1;
                OrderItemRecord {
                    id: inner.next_item_id,
                    order_id: id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    created_at,
                }
            })
            .collect();

        inner.by_invoice.insert(order.invoice_id, id);
        inner.by_number.insert(order.order_number, id);
        inner.items.insert(id, item_records);
        inner.orders.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_number
            .get(order_number)
            .and_then(|id| inner.orders.get(id))
            .cloned())
    }

    async fn find_by_invoice_id(&self, invoice_id: i64) -> Result<Option<OrderRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_invoice
            .get(&invoice_id)
            .and_then(|id| inner.orders.get(id))
            .cloned())
    }

    async fn invoice_id_exists(&self, invoice_id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.by_invoice.contains_key(&invoice_id))
    }

    async fn items_for_order(&self, order_id: Uuid) -> Result<Vec<OrderItemRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.items.get(&order_id).cloned().unwrap_or_default())
    }

    async fn set_payment_url(&self, order_id: Uuid, payment_url: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let order = inner.orders.get_mut(&order_id).ok_or(StoreError::NotFound)?;
        order.payment_url = Some(payment_url.to_string());
        order.updated_at = now();
        Ok(())
    }

    async fn transition_to_paid(&self, invoice_id: i64) -> Result<PaidTransition, StoreError> {
        // Single write lock: the check and the mutation are one atomic
        // step, same as the conditional UPDATE in Postgres.
        let mut inner = self.inner.write().await;
        let id = inner
            .by_invoice
            .get(&invoice_id)
            .copied()
            .ok_or(StoreError::NotFound)?;
        let order = inner.orders.get_mut(&id).ok_or(StoreError::NotFound)?;

        match order.status {
            OrderStatus::Pending => {
                let at = now();
                order.status = OrderStatus::Paid;
                order.paid_at = Some(at);
                order.updated_at = at;
                Ok(PaidTransition::Applied(order.clone()))
            }
            OrderStatus::Paid => Ok(PaidTransition::AlreadyPaid(order.clone())),
            other => Ok(PaidTransition::Conflict(other)),
        }
    }
}

fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}
