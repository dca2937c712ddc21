//! Order persistence.
//!
//! A single store interface is shared by the payment-initiation and the
//! callback paths so the two entry points can never grow divergent SQL.
//! The write surface is deliberately narrow: after creation an order row
//! is only ever touched by [`OrderStore::set_payment_url`] and
//! [`OrderStore::transition_to_paid`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{NewOrder, NewOrderItem, OrderItemRecord, OrderRecord, OrderStatus};

/// Errors produced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert hit a uniqueness constraint. For invoice ids this is the
    /// signal to re-allocate, not a fatal condition.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("order not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of the conditional pending→paid update.
///
/// The update applies at most once per order; every other delivery of the
/// same confirmation observes one of the other two variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaidTransition {
    /// The order was pending and is now paid; `paid_at` was set just now.
    Applied(OrderRecord),
    /// The order was already paid. Nothing changed.
    AlreadyPaid(OrderRecord),
    /// The order is in a terminal state other than paid.
    Conflict(OrderStatus),
}

/// Durable storage for orders and their line items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and its items as one transactional unit. Either
    /// everything is written or nothing is.
    async fn create(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderRecord, StoreError>;

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderRecord>, StoreError>;

    async fn find_by_invoice_id(&self, invoice_id: i64) -> Result<Option<OrderRecord>, StoreError>;

    /// Existence pre-check used by the invoice allocator. Advisory only:
    /// the UNIQUE constraint enforced by [`OrderStore::create`] is the
    /// actual collision guarantee.
    async fn invoice_id_exists(&self, invoice_id: i64) -> Result<bool, StoreError>;

    async fn items_for_order(&self, order_id: Uuid) -> Result<Vec<OrderItemRecord>, StoreError>;

    /// Record the redirect URL generated at creation time. Set once.
    async fn set_payment_url(&self, order_id: Uuid, payment_url: &str) -> Result<(), StoreError>;

    /// Conditionally move the order to `paid`, setting `paid_at`, only if
    /// it is currently `pending` — a single compare-and-swap write. When
    /// the condition does not hold, the order is re-read to distinguish
    /// already-paid from other terminal states; a missing order is
    /// [`StoreError::NotFound`].
    async fn transition_to_paid(&self, invoice_id: i64) -> Result<PaidTransition, StoreError>;
}
