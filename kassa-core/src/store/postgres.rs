//! Postgres-backed order store.
//!
//! Uniqueness of `invoice_id` and `order_number` is enforced by UNIQUE
//! constraints in the schema; the pending→paid transition is a single
//! `UPDATE … WHERE status = 'pending'` so concurrent webhook deliveries
//! race on the database row, not on application state.

use sqlx::PgPool;
use uuid::Uuid;

use super::{OrderStore, PaidTransition, StoreError};
use crate::entities::{NewOrder, NewOrderItem, OrderItemRecord, OrderRecord, OrderStatus};

/// [`OrderStore`] implementation on a sqlx Postgres pool.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OrderStore for PgOrderStore {
    #[tracing::instrument(skip_all, err, name = "SQL:CreateOrder")]
    async fn create(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            INSERT INTO orders (
                order_number, invoice_id, user_name, user_email, user_phone,
                amount, currency, delivery_address, delivery_type,
                delivery_cost, order_comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&order.order_number)
        .bind(order.invoice_id)
        .bind(&order.user_name)
        .bind(&order.user_email)
        .bind(&order.user_phone)
        .bind(order.amount)
        .bind(&order.currency)
        .bind(&order.delivery_address)
        .bind(&order.delivery_type)
        .bind(order.delivery_cost)
        .bind(&order.order_comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(record.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FindOrderByNumber")]
    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let record = sqlx::query_as::<_, OrderRecord>(
            "SELECT * FROM orders WHERE order_number = $1",
        )
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:FindOrderByInvoiceId")]
    async fn find_by_invoice_id(&self, invoice_id: i64) -> Result<Option<OrderRecord>, StoreError> {
        let record =
            sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders WHERE invoice_id = $1")
                .bind(invoice_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:InvoiceIdExists")]
    async fn invoice_id_exists(&self, invoice_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE invoice_id = $1)",
        )
        .bind(invoice_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:ItemsForOrder")]
    async fn items_for_order(&self, order_id: Uuid) -> Result<Vec<OrderItemRecord>, StoreError> {
        let items = sqlx::query_as::<_, OrderItemRecord>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:SetPaymentUrl")]
    async fn set_payment_url(&self, order_id: Uuid, payment_url: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_url = $2, updated_at = now() WHERE id = $1",
        )
        .bind(order_id)
        .bind(payment_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:TransitionToPaid")]
    async fn transition_to_paid(&self, invoice_id: i64) -> Result<PaidTransition, StoreError> {
        let updated = sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders
            SET status = 'paid', paid_at = now(), updated_at = now()
            WHERE invoice_id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = updated {
            return Ok(PaidTransition::Applied(record));
        }

        // Zero rows updated: re-read to tell already-paid apart from
        // missing or otherwise-terminal orders.
        match self.find_by_invoice_id(invoice_id).await? {
            None => Err(StoreError::NotFound),
            Some(record) if record.status == OrderStatus::Paid => {
                Ok(PaidTransition::AlreadyPaid(record))
            }
            Some(record) => Ok(PaidTransition::Conflict(record.status)),
        }
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string())
        }
        _ => StoreError::Database(err),
    }
}
