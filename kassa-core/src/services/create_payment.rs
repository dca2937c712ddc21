//! Payment initiation.
//!
//! Validates the storefront request, allocates an invoice id, persists the
//! order and its items in one transaction, builds the signed redirect URL
//! and writes it back onto the order. An insert-time uniqueness violation
//! on the invoice id means another request won the race for that id; the
//! whole allocate-and-insert step is retried a bounded number of times.

use rust_decimal::{Decimal, RoundingStrategy};
use time::OffsetDateTime;
use validator::ValidateEmail;

use kassa_sdk::config::GatewayConfig;
use kassa_sdk::gateway::{RedirectParams, build_redirect_url};
use kassa_sdk::objects::{CreatePaymentRequest, CreatePaymentResponse};

use super::{derive_order_number, format_amount};
use crate::entities::{DEFAULT_CURRENCY, NewOrder, NewOrderItem, OrderRecord};
use crate::invoice::{AllocateError, InvoiceAllocator, MAX_ALLOCATION_ATTEMPTS};
use crate::store::{OrderStore, StoreError};

/// Errors produced by payment initiation.
#[derive(Debug, thiserror::Error)]
pub enum CreatePaymentError {
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error("payment gateway credentials are not configured")]
    CredentialsNotConfigured,
    #[error(transparent)]
    Allocation(#[from] AllocateError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to build redirect url: {0}")]
    RedirectUrl(#[from] url::ParseError),
}

/// Orchestrates allocator, store and signature into a redirect URL.
pub struct PaymentInitiationService<S> {
    store: S,
    allocator: InvoiceAllocator,
    gateway: GatewayConfig,
}

impl<S: OrderStore> PaymentInitiationService<S> {
    pub fn new(store: S, gateway: GatewayConfig) -> Self {
        Self {
            store,
            allocator: InvoiceAllocator::default(),
            gateway,
        }
    }

    /// Replace the default allocator (tests, tooling).
    pub fn with_allocator(mut self, allocator: InvoiceAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Create a payable order and return its redirect URL.
    #[tracing::instrument(skip_all, err)]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, CreatePaymentError> {
        let (merchant_login, outbound_secret) = self
            .gateway
            .outbound_credentials()
            .ok_or(CreatePaymentError::CredentialsNotConfigured)?;

        validate(&request)?;

        let amount = request
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let out_sum = format_amount(amount);

        // The charged amount may legitimately differ from the item
        // subtotal (delivery cost, discounts); mismatches are surfaced in
        // the logs but never rejected.
        let subtotal: Decimal = request
            .cart_items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        if !request.cart_items.is_empty() && subtotal != amount {
            tracing::warn!(%subtotal, %amount, "cart subtotal differs from charged amount");
        }

        let order = self.persist_order(&request, amount).await?;

        let description = format!("Заказ {}", order.order_number);
        let params = RedirectParams {
            merchant_login,
            out_sum: &out_sum,
            invoice_id: order.invoice_id,
            email: &request.user_email,
            description: &description,
            is_test: self.gateway.test_mode || request.is_test,
            success_url: request.success_url.as_deref(),
            fail_url: request.fail_url.as_deref(),
        };
        let payment_url = build_redirect_url(&self.gateway.base_url, &params, outbound_secret)?;

        self.store
            .set_payment_url(order.id, payment_url.as_str())
            .await?;

        tracing::info!(
            order_number = %order.order_number,
            invoice_id = order.invoice_id,
            amount = %out_sum,
            "payment created"
        );

        Ok(CreatePaymentResponse {
            payment_url: payment_url.into(),
            order_id: order.id,
            order_number: order.order_number,
            invoice_id: order.invoice_id,
            amount: out_sum,
        })
    }

    /// Allocate an invoice id and persist the order, re-allocating when
    /// the insert loses a uniqueness race. Bounded by the same attempt cap
    /// as the allocator itself.
    async fn persist_order(
        &self,
        request: &CreatePaymentRequest,
        amount: Decimal,
    ) -> Result<OrderRecord, CreatePaymentError> {
        let items: Vec<NewOrderItem> = request
            .cart_items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.id,
                product_name: item.name.clone(),
                unit_price: item.price,
                quantity: item.quantity as i32,
            })
            .collect();

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let invoice_id = self.allocator.allocate(&self.store).await?;
            let today = OffsetDateTime::now_utc().date();
            let order = NewOrder {
                order_number: derive_order_number(today, invoice_id),
                invoice_id,
                user_name: request.user_name.clone(),
                user_email: request.user_email.clone(),
                user_phone: request.user_phone.clone(),
                amount,
                currency: DEFAULT_CURRENCY.to_string(),
                delivery_address: request.user_address.clone(),
                delivery_type: None,
                delivery_cost: None,
                order_comment: request.order_comment.clone(),
            };

            match self.store.create(order, items.clone()).await {
                Ok(record) => return Ok(record),
                Err(StoreError::UniqueViolation(constraint)) => {
                    tracing::warn!(
                        invoice_id,
                        constraint = %constraint,
                        "invoice id lost an insert race, re-allocating"
                    );
                    continue;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(AllocateError::Exhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        }
        .into())
    }
}

fn validate(request: &CreatePaymentRequest) -> Result<(), CreatePaymentError> {
    if request.amount <= Decimal::ZERO {
        return Err(CreatePaymentError::InvalidRequest(
            "amount must be greater than zero",
        ));
    }
    if request.user_name.trim().is_empty() {
        return Err(CreatePaymentError::InvalidRequest(
            "user_name must not be empty",
        ));
    }
    if !request.user_email.validate_email() {
        return Err(CreatePaymentError::InvalidRequest(
            "user_email is not a valid email address",
        ));
    }
    for item in &request.cart_items {
        if item.quantity == 0 || item.quantity > i32::MAX as u32 {
            return Err(CreatePaymentError::InvalidRequest(
                "cart item quantity must be a positive integer",
            ));
        }
        if item.price < Decimal::ZERO {
            return Err(CreatePaymentError::InvalidRequest(
                "cart item price must not be negative",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::entities::OrderStatus;
    use crate::store::{MemoryOrderStore, PaidTransition};
    use kassa_sdk::objects::CartItem;
    use kassa_sdk::signature;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    fn gateway_config() -> GatewayConfig {
        GatewayConfig {
            merchant_login: "shop1".to_string(),
            outbound_secret: "secret1".to_string(),
            inbound_secret: "secret2".to_string(),
            test_mode: false,
            ..GatewayConfig::default()
        }
    }

    fn widget_request() -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: Decimal::from(100),
            user_name: "Ivan".to_string(),
            user_email: "ivan@example.com".to_string(),
            user_phone: None,
            user_address: None,
            order_comment: None,
            cart_items: vec![CartItem {
                id: 1,
                name: "Widget".to_string(),
                price: Decimal::from(50),
                quantity: 2,
            }],
            success_url: None,
            fail_url: None,
            is_test: false,
        }
    }

    #[tokio::test]
    async fn creates_order_with_signed_redirect_url() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store.clone(), gateway_config());

        let response = service.create_payment(widget_request()).await.unwrap();

        assert_eq!(response.amount, "100.00");
        assert!((100_000..=i32::MAX as i64).contains(&response.invoice_id));
        assert!(
            response
                .order_number
                .ends_with(&format!("-{}", response.invoice_id))
        );
        assert!(response.order_number.starts_with("ORD-"));
        assert!(response.payment_url.contains("OutSum=100.00"));

        let expected_signature = signature::sign(
            &["shop1", "100.00", &response.invoice_id.to_string()],
            "secret1",
        );
        assert!(
            response
                .payment_url
                .contains(&format!("SignatureValue={expected_signature}"))
        );

        let order = store
            .find_by_invoice_id(response.invoice_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_url.as_deref(), Some(response.payment_url.as_str()));
        assert_eq!(order.order_number, response.order_number);

        let items = store.items_for_order(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Widget");
    }

    #[tokio::test]
    async fn order_number_embeds_creation_date() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store, gateway_config());
        let response = service.create_payment(widget_request()).await.unwrap();

        let today = OffsetDateTime::now_utc().date();
        let expected = derive_order_number(today, response.invoice_id);
        assert_eq!(response.order_number, expected);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_without_persisting() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store.clone(), gateway_config());

        let mut request = widget_request();
        request.amount = Decimal::ZERO;
        let err = service.create_payment(request).await.unwrap_err();
        assert!(matches!(err, CreatePaymentError::InvalidRequest(_)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store, gateway_config());

        let mut request = widget_request();
        request.user_email = "not-an-email".to_string();
        let err = service.create_payment(request).await.unwrap_err();
        assert!(matches!(err, CreatePaymentError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store, gateway_config());

        let mut request = widget_request();
        request.user_name = "   ".to_string();
        let err = service.create_payment(request).await.unwrap_err();
        assert!(matches!(err, CreatePaymentError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn invalid_cart_items_are_rejected() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store.clone(), gateway_config());

        let mut request = widget_request();
        request.cart_items[0].quantity = 0;
        let err = service.create_payment(request).await.unwrap_err();
        assert!(matches!(err, CreatePaymentError::InvalidRequest(_)));

        let mut request = widget_request();
        request.cart_items[0].price = Decimal::from(-1);
        let err = service.create_payment(request).await.unwrap_err();
        assert!(matches!(err, CreatePaymentError::InvalidRequest(_)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_write() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store.clone(), GatewayConfig::default());

        let err = service.create_payment(widget_request()).await.unwrap_err();
        assert!(matches!(err, CreatePaymentError::CredentialsNotConfigured));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_mode_flag_marks_the_redirect_url() {
        let store = MemoryOrderStore::new();
        let mut config = gateway_config();
        config.test_mode = true;
        let service = PaymentInitiationService::new(store, config);

        let response = service.create_payment(widget_request()).await.unwrap();
        assert!(response.payment_url.contains("IsTest=1"));
    }

    #[tokio::test]
    async fn redirect_overrides_are_carried_and_signed() {
        let store = MemoryOrderStore::new();
        let service = PaymentInitiationService::new(store, gateway_config());

        let mut request = widget_request();
        request.success_url = Some("https://s.example/ok".to_string());
        request.fail_url = Some("https://s.example/fail".to_string());
        let response = service.create_payment(request).await.unwrap();

        assert!(response.payment_url.contains("SuccessUrl2="));
        assert!(response.payment_url.contains("FailUrl2="));
        let expected = signature::sign(
            &[
                "shop1",
                "100.00",
                &response.invoice_id.to_string(),
                "https://s.example/ok",
                "GET",
                "https://s.example/fail",
                "GET",
            ],
            "secret1",
        );
        assert!(response.payment_url.contains(&expected));
    }

    /// Store wrapper that makes the first insert lose the uniqueness race
    /// even though the pre-check saw the id as free.
    #[derive(Clone)]
    struct RacyStore {
        inner: MemoryOrderStore,
        fail_next_create: std::sync::Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl OrderStore for RacyStore {
        async fn create(
            &self,
            order: NewOrder,
            items: Vec<NewOrderItem>,
        ) -> Result<OrderRecord, StoreError> {
            if self.fail_next_create.swap(false, Ordering::SeqCst) {
                return Err(StoreError::UniqueViolation(
                    "orders_invoice_id_key".to_string(),
                ));
            }
            self.inner.create(order, items).await
        }

        async fn find_by_order_number(
            &self,
            order_number: &str,
        ) -> Result<Option<OrderRecord>, StoreError> {
            self.inner.find_by_order_number(order_number).await
        }

        async fn find_by_invoice_id(
            &self,
            invoice_id: i64,
        ) -> Result<Option<OrderRecord>, StoreError> {
            self.inner.find_by_invoice_id(invoice_id).await
        }

        async fn invoice_id_exists(&self, invoice_id: i64) -> Result<bool, StoreError> {
            self.inner.invoice_id_exists(invoice_id).await
        }

        async fn items_for_order(
            &self,
            order_id: Uuid,
        ) -> Result<Vec<crate::entities::OrderItemRecord>, StoreError> {
            self.inner.items_for_order(order_id).await
        }

        async fn set_payment_url(
            &self,
            order_id: Uuid,
            payment_url: &str,
        ) -> Result<(), StoreError> {
            self.inner.set_payment_url(order_id, payment_url).await
        }

        async fn transition_to_paid(
            &self,
            invoice_id: i64,
        ) -> Result<PaidTransition, StoreError> {
            self.inner.transition_to_paid(invoice_id).await
        }
    }

    #[tokio::test]
    async fn insert_race_triggers_bounded_reallocation() {
        let inner = MemoryOrderStore::new();
        let store = RacyStore {
            inner: inner.clone(),
            fail_next_create: std::sync::Arc::new(AtomicBool::new(true)),
        };
        let service = PaymentInitiationService::new(store, gateway_config());

        let response = service.create_payment(widget_request()).await.unwrap();
        assert_eq!(inner.order_count().await, 1);
        assert!(response.payment_url.contains("InvoiceID="));
    }
}
