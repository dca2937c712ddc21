//! Result-URL callback handling.
//!
//! The gateway retries delivery until it reads the exact `OK<InvId>`
//! acknowledgment, so this handler must be idempotent: only the first
//! delivery for an order performs the pending→paid transition, every
//! later one observes the applied state and acknowledges identically.
//! Signature verification runs before anything touches the store.

use std::collections::HashMap;

use kassa_sdk::config::GatewayConfig;
use kassa_sdk::objects::webhook::{MissingParameter, ResultNotification};

use crate::entities::{OrderRecord, OrderStatus};
use crate::events::{PaymentNotification, PaymentNotificationSender};
use crate::store::{OrderStore, PaidTransition, StoreError};

/// Errors produced by callback handling. Anything but `Ok` makes the
/// server answer non-2xx, which the gateway treats as "retry later".
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error(transparent)]
    MissingParameters(#[from] MissingParameter),
    #[error("payment gateway credentials are not configured")]
    CredentialsNotConfigured,
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("invoice id is not a positive integer: {0}")]
    MalformedInvoiceId(String),
    #[error("no order with invoice id {0}")]
    OrderNotFound(i64),
    #[error("order is {0}, payment cannot be confirmed")]
    InvalidState(OrderStatus),
    #[error(transparent)]
    Store(StoreError),
}

/// Verifies and applies gateway payment confirmations.
pub struct CallbackHandler<S> {
    store: S,
    gateway: GatewayConfig,
    notifications: PaymentNotificationSender,
}

impl<S: OrderStore> CallbackHandler<S> {
    pub fn new(store: S, gateway: GatewayConfig, notifications: PaymentNotificationSender) -> Self {
        Self {
            store,
            gateway,
            notifications,
        }
    }

    /// Handle one delivery of a Result-URL notification.
    ///
    /// Returns the acknowledgment body to send back verbatim.
    #[tracing::instrument(skip_all, err)]
    pub async fn handle(&self, params: &HashMap<String, String>) -> Result<String, CallbackError> {
        let notification = ResultNotification::from_params(params)?;

        let secret = self
            .gateway
            .inbound_secret()
            .ok_or(CallbackError::CredentialsNotConfigured)?;
        if !notification.verify(secret) {
            return Err(CallbackError::InvalidSignature);
        }

        let invoice_id = notification
            .invoice_id()
            .ok_or_else(|| CallbackError::MalformedInvoiceId(notification.inv_id.clone()))?;

        let transition = self
            .store
            .transition_to_paid(invoice_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => CallbackError::OrderNotFound(invoice_id),
                other => CallbackError::Store(other),
            })?;

        match transition {
            PaidTransition::Applied(order) => {
                tracing::info!(
                    order_number = %order.order_number,
                    invoice_id,
                    amount = %order.amount,
                    "order paid"
                );
                self.notify(&order);
                Ok(notification.acknowledgment())
            }
            PaidTransition::AlreadyPaid(order) => {
                tracing::debug!(
                    order_number = %order.order_number,
                    invoice_id,
                    "duplicate payment confirmation acknowledged"
                );
                Ok(notification.acknowledgment())
            }
            PaidTransition::Conflict(status) => Err(CallbackError::InvalidState(status)),
        }
    }

    /// Enqueue the payment notification. Best-effort: the acknowledgment
    /// owed to the gateway must not wait on the notification queue.
    fn notify(&self, order: &OrderRecord) {
        let notification = PaymentNotification {
            order_id: order.id,
            order_number: order.order_number.clone(),
            invoice_id: order.invoice_id,
            amount: order.amount,
            user_email: order.user_email.clone(),
        };
        if let Err(err) = self.notifications.try_send(notification) {
            tracing::error!(
                error = %err,
                order_number = %order.order_number,
                "failed to enqueue payment notification"
            );
        }
    }
}
