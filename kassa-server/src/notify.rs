//! Payment notification worker.
//!
//! Drains the payment notification channel. The financial state
//! transition never depends on this worker: the callback handler has
//! already acknowledged the gateway by the time a notification lands
//! here.

use tokio::task::JoinHandle;

use kassa_core::events::PaymentNotificationReceiver;

/// Spawn the worker that consumes payment notifications.
pub fn spawn_notification_worker(mut rx: PaymentNotificationReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("payment notification worker started");

        while let Some(notification) = rx.recv().await {
            // TODO: hand off to email/Telegram delivery once those exist.
            tracing::info!(
                order_number = %notification.order_number,
                invoice_id = notification.invoice_id,
                amount = %notification.amount,
                user_email = %notification.user_email,
                "payment received"
            );
        }

        tracing::info!("payment notification channel closed, worker stopping");
    })
}
