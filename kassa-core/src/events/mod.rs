//! Payment notification channel.
//!
//! The callback handler announces confirmed payments on a tokio mpsc
//! channel and moves on; whatever consumes the receiver (email, Telegram,
//! anything else) is not this crate's concern. Delivery is best-effort by
//! design: a full or closed channel is logged by the sender and never
//! delays or withholds the acknowledgment owed to the gateway.

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Default buffer size for the notification channel.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Emitted exactly once per order, on the pending→paid transition.
#[derive(Debug, Clone)]
pub struct PaymentNotification {
    pub order_id: Uuid,
    pub order_number: String,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub user_email: String,
}

/// Sender handle for payment notifications.
pub type PaymentNotificationSender = mpsc::Sender<PaymentNotification>;
/// Receiver handle for payment notifications.
pub type PaymentNotificationReceiver = mpsc::Receiver<PaymentNotification>;

/// Create a new payment notification channel.
///
/// Multiple senders can be cloned from the returned sender.
pub fn payment_notification_channel() -> (PaymentNotificationSender, PaymentNotificationReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
