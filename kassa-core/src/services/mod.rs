//! The three services of the payment flow: initiation, callback handling,
//! and status queries. Each is constructed with its store and an explicit
//! [`kassa_sdk::config::GatewayConfig`]; nothing reads global state.

pub mod callback;
pub mod create_payment;
pub mod status;

pub use callback::{CallbackError, CallbackHandler};
pub use create_payment::{CreatePaymentError, PaymentInitiationService};
pub use status::{StatusError, StatusQueryService};

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a monetary amount the way the gateway expects: exactly two
/// decimal places, midpoints rounded away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut normalized = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    normalized.rescale(2);
    normalized.to_string()
}

/// Derive the human-readable order number from the creation date and the
/// invoice id: `ORD-<YYYYMMDD>-<invoice_id>`.
pub fn derive_order_number(date: time::Date, invoice_id: i64) -> String {
    format!(
        "ORD-{:04}{:02}{:02}-{invoice_id}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use time::{Date, Month};

    #[test]
    fn amounts_always_carry_two_decimals() {
        assert_eq!(format_amount(Decimal::from(100)), "100.00");
        assert_eq!(format_amount(Decimal::new(1005, 1)), "100.50");
        assert_eq!(format_amount("99.999".parse().unwrap()), "100.00");
        assert_eq!(format_amount("0.005".parse().unwrap()), "0.01");
    }

    #[test]
    fn order_number_pattern_is_stable() {
        let date = Date::from_calendar_date(2026, Month::August, 6).unwrap();
        assert_eq!(derive_order_number(date, 12345), "ORD-20260806-12345");

        let single_digit = Date::from_calendar_date(2026, Month::January, 3).unwrap();
        assert_eq!(derive_order_number(single_digit, 777), "ORD-20260103-777");
    }
}
