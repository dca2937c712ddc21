//! Result-URL webhook contract.
//!
//! After the payer completes payment, the gateway POSTs a confirmation to
//! the merchant's Result URL. The payload arrives as a query string, a
//! form-encoded body, or JSON, and carries three fields; each has a legacy
//! alias that older gateway configurations still send. The handler must
//! answer with the exact literal `OK<InvId>` — anything else is treated as
//! a delivery failure and retransmitted.

use std::collections::HashMap;

use crate::signature;

/// Canonical amount field.
pub const PARAM_OUT_SUM: &str = "OutSum";
/// Legacy alias for [`PARAM_OUT_SUM`].
pub const PARAM_OUT_SUM_ALIAS: &str = "out_summ";
/// Canonical invoice id field.
pub const PARAM_INV_ID: &str = "InvId";
/// Legacy alias for [`PARAM_INV_ID`].
pub const PARAM_INV_ID_ALIAS: &str = "inv_id";
/// Canonical signature field.
pub const PARAM_SIGNATURE: &str = "SignatureValue";
/// Legacy alias for [`PARAM_SIGNATURE`].
pub const PARAM_SIGNATURE_ALIAS: &str = "crc";

/// A required webhook parameter was absent (or empty) in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing required parameter: {0}")]
pub struct MissingParameter(pub &'static str);

/// The three fields of a Result-URL notification, kept as the raw strings
/// they arrived as. Signature verification must run over these exact
/// strings; re-formatting the amount before verifying would break it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultNotification {
    pub out_sum: String,
    pub inv_id: String,
    pub signature: String,
}

impl ResultNotification {
    /// Extract the notification from a flattened parameter map, accepting
    /// canonical or alias field names. Empty values count as missing.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, MissingParameter> {
        let out_sum = lookup(params, PARAM_OUT_SUM, PARAM_OUT_SUM_ALIAS)
            .ok_or(MissingParameter(PARAM_OUT_SUM))?;
        let inv_id =
            lookup(params, PARAM_INV_ID, PARAM_INV_ID_ALIAS).ok_or(MissingParameter(PARAM_INV_ID))?;
        let signature = lookup(params, PARAM_SIGNATURE, PARAM_SIGNATURE_ALIAS)
            .ok_or(MissingParameter(PARAM_SIGNATURE))?;
        Ok(Self {
            out_sum,
            inv_id,
            signature,
        })
    }

    /// Verify the notification against password #2.
    ///
    /// The webhook tuple is `OutSum:InvId` + secret; the gateway may send
    /// the digest in either case.
    pub fn verify(&self, inbound_secret: &str) -> bool {
        signature::verify(&[&self.out_sum, &self.inv_id], inbound_secret, &self.signature)
    }

    /// The invoice id as an integer, if the field parses as one.
    pub fn invoice_id(&self) -> Option<i64> {
        self.inv_id.trim().parse::<i64>().ok().filter(|id| *id > 0)
    }

    /// The acknowledgment body the gateway expects: `OK<InvId>`, echoing
    /// the invoice id exactly as it was received.
    pub fn acknowledgment(&self) -> String {
        format!("OK{}", self.inv_id)
    }
}

fn lookup(params: &HashMap<String, String>, name: &str, alias: &str) -> Option<String> {
    params
        .get(name)
        .or_else(|| params.get(alias))
        .filter(|value| !value.is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn extracts_canonical_fields() {
        let notification = ResultNotification::from_params(&params(&[
            ("OutSum", "100.00"),
            ("InvId", "12345"),
            ("SignatureValue", "abc"),
        ]))
        .unwrap();
        assert_eq!(notification.out_sum, "100.00");
        assert_eq!(notification.inv_id, "12345");
        assert_eq!(notification.invoice_id(), Some(12345));
        assert_eq!(notification.acknowledgment(), "OK12345");
    }

    #[test]
    fn accepts_legacy_aliases() {
        let notification = ResultNotification::from_params(&params(&[
            ("out_summ", "5.00"),
            ("inv_id", "7"),
            ("crc", "abc"),
        ]))
        .unwrap();
        assert_eq!(notification.out_sum, "5.00");
        assert_eq!(notification.inv_id, "7");
    }

    #[test]
    fn missing_or_empty_field_is_reported_by_name() {
        let err = ResultNotification::from_params(&params(&[
            ("OutSum", "100.00"),
            ("SignatureValue", "abc"),
        ]))
        .unwrap_err();
        assert_eq!(err, MissingParameter(PARAM_INV_ID));

        let err = ResultNotification::from_params(&params(&[
            ("OutSum", ""),
            ("InvId", "12345"),
            ("SignatureValue", "abc"),
        ]))
        .unwrap_err();
        assert_eq!(err, MissingParameter(PARAM_OUT_SUM));
    }

    #[test]
    fn verify_uses_the_webhook_tuple() {
        let digest = signature::sign(&["100.00", "12345"], "secret2");
        let notification = ResultNotification {
            out_sum: "100.00".to_string(),
            inv_id: "12345".to_string(),
            signature: digest.to_uppercase(),
        };
        assert!(notification.verify("secret2"));
        assert!(!notification.verify("secret1"));
        // Known-answer check against an independent MD5 implementation.
        assert_eq!(digest, "4ae8826ca0b611fa8df8d9bd924a5707");
    }

    #[test]
    fn non_numeric_invoice_id_does_not_parse() {
        let notification = ResultNotification {
            out_sum: "1.00".to_string(),
            inv_id: "12x45".to_string(),
            signature: String::new(),
        };
        assert_eq!(notification.invoice_id(), None);
    }
}
