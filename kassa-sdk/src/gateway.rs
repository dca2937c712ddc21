//! Redirect-URL construction for the gateway's payment page.
//!
//! The query parameter names, their order of appearance, and both signature
//! tuples are gateway-mandated protocol constants:
//!
//! * without redirect overrides the signature covers
//!   `MerchantLogin:OutSum:InvId` + password #1;
//! * with `SuccessUrl2`/`FailUrl2` overrides the tuple grows to
//!   `MerchantLogin:OutSum:InvId:SuccessUrl2:SuccessUrl2Method:FailUrl2:FailUrl2Method`
//!   + password #1, with an absent override encoded as the empty string.

use url::Url;

use crate::signature;

/// Payment page of the production gateway.
pub const DEFAULT_GATEWAY_URL: &str = "https://auth.robokassa.ru/Merchant/Index.aspx";

/// HTTP method the gateway uses for success/fail redirects.
pub const REDIRECT_METHOD: &str = "GET";

/// Interface language requested from the gateway's payment page.
pub const CULTURE: &str = "ru";

/// Everything that goes into one redirect URL.
#[derive(Debug, Clone)]
pub struct RedirectParams<'a> {
    pub merchant_login: &'a str,
    /// Amount formatted to exactly two decimal places.
    pub out_sum: &'a str,
    pub invoice_id: i64,
    pub email: &'a str,
    pub description: &'a str,
    pub is_test: bool,
    pub success_url: Option<&'a str>,
    pub fail_url: Option<&'a str>,
}

/// Build the signed redirect URL for the gateway's payment page.
///
/// `secret` is password #1. Fails only if `base` is not a valid URL.
pub fn build_redirect_url(
    base: &str,
    params: &RedirectParams<'_>,
    secret: &str,
) -> Result<Url, url::ParseError> {
    let invoice_id = params.invoice_id.to_string();

    let signature = if params.success_url.is_some() || params.fail_url.is_some() {
        let success = params.success_url.unwrap_or("");
        let fail = params.fail_url.unwrap_or("");
        signature::sign(
            &[
                params.merchant_login,
                params.out_sum,
                &invoice_id,
                success,
                REDIRECT_METHOD,
                fail,
                REDIRECT_METHOD,
            ],
            secret,
        )
    } else {
        signature::sign(&[params.merchant_login, params.out_sum, &invoice_id], secret)
    };

    let mut url = Url::parse(base)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("MerchantLogin", params.merchant_login);
        query.append_pair("OutSum", params.out_sum);
        query.append_pair("InvoiceID", &invoice_id);
        query.append_pair("SignatureValue", &signature);
        query.append_pair("Email", params.email);
        query.append_pair("Culture", CULTURE);
        query.append_pair("Description", params.description);
        if params.is_test {
            query.append_pair("IsTest", "1");
        }
        if let Some(success) = params.success_url {
            query.append_pair("SuccessUrl2", success);
            query.append_pair("SuccessUrl2Method", REDIRECT_METHOD);
        }
        if let Some(fail) = params.fail_url {
            query.append_pair("FailUrl2", fail);
            query.append_pair("FailUrl2Method", REDIRECT_METHOD);
        }
    }
    Ok(url)
}
