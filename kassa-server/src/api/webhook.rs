use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use kassa_core::services::{CallbackError, CallbackHandler};
use kassa_core::store::PgOrderStore;

use crate::state::AppState;

/// `POST /payments/result` — gateway Result-URL webhook.
///
/// The gateway may deliver the confirmation as a query string, a
/// form-encoded body or JSON; everything is flattened into one string map
/// (body fields win over query fields) before handling. The success body
/// is the exact literal `OK<InvId>` — any other body or a non-2xx status
/// makes the gateway retransmit.
pub(super) async fn payment_result(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut params = query;
    params.extend(parse_body(&headers, &body));

    let gateway = state.config.read().await.gateway.clone();
    let handler = CallbackHandler::new(
        PgOrderStore::new(state.db.clone()),
        gateway,
        state.notifications.clone(),
    );

    match handler.handle(&params).await {
        Ok(ack) => (StatusCode::OK, ack).into_response(),
        Err(err) => error_response(err),
    }
}

/// Flatten the request body into string parameters.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> HashMap<String, String> {
    if body.is_empty() {
        return HashMap::new();
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(body) {
            Ok(map) => map
                .into_iter()
                .map(|(key, value)| (key, json_value_to_string(value)))
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "webhook body is not a json object");
                HashMap::new()
            }
        }
    } else {
        url::form_urlencoded::parse(body).into_owned().collect()
    }
}

fn json_value_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn error_response(err: CallbackError) -> Response {
    let (status, message) = match &err {
        CallbackError::MissingParameters(_) => {
            (StatusCode::BAD_REQUEST, "missing required parameters")
        }
        CallbackError::InvalidSignature => (StatusCode::BAD_REQUEST, "invalid signature"),
        CallbackError::MalformedInvoiceId(_) => (StatusCode::BAD_REQUEST, "invalid invoice id"),
        CallbackError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "order not found"),
        CallbackError::InvalidState(_) => (StatusCode::CONFLICT, "order is not payable"),
        CallbackError::CredentialsNotConfigured => {
            tracing::error!("webhook verification secret is not configured");
            (StatusCode::INTERNAL_SERVER_ERROR, "configuration error")
        }
        CallbackError::Store(e) => {
            tracing::error!(error = %e, "webhook database error");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    };
    tracing::warn!(error = %err, %status, "webhook rejected");
    (status, message).into_response()
}
