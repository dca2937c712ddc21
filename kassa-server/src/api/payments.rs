use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use kassa_core::services::{CreatePaymentError, PaymentInitiationService};
use kassa_core::store::PgOrderStore;
use kassa_sdk::objects::CreatePaymentRequest;

use crate::state::AppState;

/// `POST /payments` — create a payable order.
///
/// Validates the storefront request, persists the order with its items
/// and returns the signed redirect URL for the gateway's payment page.
pub(super) async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let gateway = state.config.read().await.gateway.clone();
    let service = PaymentInitiationService::new(PgOrderStore::new(state.db.clone()), gateway);

    let response = service
        .create_payment(request)
        .await
        .map_err(PaymentApiError)?;
    Ok(Json(response))
}

/// Error wrapper mapping service failures onto HTTP statuses.
#[derive(Debug)]
pub(super) struct PaymentApiError(CreatePaymentError);

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            CreatePaymentError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            CreatePaymentError::CredentialsNotConfigured => {
                tracing::error!("payment gateway credentials are not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "payment gateway is not configured",
                )
                    .into_response()
            }
            CreatePaymentError::Allocation(e) => {
                tracing::error!(error = %e, "invoice allocation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            CreatePaymentError::Store(e) => {
                tracing::error!(error = %e, "order persistence failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            CreatePaymentError::RedirectUrl(e) => {
                tracing::error!(error = %e, "redirect url construction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
