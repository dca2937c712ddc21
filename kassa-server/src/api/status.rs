use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use kassa_core::services::{StatusError, StatusQueryService};
use kassa_core::store::PgOrderStore;

use crate::state::AppState;

/// `GET /orders/{order_number}/status` — poll order status.
///
/// Returns the current status of the order; `paid_at` is present only
/// once the order is paid.
pub(super) async fn order_status(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<impl IntoResponse, StatusApiError> {
    let service = StatusQueryService::new(PgOrderStore::new(state.db.clone()));
    let status = service
        .get_status(&order_number)
        .await
        .map_err(StatusApiError)?;
    Ok(Json(status))
}

/// Error wrapper mapping status query failures onto HTTP statuses.
#[derive(Debug)]
pub(super) struct StatusApiError(StatusError);

impl IntoResponse for StatusApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            StatusError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "order not found").into_response()
            }
            StatusError::Store(e) => {
                tracing::error!(error = %e, "status query database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
