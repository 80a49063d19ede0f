use crate::error::PaymentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Maps a [`PaymentError`] onto an HTTP status and a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            PaymentError::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            PaymentError::TeamNotFound(_) => (StatusCode::NOT_FOUND, "team_not_found"),
            PaymentError::TrxMismatch { .. } => (StatusCode::CONFLICT, "trx_mismatch"),
            PaymentError::TransactionAlreadyAssigned { .. } => {
                (StatusCode::CONFLICT, "transaction_already_assigned")
            }
            PaymentError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            PaymentError::Gateway(_) => (StatusCode::BAD_GATEWAY, "gateway_unavailable"),
            PaymentError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self.0 {
            PaymentError::Gateway(_) => {
                "payment status could not be confirmed, please try again".to_string()
            }
            PaymentError::Configuration(_) => "payment temporarily unavailable".to_string(),
            other if status.is_server_error() => {
                tracing::error!(error = %other, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        if let PaymentError::Gateway(err) = &self.0 {
            tracing::warn!(error = %err, "gateway call failed");
        }
        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
