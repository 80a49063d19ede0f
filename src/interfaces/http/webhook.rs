use super::AppState;
use super::signature::SIGNATURE_HEADER;
use crate::domain::team::ExternalStatus;
use crate::error::PaymentError;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct CallbackPayload {
    trxid: String,
    status: ExternalStatus,
}

/// Acknowledgement read by the gateway's redelivery policy.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CallbackAck {
    pub status: bool,
}

fn ack(code: StatusCode, status: bool) -> (StatusCode, Json<CallbackAck>) {
    (code, Json(CallbackAck { status }))
}

/// `POST /payment/callback`.
///
/// The raw body is taken as bytes so the signature covers exactly what the
/// gateway sent. Duplicate or late deliveries for a settled team are
/// acknowledged with `status: true`; only storage failures ask for a retry.
pub async fn payment_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<CallbackAck>) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let Some(signature) = signature else {
        tracing::warn!("callback without signature");
        return ack(StatusCode::UNAUTHORIZED, false);
    };
    if !state.verifier.verify(&body, signature) {
        tracing::warn!("callback with invalid signature");
        return ack(StatusCode::UNAUTHORIZED, false);
    }

    let payload: CallbackPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "malformed callback payload");
            return ack(StatusCode::BAD_REQUEST, false);
        }
    };
    let trx_id = payload.trxid.trim();
    if trx_id.is_empty() {
        tracing::warn!("callback without trxid");
        return ack(StatusCode::BAD_REQUEST, false);
    }

    match state.service.handle_callback(trx_id, &payload.status).await {
        Ok(outcome) => {
            tracing::info!(trx_id, status = %payload.status, ?outcome, "callback processed");
            ack(StatusCode::OK, true)
        }
        Err(PaymentError::TrxMismatch { .. }) => ack(StatusCode::OK, false),
        Err(e) => {
            tracing::error!(trx_id, error = %e, "callback processing failed");
            ack(StatusCode::INTERNAL_SERVER_ERROR, false)
        }
    }
}
