use super::AppState;
use super::error::ApiError;
use crate::application::service::TeamPayout;
use crate::domain::gateway::CreatedTransaction;
use crate::domain::payout::PayoutComputation;
use crate::domain::team::{PaymentStatus, TeamPaymentRecord};
use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct StartPaymentRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RecordAmountRequest {
    pub amount: Option<Decimal>,
}

/// Payout figures as shown to administrators: rounded to cents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutResponse {
    pub team_id: String,
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub payout: PayoutComputation,
}

impl From<TeamPayout> for PayoutResponse {
    fn from(team: TeamPayout) -> Self {
        Self {
            payout: team.payout.rounded(),
            team_id: team.team_id,
            payment_status: team.payment_status,
        }
    }
}

pub async fn start_payment(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<StartPaymentRequest>,
) -> Result<Json<CreatedTransaction>, ApiError> {
    let created = state.service.start_payment(&team_id, request.amount).await?;
    Ok(Json(created))
}

pub async fn check_payment(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamPaymentRecord>, ApiError> {
    Ok(Json(state.service.check_payment(&team_id).await?))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamPaymentRecord>, ApiError> {
    Ok(Json(state.service.verify_payment(&team_id).await?))
}

pub async fn record_amount(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<RecordAmountRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let payout = state.service.record_amount(&team_id, request.amount).await?;
    Ok(Json(payout.into()))
}

pub async fn payout(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<PayoutResponse>, ApiError> {
    Ok(Json(state.service.payout(&team_id).await?.into()))
}

pub async fn payout_report(
    State(state): State<AppState>,
) -> Result<Json<Vec<PayoutResponse>>, ApiError> {
    let report = state.service.payout_report().await?;
    Ok(Json(report.into_iter().map(PayoutResponse::from).collect()))
}
