//! HTTP adapters: the gateway webhook and the team payment endpoints.

pub mod error;
pub mod signature;
pub mod teams;
pub mod webhook;

use crate::application::service::PaymentService;
use axum::Router;
use axum::routing::{get, post, put};
use self::signature::SignatureVerifier;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PaymentService>,
    pub verifier: Arc<SignatureVerifier>,
}

impl AppState {
    pub fn new(service: PaymentService, verifier: SignatureVerifier) -> Self {
        Self {
            service: Arc::new(service),
            verifier: Arc::new(verifier),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/payment/callback", post(webhook::payment_callback))
        .route("/payouts", get(teams::payout_report))
        .route("/teams/:team_id/payment", post(teams::start_payment))
        .route("/teams/:team_id/payment/check", post(teams::check_payment))
        .route("/teams/:team_id/payment/verify", post(teams::verify_payment))
        .route("/teams/:team_id/recorded-amount", put(teams::record_amount))
        .route("/teams/:team_id/payout", get(teams::payout))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
