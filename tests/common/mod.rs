#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use teampay::application::service::PaymentService;
use teampay::config::{GatewayConfig, WebhookSecret};
use teampay::domain::ports::{GATEWAY_KEY_SETTING, SettingsStore};
use teampay::infrastructure::gateway_http::HttpGatewayClient;
use teampay::infrastructure::in_memory::{InMemorySettingsStore, InMemoryTeamStore};
use teampay::interfaces::http::signature::{SIGNATURE_HEADER, SignatureVerifier};
use teampay::interfaces::http::{AppState, router};
use tower::ServiceExt;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WEBHOOK_SECRET: &str = "whsec_test";
pub const API_KEY: &str = "test-api-key";

pub struct TestApp {
    pub router: Router,
    pub teams: InMemoryTeamStore,
    pub settings: InMemorySettingsStore,
    pub verifier: SignatureVerifier,
    pub gateway: MockServer,
}

/// Service wired to in-memory stores and a mock gateway.
pub async fn spawn_app() -> TestApp {
    let gateway = MockServer::start().await;
    let teams = InMemoryTeamStore::new();
    let settings = InMemorySettingsStore::new();
    settings.put(GATEWAY_KEY_SETTING, API_KEY).await.unwrap();

    let config = GatewayConfig::new(&gateway.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(500))
        .with_min_amount(dec!(1000));
    let client = HttpGatewayClient::new(config, Arc::new(settings.clone())).unwrap();
    let service = PaymentService::new(Arc::new(teams.clone()), Arc::new(client), dec!(1000));

    let verifier = verifier();
    let router = router(AppState::new(service, verifier.clone()));

    TestApp {
        router,
        teams,
        settings,
        verifier,
        gateway,
    }
}

pub fn verifier() -> SignatureVerifier {
    SignatureVerifier::new(&WebhookSecret::new(WEBHOOK_SECRET).unwrap()).unwrap()
}

pub async fn mock_create(server: &MockServer, trx_id: &str) {
    Mock::given(method("GET"))
        .and(query_param("action", "createpayment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {
                "trxId": trx_id,
                "paymentUrl": format!("https://pay.example/{trx_id}")
            }
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

pub async fn mock_status(server: &MockServer, trx_id: &str, status: &str) {
    Mock::given(method("GET"))
        .and(query_param("action", "checkstatus"))
        .and(query_param("trxid", trx_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": { "status": status }
        })))
        .mount(server)
        .await;
}

pub fn callback_request(verifier: &SignatureVerifier, trx_id: &str, status: &str) -> Request<Body> {
    let body = json!({ "trxid": trx_id, "status": status }).to_string();
    let signature = verifier.sign(body.as_bytes());
    Request::builder()
        .method("POST")
        .uri("/payment/callback")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` when the body is not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Creates the team's gateway transaction through the HTTP surface.
pub async fn start_payment(app: &TestApp, team_id: &str, trx_id: &str) {
    mock_create(&app.gateway, trx_id).await;
    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            &format!("/teams/{team_id}/payment"),
            Some(json!({ "amount": 10000 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["trxId"], trx_id);
}
