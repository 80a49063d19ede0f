mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{callback_request, send, spawn_app, start_payment};
use teampay::domain::ports::TeamStore;
use teampay::domain::team::PaymentStatus;
use teampay::interfaces::http::signature::SIGNATURE_HEADER;

#[tokio::test]
async fn test_signed_success_marks_team_paid() {
    let app = spawn_app().await;
    start_payment(&app, "team-1", "TRX-1").await;

    let (status, body) = send(&app.router, callback_request(&app.verifier, "TRX-1", "SUCCESS")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);

    let record = app.teams.get("team-1").await.unwrap().unwrap();
    assert_eq!(record.payment_status, PaymentStatus::Paid);
    assert!(record.paid_at.is_some());
}

#[tokio::test]
async fn test_duplicate_delivery_is_acknowledged_without_second_write() {
    let app = spawn_app().await;
    start_payment(&app, "team-1", "TRX-1").await;

    send(&app.router, callback_request(&app.verifier, "TRX-1", "SUCCESS")).await;
    let first = app.teams.get("team-1").await.unwrap().unwrap();

    let (status, body) = send(&app.router, callback_request(&app.verifier, "TRX-1", "SUCCESS")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(app.teams.get("team-1").await.unwrap().unwrap(), first);

    // A late EXPIRED after PAID is ignored as well.
    let (status, _) = send(&app.router, callback_request(&app.verifier, "TRX-1", "EXPIRED")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.teams.get("team-1").await.unwrap().unwrap(), first);
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let app = spawn_app().await;
    start_payment(&app, "team-1", "TRX-1").await;

    let body = r#"{"trxid":"TRX-1","status":"SUCCESS"}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/payment/callback")
        .header(SIGNATURE_HEADER, "00".repeat(32))
        .body(Body::from(body))
        .unwrap();
    let (status, ack) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ack["status"], false);

    let unsigned = Request::builder()
        .method("POST")
        .uri("/payment/callback")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app.router, unsigned).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(
        app.teams.get("team-1").await.unwrap().unwrap().payment_status,
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = spawn_app().await;

    for body in [r#"{"status":"SUCCESS"}"#, "not json", r#"{"trxid":"  ","status":"SUCCESS"}"#] {
        let request = Request::builder()
            .method("POST")
            .uri("/payment/callback")
            .header(SIGNATURE_HEADER, app.verifier.sign(body.as_bytes()))
            .body(Body::from(body))
            .unwrap();
        let (status, ack) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(ack["status"], false);
    }
}

#[tokio::test]
async fn test_unknown_transaction_gets_negative_ack() {
    let app = spawn_app().await;
    start_payment(&app, "team-1", "TRX-1").await;

    let (status, body) = send(&app.router, callback_request(&app.verifier, "TRX-OLD", "SUCCESS")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], false);
    assert_eq!(
        app.teams.get("team-1").await.unwrap().unwrap().payment_status,
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_unrecognized_status_is_a_noop() {
    let app = spawn_app().await;
    start_payment(&app, "team-1", "TRX-1").await;

    let (status, body) = send(&app.router, callback_request(&app.verifier, "TRX-1", "REFUNDED")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(
        app.teams.get("team-1").await.unwrap().unwrap().payment_status,
        PaymentStatus::Pending
    );
}
