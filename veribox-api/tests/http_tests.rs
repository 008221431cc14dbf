//! Router-level tests over the full HTTP stack.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use veribox_api::{ApiState, router};
use veribox_delivery::{DeliveryConfig, DeliveryService};
use veribox_verify::{MailboxVerifier, ProbeConfig};

fn simulated_app() -> Router {
    let state = ApiState {
        delivery: Arc::new(DeliveryService::with_transport(
            &DeliveryConfig::default(),
            None,
        )),
        verifier: Arc::new(
            MailboxVerifier::new(ProbeConfig::default()).expect("verifier must build"),
        ),
    };

    router(state, Duration::from_secs(5))
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request must build")
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.expect("body must collect");
    serde_json::from_slice(&bytes).expect("body must be JSON")
}

#[tokio::test]
async fn health_answers_with_configuration_state() {
    let app = simulated_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request must build"),
        )
        .await
        .expect("request must succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body, json!({ "ok": true, "smtpConfigured": false }));
}

#[tokio::test]
async fn send_code_simulates_end_to_end() {
    let app = simulated_app();

    let response = app
        .oneshot(post_json(
            "/send-code",
            json!({ "email": "a@b.com", "username": "X", "code": "1234" }),
        ))
        .await
        .expect("request must succeed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["simulated"], true);
}

#[tokio::test]
async fn send_code_missing_field_is_a_400() {
    let app = simulated_app();

    let response = app
        .oneshot(post_json("/send-code", json!({ "email": "a@b.com" })))
        .await
        .expect("request must succeed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rapid_sends_trip_the_rate_limit_on_the_eleventh() {
    let app = simulated_app();

    for n in 1..=10 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/send-code",
                json!({ "email": "a@b.com", "username": "X", "code": "1234" }),
            ))
            .await
            .expect("request must succeed");
        assert_eq!(response.status(), StatusCode::OK, "send {n} was refused");
    }

    let response = app
        .oneshot(post_json(
            "/send-code",
            json!({ "email": "a@b.com", "username": "X", "code": "1234" }),
        ))
        .await
        .expect("request must succeed");

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn check_mx_rejects_malformed_input() {
    let app = simulated_app();

    let response = app
        .oneshot(post_json("/check-mx", json!({ "email": "nonsense" })))
        .await
        .expect("request must succeed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn verify_email_rejects_malformed_input_without_probing() {
    let app = simulated_app();

    let response = app
        .oneshot(post_json("/verify-email", json!({ "email": "@@@" })))
        .await
        .expect("request must succeed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
