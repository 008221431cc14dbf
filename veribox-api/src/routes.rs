//! Route handlers and JSON request/response types.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use veribox_common::address::EmailAddress;
use veribox_delivery::{DeliveryService, SendDisposition};
use veribox_verify::{DnsError, MailboxVerifier, MxRecord, VerificationOutcome};

use crate::error::ApiError;

/// Shared handler state: the delivery service and the mailbox verifier.
#[derive(Clone)]
pub struct ApiState {
    pub delivery: Arc<DeliveryService>,
    pub verifier: Arc<MailboxVerifier>,
}

/// Build the API router.
#[must_use]
pub fn router(state: ApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/send-code", post(send_code))
        .route("/check-mx", post(check_mx))
        .route("/verify-email", post(verify_email))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    #[serde(rename = "smtpConfigured")]
    smtp_configured: bool,
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        smtp_configured: state.delivery.is_live(),
    })
}

#[derive(Debug, Deserialize)]
struct SendCodeRequest {
    email: Option<String>,
    username: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendCodeResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    simulated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Deliver a verification code.
///
/// The optimistic contract: a 202 means the job is parked for retry, not
/// that delivery will eventually succeed.
async fn send_code(
    State(state): State<ApiState>,
    ConnectInfo(caller): ConnectInfo<SocketAddr>,
    Json(request): Json<SendCodeRequest>,
) -> Result<Response, ApiError> {
    let email = request.email.ok_or(ApiError::MissingField("email"))?;
    let username = request.username.ok_or(ApiError::MissingField("username"))?;
    let code = request.code.ok_or(ApiError::MissingField("code"))?;

    let recipient = EmailAddress::parse(&email)?;

    let disposition = state
        .delivery
        .send_code(recipient, &username, &code, &caller.ip().to_string())
        .await?;

    let response = match disposition {
        SendDisposition::Sent(_) => (
            StatusCode::OK,
            Json(SendCodeResponse {
                ok: true,
                simulated: None,
                message: None,
            }),
        ),
        SendDisposition::Simulated => (
            StatusCode::OK,
            Json(SendCodeResponse {
                ok: true,
                simulated: Some(true),
                message: None,
            }),
        ),
        SendDisposition::Queued => (
            StatusCode::ACCEPTED,
            Json(SendCodeResponse {
                ok: false,
                simulated: None,
                message: Some("Queued for retry".to_string()),
            }),
        ),
    };

    Ok(response.into_response())
}

#[derive(Debug, Deserialize)]
struct EmailRequest {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckMxResponse {
    ok: bool,
    mx: Vec<MxRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Look up the MX records for an address's domain.
async fn check_mx(
    State(state): State<ApiState>,
    Json(request): Json<EmailRequest>,
) -> Result<Response, ApiError> {
    let email = request.email.ok_or(ApiError::MissingField("email"))?;
    let address = EmailAddress::parse(&email)?;

    match state.verifier.lookup_mx(address.domain()).await {
        Ok(mx) => Ok(Json(CheckMxResponse {
            ok: true,
            mx,
            message: None,
        })
        .into_response()),
        Err(DnsError::NoRecords(domain)) => Ok(Json(CheckMxResponse {
            ok: false,
            mx: Vec::new(),
            message: Some(format!("No MX records found for {domain}")),
        })
        .into_response()),
        Err(error) => Err(ApiError::Internal(error.to_string())),
    }
}

#[derive(Debug, Serialize)]
struct VerifyEmailResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Probe whether the mailbox is plausibly deliverable.
async fn verify_email(
    State(state): State<ApiState>,
    Json(request): Json<EmailRequest>,
) -> Result<Response, ApiError> {
    let email = request.email.ok_or(ApiError::MissingField("email"))?;
    // Malformed input is a validation error here, before any network IO.
    EmailAddress::parse(&email)?;

    let outcome = state.verifier.verify(&email).await;
    tracing::debug!(address = %email, %outcome, "verification finished");

    let body = match outcome {
        VerificationOutcome::Verified { mx, info } => VerifyEmailResponse {
            ok: true,
            mx: Some(mx),
            info: Some(info),
            message: None,
            error: None,
        },
        VerificationOutcome::Rejected { mx: _, reason } => VerifyEmailResponse {
            ok: false,
            mx: None,
            info: None,
            message: Some("Mailbox rejected".to_string()),
            error: Some(reason),
        },
        VerificationOutcome::Unresolved { reason } => VerifyEmailResponse {
            ok: false,
            mx: None,
            info: None,
            message: Some(reason),
            error: None,
        },
    };

    Ok(Json(body).into_response())
}
