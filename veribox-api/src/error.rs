//! API error types and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use veribox_common::address::AddressError;
use veribox_delivery::SendError;

/// Errors that can occur while running the HTTP server itself.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Failed to bind to the configured address.
    #[error("Failed to bind API server to {address}: {source}")]
    BindError {
        address: String,
        source: std::io::Error,
    },

    /// The server encountered a runtime error.
    #[error("API server error: {0}")]
    ServerError(String),
}

/// Request-level failures, mapped onto status codes per the error
/// taxonomy: validation → 400, rate limiting → 429, everything
/// unexpected → 500.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field was absent from the request body.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The supplied email address does not parse.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] AddressError),

    /// The caller or the address is over its sliding-window cap.
    #[error("rate limit exceeded, try again later")]
    RateLimited,

    /// Unexpected internal failure. The detail is logged, not returned.
    #[error("internal server error")]
    Internal(String),
}

impl From<SendError> for ApiError {
    fn from(error: SendError) -> Self {
        match error {
            SendError::RateLimited { .. } => Self::RateLimited,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingField(_) | Self::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorBody {
                ok: false,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
