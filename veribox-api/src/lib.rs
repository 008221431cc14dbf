//! HTTP surface for the verification service.
//!
//! Thin JSON wrappers over [`veribox_delivery::DeliveryService`] and
//! [`veribox_verify::MailboxVerifier`]; all protocol and failure-handling
//! logic lives in those crates.
//!
//! # Endpoints
//!
//! - **`GET /health`** — liveness plus whether live sending is configured
//! - **`POST /send-code`** — rate-checked delivery of a verification code
//! - **`POST /check-mx`** — MX record lookup for an address's domain
//! - **`POST /verify-email`** — full mailbox verification probe

mod config;
mod error;
mod routes;
mod server;

pub use config::ApiConfig;
pub use error::{ApiError, ApiServerError};
pub use routes::{ApiState, router};
pub use server::ApiServer;
