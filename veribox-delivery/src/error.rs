//! Typed error handling for the delivery pipeline.

use thiserror::Error;

use veribox_smtp::client::ClientError;

/// A failed delivery attempt on the wire.
///
/// Every variant is treated as transient by the pipeline: the backoff
/// wrapper retries it, and whatever survives the schedule lands in the
/// retry queue. There is no permanent class here — submission goes to a
/// relay the operator configured, and a relay that permanently refuses its
/// own operator is a configuration problem, not a per-message verdict.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish the connection.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// An operation exceeded its timeout.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success status.
    #[error("SMTP error: {code} {message}")]
    Smtp { code: u16, message: String },

    /// Protocol-level failure (parse error, connection dropped, IO).
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<ClientError> for TransportError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Io(e) => Self::Connect(format!("I/O error: {e}")),
            ClientError::ConnectionClosed => {
                Self::Protocol("connection closed unexpectedly".to_string())
            }
            ClientError::ParseError(msg) => Self::Protocol(msg),
            ClientError::Utf8Error(e) => Self::Protocol(format!("UTF-8 decoding error: {e}")),
        }
    }
}

/// Errors surfaced to the caller of [`crate::DeliveryService::send_code`].
#[derive(Debug, Error)]
pub enum SendError {
    /// The sliding-window rate limit for `key` is exhausted.
    #[error("rate limit exceeded for {key}")]
    RateLimited { key: String },
}
