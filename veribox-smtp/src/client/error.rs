//! Error types for the SMTP client.

use std::io;

use thiserror::Error;

/// Errors that can occur while driving an SMTP session.
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error during network operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The server's reply could not be parsed as an SMTP response.
    #[error("Failed to parse SMTP response: {0}")]
    ParseError(String),

    /// Connection was closed before a complete response arrived.
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// The server's reply was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Specialized `Result` type for SMTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
