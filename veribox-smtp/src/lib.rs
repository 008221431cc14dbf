//! SMTP client plumbing shared by the mailbox prober and the delivery
//! transport.
//!
//! Everything here speaks plain TCP: the probe path never negotiates TLS,
//! and submission goes to a relay the operator controls.

pub mod client;

pub use client::{ClientError, MessageBuilder, Response, ResponseLine, SmtpClient};
