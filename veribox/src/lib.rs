//! Veribox: mailbox verification and one-time code delivery.
//!
//! The [`controller::Veribox`] type is the configuration root and the
//! process lifecycle: it wires the delivery service, the mailbox
//! verifier, and the HTTP API together, and tears them down on shutdown.

pub mod controller;

pub use controller::Veribox;
