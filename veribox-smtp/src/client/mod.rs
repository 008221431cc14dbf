//! A minimal SMTP client.
//!
//! The client drives the command/response half of an SMTP session over a
//! plain TCP connection: it sends one command at a time and parses the
//! (possibly multi-line) reply. It deliberately has no opinion about the
//! order of commands — the prober and the mailer sequence the dialogue
//! themselves, because they react to failures very differently.
//!
//! # Example
//!
//! ```no_run
//! use veribox_smtp::client::SmtpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = SmtpClient::connect("mx.example.com:25").await?;
//! let greeting = client.read_greeting().await?;
//! assert!(greeting.is_success());
//!
//! client.helo("verifier.example.net").await?;
//! client.mail_from("probe@example.net").await?;
//! let reply = client.rcpt_to("someone@example.com").await?;
//! println!("server said: {} {}", reply.code, reply.message());
//! client.quit().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod response;
mod smtp_client;

pub use error::{ClientError, Result};
pub use message::MessageBuilder;
pub use response::{Response, ResponseLine};
pub use smtp_client::SmtpClient;
