//! Outbound message construction.
//!
//! Builds RFC 5322 messages with either a plain-text body or a
//! `multipart/alternative` body carrying both text and HTML renderings.

use std::io::Write;

use super::error::{ClientError, Result};

/// Builder for outbound email messages.
///
/// # Examples
///
/// ```
/// use veribox_smtp::client::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .from("Verification <no-reply@example.com>")
///     .to("user@example.org")
///     .subject("Your verification code")
///     .text("Your code is 123456")
///     .html("<p>Your code is <b>123456</b></p>")
///     .build()
///     .unwrap();
///
/// assert!(message.contains("multipart/alternative"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
}

impl MessageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the From header. May include a display name.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Add a recipient to the To header.
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Set the Subject header.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain-text body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Set the HTML alternative body.
    #[must_use]
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Build the final message.
    ///
    /// With only a text body the message is a single `text/plain` part;
    /// with an HTML body as well it becomes `multipart/alternative`, text
    /// first so the simplest renderer wins ties.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting fails.
    pub fn build(self) -> Result<String> {
        let mut message = Vec::with_capacity(1024);

        if let Some(from) = &self.from {
            write!(&mut message, "From: {from}\r\n")?;
        }

        if !self.to.is_empty() {
            write!(&mut message, "To: {}\r\n", self.to.join(", "))?;
        }

        if let Some(subject) = &self.subject {
            write!(&mut message, "Subject: {subject}\r\n")?;
        }

        write!(&mut message, "MIME-Version: 1.0\r\n")?;

        if let Some(html) = &self.html {
            let boundary = generate_boundary();

            write!(
                &mut message,
                "Content-Type: multipart/alternative; boundary=\"{boundary}\"\r\n\r\n"
            )?;

            write!(&mut message, "--{boundary}\r\n")?;
            write!(&mut message, "Content-Type: text/plain; charset=utf-8\r\n\r\n")?;
            if let Some(text) = &self.text {
                write!(&mut message, "{text}\r\n")?;
            }

            write!(&mut message, "--{boundary}\r\n")?;
            write!(&mut message, "Content-Type: text/html; charset=utf-8\r\n\r\n")?;
            write!(&mut message, "{html}\r\n")?;

            write!(&mut message, "--{boundary}--\r\n")?;
        } else {
            write!(&mut message, "Content-Type: text/plain; charset=utf-8\r\n\r\n")?;
            if let Some(text) = &self.text {
                write!(&mut message, "{text}")?;
            }
        }

        String::from_utf8(message).map_err(|e| ClientError::Utf8Error(e.utf8_error()))
    }
}

/// Generates a MIME boundary string unique enough for this process.
fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("----=_Part_{timestamp:x}")
}
