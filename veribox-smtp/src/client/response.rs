//! SMTP reply parsing.

use super::error::{ClientError, Result};

/// One line of an SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    /// Three-digit status code.
    pub code: u16,
    /// Whether this line terminates the reply (space separator rather
    /// than a dash).
    pub is_last: bool,
    /// Text following the separator.
    pub message: String,
}

impl ResponseLine {
    /// Parse a single reply line of the form `250-text` or `250 text`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ParseError`] when the line does not start
    /// with a status code or uses an unknown separator.
    pub fn parse(line: &str) -> Result<Self> {
        if line.len() < 3 {
            return Err(ClientError::ParseError(format!(
                "reply line too short: {line:?}"
            )));
        }

        let code = line[..3]
            .parse::<u16>()
            .map_err(|_| ClientError::ParseError(format!("invalid status code in {line:?}")))?;

        let is_last = match line.as_bytes().get(3) {
            Some(b' ') | None => true,
            Some(b'-') => false,
            Some(other) => {
                return Err(ClientError::ParseError(format!(
                    "invalid separator {:?} in {line:?}",
                    char::from(*other)
                )));
            }
        };

        let message = line.get(4..).unwrap_or_default().to_string();

        Ok(Self {
            code,
            is_last,
            message,
        })
    }
}

/// A complete (possibly multi-line) SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code shared by every line of the reply.
    pub code: u16,
    /// Message text of each line, separators stripped.
    pub lines: Vec<String>,
}

impl Response {
    #[must_use]
    pub const fn new(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// The reply text with lines joined by newlines.
    #[must_use]
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    /// `true` for 2xx replies.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// `true` for 4xx replies.
    #[must_use]
    pub const fn is_temporary_error(&self) -> bool {
        self.code >= 400 && self.code < 500
    }

    /// `true` for 5xx replies.
    #[must_use]
    pub const fn is_permanent_error(&self) -> bool {
        self.code >= 500 && self.code < 600
    }

    /// Try to parse one complete reply from the front of `buffer`.
    ///
    /// Returns the reply and the number of bytes consumed, or `None` when
    /// the buffer does not yet hold a complete reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ParseError`] on malformed lines or when the
    /// status code changes mid-reply.
    pub fn parse(buffer: &[u8]) -> Result<Option<(Self, usize)>> {
        let mut lines = Vec::new();
        let mut code = None;
        let mut consumed = 0;

        loop {
            let rest = &buffer[consumed..];
            let Some(newline) = rest.iter().position(|&b| b == b'\n') else {
                // No full line buffered yet.
                return Ok(None);
            };

            let raw = std::str::from_utf8(&rest[..newline])?;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            consumed += newline + 1;

            if line.is_empty() {
                continue;
            }

            let parsed = ResponseLine::parse(line)?;

            match code {
                None => code = Some(parsed.code),
                Some(code) if code != parsed.code => {
                    return Err(ClientError::ParseError(format!(
                        "status code changed mid-reply: {code} then {}",
                        parsed.code
                    )));
                }
                Some(_) => {}
            }

            lines.push(parsed.message);

            if parsed.is_last {
                let Some(code) = code else {
                    return Ok(None);
                };
                return Ok(Some((Self::new(code, lines), consumed)));
            }
        }
    }
}
