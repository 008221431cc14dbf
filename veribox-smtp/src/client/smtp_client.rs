//! Plain-TCP SMTP client connection.

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use super::{
    error::{ClientError, Result},
    response::Response,
};

/// Initial size of the read buffer for server replies.
const BUFFER_SIZE: usize = 4096;

/// Upper bound on the read buffer, in case a server streams garbage.
const MAX_BUFFER_SIZE: usize = 256 * 1024;

/// An SMTP client over a plain TCP connection.
///
/// The caller owns command sequencing; the client only frames commands and
/// parses replies. The socket is released when the client is dropped, so
/// abandoning a session mid-dialogue cannot leak the connection.
pub struct SmtpClient {
    stream: TcpStream,
    buffer: Vec<u8>,
    filled: usize,
}

impl SmtpClient {
    /// Connect to `addr` (a `host:port` pair).
    ///
    /// # Errors
    ///
    /// Returns an error when the TCP connection cannot be established.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;

        Ok(Self {
            stream,
            buffer: vec![0u8; BUFFER_SIZE],
            filled: 0,
        })
    }

    /// Read the server banner sent on connect (usually a 220).
    ///
    /// # Errors
    ///
    /// Returns an error if reading or parsing the banner fails.
    pub async fn read_greeting(&mut self) -> Result<Response> {
        self.read_response().await
    }

    /// Send `command` followed by CRLF and read the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn command(&mut self, command: &str) -> Result<Response> {
        tracing::trace!(command, "SMTP >");
        self.stream
            .write_all(format!("{command}\r\n").as_bytes())
            .await?;
        self.read_response().await
    }

    /// Send `HELO`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn helo(&mut self, hostname: &str) -> Result<Response> {
        self.command(&format!("HELO {hostname}")).await
    }

    /// Send `EHLO`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn ehlo(&mut self, hostname: &str) -> Result<Response> {
        self.command(&format!("EHLO {hostname}")).await
    }

    /// Send `MAIL FROM`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn mail_from(&mut self, from: &str) -> Result<Response> {
        self.command(&format!("MAIL FROM:<{from}>")).await
    }

    /// Send `RCPT TO`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn rcpt_to(&mut self, to: &str) -> Result<Response> {
        self.command(&format!("RCPT TO:<{to}>")).await
    }

    /// Send `DATA`. The server is expected to answer 354.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn data(&mut self) -> Result<Response> {
        self.command("DATA").await
    }

    /// Send message content followed by the end-of-data marker.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading the final reply fails.
    pub async fn send_data(&mut self, data: &str) -> Result<Response> {
        self.stream.write_all(data.as_bytes()).await?;

        // Terminate the last line before the dot, whatever the caller gave us.
        if !data.ends_with("\r\n") {
            self.stream.write_all(b"\r\n").await?;
        }

        self.stream.write_all(b".\r\n").await?;
        self.read_response().await
    }

    /// Send `QUIT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn quit(&mut self) -> Result<Response> {
        self.command("QUIT").await
    }

    /// Read one complete reply, growing the buffer as needed.
    async fn read_response(&mut self) -> Result<Response> {
        loop {
            if let Some((response, consumed)) = Response::parse(&self.buffer[..self.filled])? {
                self.buffer.copy_within(consumed..self.filled, 0);
                self.filled -= consumed;
                tracing::trace!(code = response.code, "SMTP <");
                return Ok(response);
            }

            if self.filled == self.buffer.len() {
                let grown = self.buffer.len() * 2;
                if grown > MAX_BUFFER_SIZE {
                    return Err(ClientError::ParseError(format!(
                        "reply exceeds {MAX_BUFFER_SIZE} bytes"
                    )));
                }
                self.buffer.resize(grown, 0);
            }

            let n = self.stream.read(&mut self.buffer[self.filled..]).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.filled += n;
        }
    }
}
