//! Mock SMTP relay for submission tests.
//!
//! Responses for each stage of the dialogue are configurable, so tests can
//! stage acceptance and failure behaviour on a local port, and inspect the
//! commands and message content a transaction produced.
#![allow(dead_code)] // Test utility module - not all methods used in every test

use std::{net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::RwLock,
    task::JoinHandle,
};

/// One canned SMTP reply.
#[derive(Debug, Clone)]
pub struct CannedReply {
    pub code: u16,
    pub message: String,
}

impl CannedReply {
    fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_line(&self) -> String {
        format!("{} {}\r\n", self.code, self.message)
    }
}

#[derive(Debug, Clone)]
struct MockServerConfig {
    greeting: CannedReply,
    helo: CannedReply,
    mail_from: CannedReply,
    rcpt_to: CannedReply,
    data: CannedReply,
    data_end: CannedReply,
    quit: CannedReply,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            greeting: CannedReply::new(220, "mock.example.com ESMTP ready"),
            helo: CannedReply::new(250, "mock.example.com"),
            mail_from: CannedReply::new(250, "OK"),
            rcpt_to: CannedReply::new(250, "OK"),
            data: CannedReply::new(354, "End data with <CRLF>.<CRLF>"),
            data_end: CannedReply::new(250, "OK: queued"),
            quit: CannedReply::new(221, "Bye"),
        }
    }
}

/// Builder for [`MockSmtpServer`].
#[derive(Debug, Default)]
pub struct MockSmtpServerBuilder {
    config: MockServerConfig,
}

impl MockSmtpServerBuilder {
    #[must_use]
    pub fn with_greeting(mut self, code: u16, message: &str) -> Self {
        self.config.greeting = CannedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_helo_response(mut self, code: u16, message: &str) -> Self {
        self.config.helo = CannedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_mail_from_response(mut self, code: u16, message: &str) -> Self {
        self.config.mail_from = CannedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_rcpt_to_response(mut self, code: u16, message: &str) -> Self {
        self.config.rcpt_to = CannedReply::new(code, message);
        self
    }

    #[must_use]
    pub fn with_data_end_response(mut self, code: u16, message: &str) -> Self {
        self.config.data_end = CannedReply::new(code, message);
        self
    }

    /// Bind to an ephemeral localhost port and start serving.
    pub async fn build(self) -> std::io::Result<MockSmtpServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let commands = Arc::new(RwLock::new(Vec::new()));

        let config = self.config;
        let recorded = commands.clone();
        let accept_loop = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let config = config.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = handle_session(stream, config, recorded).await;
                });
            }
        });

        Ok(MockSmtpServer {
            addr,
            commands,
            accept_loop,
        })
    }
}

/// A mock SMTP server bound to an ephemeral localhost port.
pub struct MockSmtpServer {
    addr: SocketAddr,
    commands: Arc<RwLock<Vec<String>>>,
    accept_loop: JoinHandle<()>,
}

impl MockSmtpServer {
    #[must_use]
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder::default()
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Every command line received so far, in order.
    pub async fn commands(&self) -> Vec<String> {
        self.commands.read().await.clone()
    }

    pub fn shutdown(&self) {
        self.accept_loop.abort();
    }
}

impl Drop for MockSmtpServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

async fn handle_session(
    stream: TcpStream,
    config: MockServerConfig,
    recorded: Arc<RwLock<Vec<String>>>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half
        .write_all(config.greeting.to_line().as_bytes())
        .await?;

    let mut line = String::new();
    let mut in_data = false;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let command = line.trim_end().to_string();

        if in_data {
            if command == "." {
                in_data = false;
                recorded.write().await.push(".".to_string());
                write_half
                    .write_all(config.data_end.to_line().as_bytes())
                    .await?;
            } else {
                recorded.write().await.push(command);
            }
            continue;
        }

        recorded.write().await.push(command.clone());

        let upper = command.to_uppercase();
        let reply = if upper.starts_with("HELO") || upper.starts_with("EHLO") {
            &config.helo
        } else if upper.starts_with("MAIL") {
            &config.mail_from
        } else if upper.starts_with("RCPT") {
            &config.rcpt_to
        } else if upper.starts_with("DATA") {
            in_data = config.data.code == 354;
            &config.data
        } else if upper.starts_with("QUIT") {
            write_half
                .write_all(config.quit.to_line().as_bytes())
                .await?;
            return Ok(());
        } else {
            write_half.write_all(b"502 Command not implemented\r\n").await?;
            continue;
        };

        write_half.write_all(reply.to_line().as_bytes()).await?;
    }
}
