//! End-to-end smoke tests: real sockets against a fully wired service in
//! simulation mode.

use std::sync::Arc;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::broadcast,
};
use veribox::Veribox;
use veribox_api::{ApiServer, ApiState};
use veribox_common::Signal;
use veribox_delivery::DeliveryService;
use veribox_verify::MailboxVerifier;

struct TestService {
    addr: std::net::SocketAddr,
    delivery: Arc<DeliveryService>,
    shutdown: broadcast::Sender<Signal>,
    server: tokio::task::JoinHandle<()>,
}

/// Wire the service exactly like `Veribox::run`, but on an ephemeral port
/// and without the ctrl-c handler.
async fn start_simulated() -> TestService {
    let config = Veribox::from_config_str(
        r#"
        [api]
        listen_address = "127.0.0.1:0"
        "#,
    )
    .expect("config must parse");

    let delivery = Arc::new(DeliveryService::new(config.delivery));
    let verifier = Arc::new(MailboxVerifier::new(config.verifier).expect("verifier must build"));

    let state = ApiState {
        delivery: delivery.clone(),
        verifier,
    };
    let api = ApiServer::bind(&config.api, state)
        .await
        .expect("server must bind");
    let addr = api.local_addr().expect("server must have an address");

    let (shutdown, rx) = broadcast::channel(1);
    let server = tokio::spawn(async move {
        api.serve(rx).await.expect("server must serve");
    });

    TestService {
        addr,
        delivery,
        shutdown,
        server,
    }
}

/// One HTTP/1.1 exchange over a raw socket.
async fn request(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect must work");
    stream
        .write_all(raw.as_bytes())
        .await
        .expect("write must work");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read must work");
    String::from_utf8(response).expect("response must be UTF-8")
}

fn post(path: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn health_and_simulated_send_over_real_sockets() {
    let service = start_simulated().await;

    let health = request(
        service.addr,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(health.starts_with("HTTP/1.1 200"));
    assert!(health.contains("\"smtpConfigured\":false"));

    // Unconfigured delivery: every send simulates and nothing is queued.
    for _ in 0..3 {
        let send = request(
            service.addr,
            &post(
                "/send-code",
                r#"{"email":"a@b.com","username":"X","code":"1234"}"#,
            ),
        )
        .await;
        assert!(send.starts_with("HTTP/1.1 200"));
        assert!(send.contains("\"simulated\":true"));
    }
    assert_eq!(service.delivery.queued_jobs(), 0);

    let missing = request(service.addr, &post("/send-code", r#"{"email":"a@b.com"}"#)).await;
    assert!(missing.starts_with("HTTP/1.1 400"));

    service
        .shutdown
        .send(Signal::Shutdown)
        .expect("shutdown must send");
    service.server.await.expect("server must stop cleanly");
}
