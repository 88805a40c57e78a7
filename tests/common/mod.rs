//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use imaginary_adapter::config::AdapterConfig;
use imaginary_adapter::http::HttpServer;
use imaginary_adapter::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Request head as seen by the mock imaginary.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of a header, looked up case-insensitively.
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Where the mock stops answering and waits for the adapter to hang up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stall {
    Never,
    /// Nothing is written back.
    BeforeHead,
    /// Head and `body` are written, but Content-Length promises more.
    MidBody,
}

/// Canned backend answer.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub delay: Duration,
    pub stall: Stall,
    pub on_close: Option<mpsc::UnboundedSender<()>>,
}

impl MockResponse {
    #[allow(dead_code)]
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
            delay: Duration::ZERO,
            stall: Stall::Never,
            on_close: None,
        }
    }

    #[allow(dead_code)]
    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
            stall: Stall::Never,
            on_close: None,
        }
    }

    #[allow(dead_code)]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Stop answering at `stall` and send on `on_close` once the adapter closes the socket.
    #[allow(dead_code)]
    pub fn stalled(mut self, stall: Stall, on_close: mpsc::UnboundedSender<()>) -> Self {
        self.stall = stall;
        self.on_close = Some(on_close);
        self
    }
}

/// Start a mock imaginary that records every request head and answers with `f()`.
pub async fn start_programmable_backend<F, Fut>(
    f: F,
) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let Some(recorded) = read_head(&mut socket).await else {
                            return;
                        };
                        let _ = tx.send(recorded);

                        let response = f().await;
                        tokio::time::sleep(response.delay).await;

                        if response.stall == Stall::BeforeHead {
                            wait_for_close(&mut socket).await;
                            if let Some(on_close) = &response.on_close {
                                let _ = on_close.send(());
                            }
                            return;
                        }

                        let content_length = match response.stall {
                            Stall::MidBody => response.body.len() + 1024 * 1024,
                            _ => response.body.len(),
                        };

                        let reason = StatusCode::from_u16(response.status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let head = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            response.status,
                            reason,
                            response.content_type,
                            content_length
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&response.body).await;

                        if response.stall == Stall::MidBody {
                            wait_for_close(&mut socket).await;
                            if let Some(on_close) = &response.on_close {
                                let _ = on_close.send(());
                            }
                            return;
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a mock imaginary that always returns the same response.
#[allow(dead_code)]
pub async fn start_mock_backend(
    response: MockResponse,
) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>) {
    start_programmable_backend(move || {
        let response = response.clone();
        async move { response }
    })
    .await
}

/// Address on which nothing is listening.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at `backend` with a `/uploads` prefix.
pub fn adapter_config(backend: SocketAddr) -> AdapterConfig {
    let mut config = AdapterConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.imaginary.host = format!("http://{}", backend);
    config.imaginary.file_path_prefix = "/uploads".into();
    config
}

/// Run the adapter on an ephemeral port.
pub async fn start_adapter(config: AdapterConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that bypasses system proxies and connection pooling.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Resolve once the peer closes the connection.
async fn wait_for_close(socket: &mut TcpStream) {
    let mut buf = [0u8; 1024];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}

async fn read_head(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let request_line = lines.next()?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    Some(RecordedRequest {
        request_line,
        headers,
    })
}
