//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use graphql_gateway::{GatewayConfig, HttpServer, Shutdown};

/// A canned response served by the mock upstream.
#[derive(Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub omit_content_length: bool,
}

impl MockResponse {
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: value.to_string().into_bytes(),
            omit_content_length: false,
        }
    }

    pub fn text(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: body.as_bytes().to_vec(),
            omit_content_length: false,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serve the body without declaring Content-Length (read-to-EOF body).
    pub fn without_content_length(mut self) -> Self {
        self.omit_content_length = true;
        self
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        302 => "302 Found",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable mock upstream. The closure receives the raw request
/// head (request line + headers) and returns the response to serve.
pub async fn start_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // GET requests have no body; read up to the blank line.
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) => break,
                                Ok(n) => {
                                    head.extend_from_slice(&buf[..n]);
                                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                        break;
                                    }
                                }
                                Err(_) => return,
                            }
                        }

                        let response = f(String::from_utf8_lossy(&head).into_owned()).await;

                        let mut wire = format!(
                            "HTTP/1.1 {}\r\nConnection: close\r\n",
                            status_text(response.status)
                        );
                        for (name, value) in &response.headers {
                            wire.push_str(&format!("{name}: {value}\r\n"));
                        }
                        if !response.omit_content_length {
                            wire.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
                        }
                        wire.push_str("\r\n");

                        let _ = socket.write_all(wire.as_bytes()).await;
                        let _ = socket.write_all(&response.body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Convenience: an upstream serving the same response to every request.
pub async fn start_fixed_upstream(response: MockResponse) -> SocketAddr {
    start_upstream(move |_| {
        let response = response.clone();
        async move { response }
    })
    .await
}

/// Start the gateway on an ephemeral port. Returns the bound address and
/// the shutdown handle keeping the server alive.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Config pointing at a mock upstream, with test-friendly defaults.
pub fn gateway_config(upstream: Option<SocketAddr>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = upstream.map(|addr| format!("http://{addr}"));
    config
}

/// First error code in a GraphQL response body.
#[allow(dead_code)]
pub fn error_code(body: &serde_json::Value) -> String {
    body["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}
