//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, get as route_get};
use axum::Router;
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use no_redirect::plugin::{Logger, Registerer};
use no_redirect::RelayHandler;

/// Serve `app` on an ephemeral local port.
pub async fn start_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that answers every connection with `response` verbatim.
///
/// The request head is read first so the client never sees a reset.
pub async fn start_raw_backend(response: impl Into<Vec<u8>>) -> SocketAddr {
    start_slow_backend(response, Duration::ZERO).await
}

/// Like [`start_raw_backend`], but keeps the connection open for `hold`
/// after writing `response`.
pub async fn start_slow_backend(response: impl Into<Vec<u8>>, hold: Duration) -> SocketAddr {
    let response: Arc<Vec<u8>> = Arc::new(response.into());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let response = response.clone();
                    tokio::spawn(async move {
                        if !read_head(&mut socket).await {
                            return;
                        }
                        let _ = socket.write_all(&response).await;
                        tokio::time::sleep(hold).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Start a backend that reads one request head and never answers.
///
/// The receiver fires once the client closes the connection.
pub async fn start_stalled_backend() -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });
    (addr, closed_rx)
}

async fn read_head(socket: &mut TcpStream) -> bool {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    true
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Backend with redirect endpoints and a counter of hits on `/final`.
///
/// - `/redirect/{code}` answers `code` with `Location: /final`
/// - `/final` answers 200 `final`
/// - `/ok` answers 200 `ok`
/// - `/echo` answers 200 with the request body, method and seen headers
/// - `/large/{n}` answers 200 with `n` deterministic bytes
pub struct RedirectBackend {
    pub addr: SocketAddr,
    pub final_hits: Arc<AtomicUsize>,
}

impl RedirectBackend {
    pub async fn start() -> Self {
        let final_hits = Arc::new(AtomicUsize::new(0));
        let hits = final_hits.clone();

        let app = Router::new()
            .route(
                "/redirect/{code}",
                route_get(|axum::extract::Path(code): axum::extract::Path<u16>| async move {
                    let status = StatusCode::from_u16(code).unwrap();
                    (status, [("location", "/final")], "moved").into_response()
                }),
            )
            .route(
                "/final",
                route_get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        "final"
                    }
                }),
            )
            .route("/ok", route_get(|| async { "ok" }))
            .route("/echo", any(echo))
            .route(
                "/large/{n}",
                route_get(|axum::extract::Path(n): axum::extract::Path<usize>| async move {
                    payload(n)
                }),
            );

        let addr = start_backend(app).await;
        Self { addr, final_hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn final_hits(&self) -> usize {
        self.final_hits.load(Ordering::SeqCst)
    }
}

async fn echo(request: Request<Body>) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let seen = json!({
        "method": parts.method.as_str(),
        "host": header("host"),
        "request_id": header("x-request-id"),
        "custom": parts
            .headers
            .get_all("x-custom")
            .iter()
            .map(|v| v.to_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>(),
    });
    ([("x-seen", seen.to_string())], bytes)
}

/// Deterministic payload of `n` bytes.
pub fn payload(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 251) as u8).collect()
}

/// Relay built through the public registration path.
pub fn relay(logger: Option<Arc<dyn Logger>>) -> RelayHandler {
    relay_with(json!({ "name": "no-redirect" }), logger)
}

/// Relay registered with an arbitrary configuration mapping.
pub fn relay_with(extra: serde_json::Value, logger: Option<Arc<dyn Logger>>) -> RelayHandler {
    let mut registerer = Registerer::new();
    if let Some(logger) = logger {
        registerer.register_logger(logger);
    }
    let extra = extra.as_object().cloned().unwrap();
    registerer.register_client(&extra).unwrap_or_else(|e| panic!("registration failed: {e}"))
}

pub fn get(url: &str) -> Request<Body> {
    Request::builder().uri(url).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Logger that keeps every line for assertions.
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingLogger {
    fn push(&self, level: &'static str, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push((level, args.to_string()));
    }

    pub fn lines_at(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.push("debug", args)
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.push("info", args)
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        self.push("warning", args)
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.push("error", args)
    }

    fn critical(&self, args: fmt::Arguments<'_>) {
        self.push("critical", args)
    }

    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.push("fatal", args)
    }
}
