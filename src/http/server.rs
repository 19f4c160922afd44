//! Standalone host HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Resolve each inbound request against the upstream
//! - Hand the request to the relay and return its response untouched
//! - Stop gracefully on the shutdown broadcast

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{HostConfig, ValidationError};
use crate::http::relay::RelayHandler;
use crate::http::request::{request_id, request_id_layer, UpstreamTarget};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayHandler,
    pub upstream: Arc<UpstreamTarget>,
}

/// HTTP server hosting one relay handler.
pub struct HttpServer {
    router: Router,
    config: HostConfig,
}

impl HttpServer {
    /// Create a new HTTP server. Fails unless `upstream.url` is an absolute http(s) URL.
    pub fn new(config: HostConfig, relay: RelayHandler) -> Result<Self, ValidationError> {
        let upstream = Arc::new(UpstreamTarget::parse(&config.upstream.url)?);
        let state = AppState { relay, upstream };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &HostConfig, state: AppState) -> Router {
        Router::new()
            .fallback(relay_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

/// Catch-all handler: resolve against the upstream, then relay.
async fn relay_handler(State(state): State<AppState>, request: Request) -> Response<Body> {
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let request = match state.upstream.resolve(request) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                error = %e,
                "Cannot resolve upstream URI"
            );
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %request.uri(),
        "Relaying request"
    );

    let response = state.relay.handle(request).await;

    tracing::debug!(
        request_id = %request_id,
        status = %response.status(),
        "Response head relayed"
    );
    response
}
