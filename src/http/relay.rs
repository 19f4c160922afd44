//! Redirect-suppressing relay.
//!
//! # Responsibilities
//! - Derive the outbound request from the inbound one
//! - Call the backend through a client that never follows redirects
//! - Mirror the first response: every header value, the status, the body
//! - Stream the body and release the backend body exactly once
//!
//! # Design Decisions
//! - The inbound request is consumed and a fresh outbound request is built;
//!   `Host` is dropped so it is derived from the target URI
//! - Headers are copied before the status is set, and the body is only polled
//!   after the response head exists
//! - Upstream failures become `500 Internal Server Error` with the error text;
//!   nothing is retried

use axum::body::{Body, HttpBody};
use axum::http::{header, HeaderMap, HeaderValue, Request, Response, StatusCode};
use axum::response::IntoResponse;
use futures_util::{stream, StreamExt};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use thiserror::Error;
use tower::Service;

use crate::http::body::{BodyOutcome, BodyTracker};
use crate::observability::metrics;
use crate::plugin::logger::Logger;

/// Failures that happen before a backend response exists.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request URI is not an absolute URL the client can call.
    #[error("invalid upstream target `{uri}`: {reason}")]
    InvalidTarget { uri: String, reason: String },

    /// The outbound call failed (connect, send, timeout, ...).
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Request handler produced by a successful registration.
///
/// Clones share one immutable client, the logger and the body counters.
#[derive(Clone)]
pub struct RelayHandler {
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
    bodies: BodyTracker,
}

impl RelayHandler {
    /// `client` must already be configured not to follow redirects.
    pub fn new(client: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            logger,
            bodies: BodyTracker::new(),
        }
    }

    /// Backend body counters for this handler and its clones.
    pub fn bodies(&self) -> &BodyTracker {
        &self.bodies
    }

    /// Relay one request. The URI must be absolute; the host resolves it.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().clone();

        self.logger
            .debug(format_args!("relaying {} {}", method, request.uri()));

        match self.forward(request).await {
            Ok(upstream) => {
                let response = self.mirror(upstream);
                metrics::record_request(method.as_str(), response.status().as_u16(), start);
                response
            }
            Err(e) => {
                let message = describe(&e);
                self.logger
                    .error(format_args!("{} {} failed: {}", method, e.target(), message));
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                metrics::record_upstream_error();
                metrics::record_request(method.as_str(), status.as_u16(), start);
                error_response(message)
            }
        }
    }

    async fn forward(&self, request: Request<Body>) -> Result<reqwest::Response, RelayError> {
        let (parts, body) = request.into_parts();

        let uri = parts.uri.to_string();
        let url = reqwest::Url::parse(&uri).map_err(|e| RelayError::InvalidTarget {
            uri: uri.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = parts.headers;
        headers.remove(header::HOST);

        let mut outbound = self.client.request(parts.method, url).headers(headers);
        if body.size_hint().exact() != Some(0) {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        Ok(outbound.send().await?)
    }

    fn mirror(&self, upstream: reqwest::Response) -> Response<Body> {
        let status = upstream.status();

        let mut headers = HeaderMap::with_capacity(upstream.headers().len());
        for (name, value) in upstream.headers() {
            self.logger.debug(format_args!(
                "set header {}: {}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            ));
            headers.append(name.clone(), value.clone());
        }

        if status.is_redirection() {
            metrics::record_redirect(status.as_u16());
            let location = headers
                .get(header::LOCATION)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .unwrap_or_default();
            self.logger.debug(format_args!(
                "passing {} through without following (location: {})",
                status.as_u16(),
                location
            ));
        }

        let mut response = Response::new(Body::empty());
        *response.headers_mut() = headers;
        *response.status_mut() = status;

        let mut guard = self.bodies.track();
        if upstream.content_length() == Some(0) {
            guard.mark(BodyOutcome::Complete);
            return response;
        }

        let logger = Arc::clone(&self.logger);
        let chunks = Box::pin(upstream.bytes_stream());
        let body = stream::unfold(Some((chunks, guard, logger)), |state| async move {
            let (mut chunks, mut guard, logger) = state?;
            match chunks.next().await {
                Some(Ok(bytes)) => {
                    guard.record_chunk(bytes.len());
                    Some((Ok(bytes), Some((chunks, guard, logger))))
                }
                Some(Err(e)) => {
                    guard.mark(BodyOutcome::Failed);
                    logger.error(format_args!(
                        "backend body failed after {} bytes: {}",
                        guard.bytes(),
                        describe(&e)
                    ));
                    Some((Err(e), None))
                }
                None => {
                    guard.mark(BodyOutcome::Complete);
                    None
                }
            }
        });

        *response.body_mut() = Body::from_stream(body);
        response
    }
}

impl RelayError {
    fn target(&self) -> String {
        match self {
            RelayError::InvalidTarget { uri, .. } => uri.clone(),
            RelayError::Upstream(e) => e
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
        }
    }
}

impl Service<Request<Body>> for RelayHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(request).await) })
    }
}

/// Error text including every source in the chain.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn error_response(message: String) -> Response<Body> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"))],
        message,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::build_client;
    use crate::plugin::logger::NoopLogger;
    use crate::plugin::registration::RelayOptions;

    fn handler_with(logger: Arc<dyn Logger>) -> RelayHandler {
        RelayHandler::new(build_client(&RelayOptions::default()).unwrap(), logger)
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn relative_uri_is_a_500() {
        let handler = handler_with(Arc::new(NoopLogger));

        let request = Request::builder().uri("/only-a-path").body(Body::empty()).unwrap();
        let response = handler.handle(request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert!(body_text(response).await.contains("invalid upstream target `/only-a-path`"));
        assert_eq!(handler.bodies().released_count(), 0);
    }

    #[tokio::test]
    async fn service_call_matches_handle() {
        let mut handler = handler_with(Arc::new(NoopLogger));
        let request = Request::builder().uri("/relative").body(Body::empty()).unwrap();

        let response = handler.call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn describe_walks_the_chain() {
        let inner =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let outer = crate::plugin::registration::RegistrationError::InvalidOptions(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        );
        assert_eq!(describe(&inner), "connection refused");
        assert!(describe(&outer).starts_with("invalid no-redirect options"));
    }
}
