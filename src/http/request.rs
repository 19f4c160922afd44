//! Inbound request preparation in the standalone host.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) as early as possible for tracing
//! - Resolve the inbound URI against the configured upstream
//!
//! # Design Decisions
//! - An ID already supplied by the caller is kept
//! - The ID travels to the backend with the other inbound headers
//! - Only scheme and authority are replaced; path and query are untouched

use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderName, Request, Uri};
use std::str::FromStr;
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use url::Url;

use crate::config::ValidationError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Layer that stamps `x-request-id` on every inbound request.
pub fn request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId)
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Scheme and authority every inbound request is sent to.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamTarget {
    /// Accepts absolute `http`/`https` URLs with a host.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::UpstreamUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(invalid(format!("unsupported scheme {}", other))),
        };
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?;
        Ok(Self { scheme, authority })
    }

    /// Rewrite `request` so its URI points at the upstream.
    pub fn resolve<B>(&self, mut request: Request<B>) -> Result<Request<B>, axum::http::Error> {
        let mut parts = request.uri().clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some("/".parse()?);
        }
        *request.uri_mut() = Uri::from_parts(parts)?;
        Ok(request)
    }
}
