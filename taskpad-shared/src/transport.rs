//! Transport contract between the client shell and a server
//!
//! The client never calls the dispatcher directly. It builds an
//! [`HttpRequest`] and hands it to a [`Transport`], which eventually yields an
//! [`HttpResponse`] whose body is the JSON envelope. The in-process shim in
//! `taskpad-api` is one implementation; anything that can carry an HTTP
//! request (a real network client, a test double) can be another.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use taskpad_shared::transport::{HttpRequest, HttpResponse, Transport, TransportError};
//!
//! struct AlwaysOk;
//!
//! #[async_trait]
//! impl Transport for AlwaysOk {
//!     async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
//!         Ok(HttpResponse::new(200, r#"{"status":200,"success":true,"message":"ok"}"#))
//!     }
//! }
//! ```

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};

/// Error type for transport-level failures
///
/// These are failures to deliver a request at all. A delivered request that
/// the server rejects is an `HttpResponse` with a non-2xx status, not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Request never reached the server
    #[error("Network error: {0}")]
    Network(String),

    /// Request object was used out of order (e.g. `send` before `open`)
    #[error("Invalid request state: {0}")]
    InvalidState(String),

    /// Header name or value is not valid HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Request handed to a transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Adds a header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, TransportError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Sets the body text
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Token from an `Authorization: Bearer <token>` header, if any
    pub fn bearer_token(&self) -> Option<&str> {
        bearer_token(&self.headers)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// Anything else (missing header, other scheme, empty token) is `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Response produced by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response body (a JSON envelope for Taskpad servers)
    pub response_text: String,
}

impl HttpResponse {
    pub fn new(status: u16, response_text: impl Into<String>) -> Self {
        Self {
            status,
            response_text: response_text.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Asynchronous request carrier
///
/// Callers must not assume completion happens before `send` returns its
/// future, even when an implementation finishes synchronously.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers `request` and resolves to the server's response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
