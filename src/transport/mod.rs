//! Transport capability used by the token manager and every API operation.
//!
//! [`Transport`] is the seam between request building and the network. The
//! default implementation is [`ReqwestTransport`]; tests substitute a
//! recording double.

pub mod headers;
pub mod http;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use http::ReqwestTransport;

/// Query parameters, ordered by key.
pub type QueryParams = BTreeMap<String, String>;

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request or connection timed out.
    #[error("Request timed out")]
    Timeout,

    /// The redirect limit was exceeded.
    #[error("Too many redirects")]
    TooManyRedirects,

    /// The server answered with a non-success status.
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Any other client-side failure (connect, TLS, I/O).
    #[error("Client error: {0}")]
    Client(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Returns true for the timeout and redirect-limit failures.
    #[must_use]
    pub fn is_timeout_or_redirect(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::TooManyRedirects)
    }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
}

/// Transport options forwarded by the caller, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Total timeout for this request.
    pub timeout: Option<Duration>,
    /// Verify the server's TLS certificate.
    pub verify_tls: bool,
    /// Redirect limit; `Some(0)` disables redirects.
    pub max_redirects: Option<usize>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            verify_tls: true,
            max_redirects: None,
        }
    }
}

impl RequestOptions {
    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set the redirect limit.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// True when the request cannot use the shared client.
    pub(crate) fn needs_dedicated_client(&self) -> bool {
        !self.verify_tls || self.max_redirects.is_some()
    }
}

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: url::Url,
    pub headers: Vec<(String, String)>,
    /// Applied to the URL only when non-empty.
    pub query: QueryParams,
    pub body: RequestBody,
    pub options: RequestOptions,
}

impl HttpRequest {
    /// Create a request with no headers, query, or body.
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
            options: RequestOptions::default(),
        }
    }

    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The URL with the query parameters applied.
    pub fn full_url(&self) -> url::Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// The body as lossy UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Convert a non-success status into [`TransportError::Status`].
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status {
                status: self.status,
                body: self.text(),
            })
        }
    }
}

/// Performs HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the complete response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Name of this transport, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Blanket impl for `Arc<T>`.
#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Blanket impl for `Box<T>`.
#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
