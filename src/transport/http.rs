//! Default [`Transport`] backed by `reqwest`.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{HttpRequest, HttpResponse, Method, RequestBody, RequestOptions, Transport, TransportError};
use crate::config::{CONNECT_TIMEOUT, USER_AGENT};
use crate::error::{Error, Result};

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default client settings.
    pub fn new() -> Result<Self> {
        let client = base_builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a one-off client for options the shared client cannot honour per request.
    fn dedicated_client(options: &RequestOptions) -> std::result::Result<reqwest::Client, TransportError> {
        let mut builder = base_builder();
        if !options.verify_tls {
            warn!("TLS certificate verification disabled for this request");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(max) = options.max_redirects {
            let policy = if max == 0 {
                reqwest::redirect::Policy::none()
            } else {
                reqwest::redirect::Policy::limited(max)
            };
            builder = builder.redirect(policy);
        }
        builder.build().map_err(map_reqwest_error)
    }
}

fn base_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
}

/// Classify a reqwest failure into the transport taxonomy.
fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_redirect() {
        TransportError::TooManyRedirects
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Client(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let client = if request.options.needs_dedicated_client() {
            Self::dedicated_client(&request.options)?
        } else {
            self.client.clone()
        };

        let url = request.full_url();
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.options.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Json(value) => builder.json(value),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
