//! Plantbook API operations and the dispatch path they share.
//!
//! Every operation follows the same sequence: obtain a bearer credential
//! from the [`TokenManager`] (failures propagate as [`Error`]), build the
//! request, send it through the [`Transport`], then map the result.
//! Transport failures on the operation's own request are reported as
//! [`Outcome::Unavailable`] rather than as errors.

pub mod detail;
pub mod register;
pub mod search;
pub mod upload;

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::auth::{Credential, TokenManager};
use crate::error::{Error, Result};
use crate::transport::{
    headers, HttpRequest, HttpResponse, QueryParams, RequestOptions, Transport, TransportError,
};

/// Result of an operation whose request was sent.
///
/// `Unavailable` is the "no result" case: the request failed at the
/// transport level and the failure was logged, not raised.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Unavailable(TransportError),
}

impl<T> Outcome<T> {
    /// The value, or `None` if the request failed.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Unavailable(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The swallowed transport failure, if any.
    pub fn failure(&self) -> Option<&TransportError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Unavailable(e) => Some(e),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Unavailable(e) => Outcome::Unavailable(e),
        }
    }

    /// Surface a swallowed failure as an error.
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Unavailable(e) => Err(Error::Transport(e)),
        }
    }
}

impl<T> From<std::result::Result<T, TransportError>> for Outcome<T> {
    fn from(result: std::result::Result<T, TransportError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::Unavailable(e),
        }
    }
}

/// Caller-forwarded query parameters and transport options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Extra query parameters. Parameters an operation sets explicitly
    /// (`alias`, `lang`) take precedence; for upload these override the
    /// computed `dry_run`.
    pub params: QueryParams,
    /// Forwarded to the transport unmodified, for the operation's own
    /// request only. A token exchange triggered by the call uses the
    /// transport defaults (connect timeout, no read timeout).
    pub request: RequestOptions,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.request.verify_tls = verify;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.request.max_redirects = Some(max);
        self
    }
}

/// Layer `top` over `base`; keys in `top` win.
pub(crate) fn overlay<K, V>(base: &QueryParams, top: impl IntoIterator<Item = (K, V)>) -> QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    let mut merged = base.clone();
    merged.extend(top.into_iter().map(|(k, v)| (k.into(), v.into())));
    merged
}

/// Join path segments onto the API base URL, percent-encoding each one.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<url::Url> {
    let mut url = url::Url::parse(base_url)
        .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("Base URL '{}' cannot carry a path", base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Log a swallowed transport failure and wrap the result.
pub(crate) fn settle<T>(url: &url::Url, result: std::result::Result<T, TransportError>) -> Outcome<T> {
    if let Err(e) = &result {
        match e {
            TransportError::Timeout => error!("Timeout connecting to {}", url),
            TransportError::TooManyRedirects => error!("Too many redirects connecting to {}", url),
            other => error!(url = %url, error = %other, "Request failed"),
        }
    }
    result.into()
}

/// Authorized request dispatch shared by all operations.
pub struct ApiDispatcher {
    auth: Arc<TokenManager>,
    transport: Arc<dyn Transport>,
}

impl ApiDispatcher {
    pub fn new(auth: Arc<TokenManager>, transport: Arc<dyn Transport>) -> Self {
        Self { auth, transport }
    }

    /// Obtain a bearer credential. Failures are propagated as-is.
    pub async fn authorize(&self) -> Result<Credential> {
        self.auth.ensure_token().await.inspect_err(|e| {
            error!(error = %e, "No plantbook token");
        })
    }

    /// Build an endpoint URL under the configured base URL.
    pub fn url(&self, segments: &[&str]) -> Result<url::Url> {
        endpoint(self.auth.identity().base_url(), segments)
    }

    /// Attach the bearer header and send.
    pub async fn send(
        &self,
        mut request: HttpRequest,
        credential: &Credential,
    ) -> std::result::Result<HttpResponse, TransportError> {
        request.headers.extend(headers::api_headers(&credential.access_token));
        self.transport.send(request).await
    }
}

impl std::fmt::Debug for ApiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDispatcher")
            .field("auth", &self.auth)
            .field("transport", &self.transport.name())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::Utc;

    use super::ApiDispatcher;
    use crate::auth::{ClientIdentity, Credential, TokenManager};
    use crate::transport::testing::RecordingTransport;

    pub const BASE_URL: &str = "https://example.invalid/api/v1";

    /// Dispatcher with a pre-seeded credential, so the transport only sees
    /// the operation's own requests.
    pub async fn dispatcher(transport: Arc<RecordingTransport>) -> ApiDispatcher {
        let identity = ClientIdentity::new("id", "secret").with_base_url(BASE_URL);
        let auth = Arc::new(TokenManager::new(identity, transport.clone()));
        auth.set_credential(Credential::issued("TEST_TOKEN", Utc::now(), 3600).unwrap()).await;
        ApiDispatcher::new(auth, transport)
    }
}
