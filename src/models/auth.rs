//! Authentication-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth client identity supplied at construction.
///
/// Only ever sent to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    client_id: String,
    client_secret: String,
    base_url: String,
}

impl ClientIdentity {
    /// Create an identity against the production API.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the identity at another API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when both the client id and the secret are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// A bearer credential and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// OAuth access token.
    pub access_token: String,
    /// Exchange time plus the server-reported lifetime.
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Build a credential that expires `expires_in` seconds after `issued_at`.
    ///
    /// `None` when the expiry is outside the representable date range.
    pub fn issued(
        access_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_in: i64,
    ) -> Option<Self> {
        let lifetime = chrono::Duration::try_seconds(expires_in)?;
        let expires_at = issued_at.checked_add_signed(lifetime)?;
        Some(Self::new(access_token, expires_at))
    }

    /// Reusable at `now` when `now + window < expires_at`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: std::time::Duration) -> bool {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        match now.checked_add_signed(window) {
            Some(deadline) => deadline < self.expires_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body of the `/token/` endpoint response.
///
/// Every field is optional: a rejected exchange comes back without an
/// access token rather than as a transport failure.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}
