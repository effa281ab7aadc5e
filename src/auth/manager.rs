//! Token lifecycle manager.
//!
//! Decides whether the cached credential can be reused, refreshes it when it
//! cannot, and keeps concurrent callers from refreshing twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::TOKEN_FRESHNESS_WINDOW;
use crate::error::{Error, Result};
use crate::models::auth::{ClientIdentity, Credential};
use crate::transport::Transport;

/// Owns the single live bearer credential for one client identity.
///
/// Thread-safe: the credential sits behind a `RwLock`. Readers share the
/// fast path; a refresh holds the write lock, so callers that find the
/// credential stale while another refresh is running wait for it and then
/// reuse its result instead of exchanging again.
pub struct TokenManager {
    identity: ClientIdentity,
    transport: Arc<dyn Transport>,
    credential: RwLock<Option<Credential>>,
    freshness_window: Duration,
}

impl TokenManager {
    /// Create a manager with no cached credential.
    pub fn new(identity: ClientIdentity, transport: Arc<dyn Transport>) -> Self {
        Self {
            identity,
            transport,
            credential: RwLock::new(None),
            freshness_window: TOKEN_FRESHNESS_WINDOW,
        }
    }

    /// Override the freshness window (default 5 minutes).
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Return a usable credential, exchanging for a new one if needed.
    ///
    /// 1. Empty client id or secret fails with [`Error::MissingCredentials`]
    ///    before any network access.
    /// 2. A cached credential with `now + window < expires_at` is returned
    ///    without touching the transport.
    /// 3. Otherwise a client-credentials exchange replaces the cached
    ///    credential. On failure the previous credential is left as it was.
    pub async fn ensure_token(&self) -> Result<Credential> {
        if !self.identity.is_complete() {
            return Err(Error::MissingCredentials);
        }

        {
            let credential = self.credential.read().await;
            if let Some(cred) = self.fresh(credential.as_ref()) {
                debug!("Token is still valid");
                return Ok(cred.clone());
            }
        }

        self.refresh().await
    }

    /// Snapshot of the cached credential, fresh or not.
    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Replace the cached credential.
    pub async fn set_credential(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }

    /// Drop the cached credential so the next call exchanges again.
    pub async fn invalidate(&self) {
        info!("Cached token invalidated");
        *self.credential.write().await = None;
    }

    fn fresh<'a>(&self, credential: Option<&'a Credential>) -> Option<&'a Credential> {
        credential.filter(|c| c.is_fresh_at(Utc::now(), self.freshness_window))
    }

    async fn refresh(&self) -> Result<Credential> {
        let mut credential = self.credential.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(cred) = self.fresh(credential.as_ref()) {
            debug!("Token refreshed by a concurrent caller");
            return Ok(cred.clone());
        }

        let fresh = super::exchange::client_credentials(self.transport.as_ref(), &self.identity).await?;
        *credential = Some(fresh.clone());

        info!(expires_at = %fresh.expires_at, "Token acquired");
        Ok(fresh)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("identity", &self.identity)
            .field("transport", &self.transport.name())
            .field("freshness_window", &self.freshness_window)
            .finish()
    }
}
