//! Error types for plantbook-sdk.

use thiserror::Error;

use crate::models::instance::ValidationErrors;
use crate::transport::TransportError;

/// The main error type for plantbook-sdk.
///
/// Token-layer failures always surface here. Transport failures that happen
/// while an operation sends its own request are reported through
/// [`crate::api::Outcome::Unavailable`] instead.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ───────────────────────────────────────────────────────
    /// `client_id` or `client_secret` is empty. Raised before any network access.
    #[error("Missing client id or secret")]
    MissingCredentials,

    /// The token endpoint answered without an access token.
    #[error("Permission denied - wrong client id or secret")]
    PermissionDenied,

    /// The token endpoint answered with an access token but an unusable body.
    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    // ── API ──────────────────────────────────────────────────────────────────
    /// The API rejected a registration payload.
    #[error("API returned {0}")]
    Validation(ValidationErrors),

    /// The API returned a non-success status the operation does not swallow.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    // ── Infrastructure ───────────────────────────────────────────────────────
    /// Transport-level failure that is propagated rather than swallowed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if this error indicates the client identity must be fixed.
    #[must_use]
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            Error::MissingCredentials
                | Error::PermissionDenied
                | Error::Api { status: 401, .. }
                | Error::Api { status: 403, .. }
        )
    }

    /// Server-side validation errors, if this is a registration rejection.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Convenience type alias.
pub type Result<T> = std::result::Result<T, Error>;
