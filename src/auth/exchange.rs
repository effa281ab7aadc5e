//! OAuth2 client-credentials exchange.

use chrono::Utc;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::models::auth::{ClientIdentity, Credential, TokenResponse};
use crate::transport::{HttpRequest, Method, RequestBody, Transport};

/// Build the `{base_url}/token/` URL.
pub fn token_url(identity: &ClientIdentity) -> Result<url::Url> {
    crate::api::endpoint(identity.base_url(), &["token", ""])
}

/// Exchange the client id and secret for a bearer credential.
///
/// POST `{base_url}/token/`
/// Body (form): `grant_type=client_credentials&client_id=...&client_secret=...`
///
/// The body is decoded whatever the HTTP status; a response without an
/// access token means the credentials were rejected.
pub async fn client_credentials(
    transport: &dyn Transport,
    identity: &ClientIdentity,
) -> Result<Credential> {
    let url = token_url(identity)?;
    let mut request = HttpRequest::new(Method::Post, url);
    request.body = RequestBody::Form(vec![
        ("grant_type".to_string(), "client_credentials".to_string()),
        ("client_id".to_string(), identity.client_id().to_string()),
        ("client_secret".to_string(), identity.client_secret().to_string()),
    ]);
    let url = request.url.clone();

    let response = transport.send(request).await.map_err(|e| {
        error!(url = %url, error = %e, "Token exchange failed");
        Error::Transport(e)
    })?;
    let issued_at = Utc::now();

    let body: TokenResponse = response.json().map_err(|e| {
        error!(url = %url, status = response.status, error = %e, "Unreadable token response");
        Error::Transport(e)
    })?;

    let access_token = match body.access_token {
        Some(token) if !token.is_empty() => token,
        _ => {
            error!("Wrong client id or secret");
            return Err(Error::PermissionDenied);
        }
    };
    let expires_in = body
        .expires_in
        .ok_or_else(|| Error::InvalidTokenResponse("missing expires_in".into()))?;

    let credential = Credential::issued(access_token, issued_at, expires_in).ok_or_else(|| {
        error!(expires_in, "Token lifetime out of range");
        Error::InvalidTokenResponse(format!("expires_in out of range: {}", expires_in))
    })?;

    debug!(url = %url, expires_in, "Got token");
    Ok(credential)
}
