//! Main client entry point.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::api::{self, ApiDispatcher, CallOptions, Outcome};
use crate::auth::{ClientIdentity, Credential, TokenManager};
use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::Result;
use crate::models::instance::{InstanceRegistration, RegisteredInstance};
use crate::models::plant::{PlantDetail, SearchResponse};
use crate::transport::http::ReqwestTransport;
use crate::transport::Transport;

/// Open Plantbook API client.
///
/// Owns one client identity and its cached bearer token. Every operation
/// obtains a token first, reusing the cached one while it stays fresh.
///
/// # Examples
///
/// ```rust,no_run
/// use plantbook_sdk::PlantbookClient;
///
/// # async fn example() -> plantbook_sdk::Result<()> {
/// let client = PlantbookClient::builder()
///     .client_id("my-client-id")
///     .secret("my-secret")
///     .build()?;
///
/// if let Some(found) = client.search("monstera").await?.ok() {
///     for plant in &found.results {
///         println!("{}", plant.pid);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct PlantbookClient {
    auth: Arc<TokenManager>,
    api: ApiDispatcher,
}

impl PlantbookClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> PlantbookClientBuilder {
        PlantbookClientBuilder::new()
    }

    /// Search plants by alias.
    pub async fn search(&self, alias: &str) -> Result<Outcome<SearchResponse>> {
        self.search_with(alias, &CallOptions::default()).await
    }

    pub async fn search_with(&self, alias: &str, opts: &CallOptions) -> Result<Outcome<SearchResponse>> {
        api::search::search(&self.api, alias, opts).await
    }

    /// Fetch plant details, optionally localized to `lang`.
    pub async fn plant_detail(&self, pid: &str, lang: Option<&str>) -> Result<Outcome<PlantDetail>> {
        self.plant_detail_with(pid, lang, &CallOptions::default()).await
    }

    pub async fn plant_detail_with(
        &self,
        pid: &str,
        lang: Option<&str>,
        opts: &CallOptions,
    ) -> Result<Outcome<PlantDetail>> {
        api::detail::plant_detail(&self.api, pid, lang, opts).await
    }

    /// Register sensor-to-plant bindings as plant instances.
    pub async fn register_instances(
        &self,
        registration: &InstanceRegistration,
    ) -> Result<Outcome<Vec<RegisteredInstance>>> {
        self.register_instances_with(registration, &CallOptions::default())
            .await
    }

    pub async fn register_instances_with(
        &self,
        registration: &InstanceRegistration,
        opts: &CallOptions,
    ) -> Result<Outcome<Vec<RegisteredInstance>>> {
        api::register::register_instances(&self.api, registration, opts).await
    }

    /// Upload a time-series document such as a [`JtsDocument`](crate::timeseries::JtsDocument).
    pub async fn upload<D>(&self, document: &D, dry_run: bool) -> Result<Outcome<bool>>
    where
        D: Serialize + ?Sized,
    {
        self.upload_with(document, dry_run, &CallOptions::default())
            .await
    }

    pub async fn upload_with<D>(
        &self,
        document: &D,
        dry_run: bool,
        opts: &CallOptions,
    ) -> Result<Outcome<bool>>
    where
        D: Serialize + ?Sized,
    {
        api::upload::upload(&self.api, document, dry_run, opts).await
    }

    /// Obtain a usable token without calling an endpoint.
    pub async fn ensure_token(&self) -> Result<Credential> {
        self.auth.ensure_token().await
    }

    /// Get a reference to the token manager.
    pub fn token_manager(&self) -> &TokenManager {
        &self.auth
    }

    pub fn identity(&self) -> &ClientIdentity {
        self.auth.identity()
    }
}

impl std::fmt::Debug for PlantbookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantbookClient")
            .field("api", &self.api)
            .finish()
    }
}

/// Builder for [`PlantbookClient`].
pub struct PlantbookClientBuilder {
    client_id: String,
    secret: String,
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    reqwest_client: Option<reqwest::Client>,
    freshness_window: Option<Duration>,
}

impl PlantbookClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            client_id: String::new(),
            secret: String::new(),
            base_url: None,
            transport: None,
            reqwest_client: None,
            freshness_window: None,
        }
    }

    /// Seed client id, secret and base URL from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .client_id(&config.client_id)
            .secret(&config.secret)
            .base_url(&config.base_url)
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Override the API base URL (default [`DEFAULT_BASE_URL`]).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use a custom transport for both token exchange and API calls.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set a custom reqwest client. Ignored when a transport is set.
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.reqwest_client = Some(client);
        self
    }

    pub fn freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = Some(window);
        self
    }

    /// Build the client.
    ///
    /// Credentials are not checked here; an empty id or secret surfaces as
    /// [`Error::MissingCredentials`](crate::Error::MissingCredentials) on the
    /// first operation.
    pub fn build(self) -> Result<PlantbookClient> {
        let transport: Arc<dyn Transport> = match (self.transport, self.reqwest_client) {
            (Some(transport), _) => transport,
            (None, Some(client)) => Arc::new(ReqwestTransport::with_client(client)),
            (None, None) => Arc::new(ReqwestTransport::new()?),
        };

        let identity = ClientIdentity::new(self.client_id, self.secret)
            .with_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));

        let mut manager = TokenManager::new(identity, Arc::clone(&transport));
        if let Some(window) = self.freshness_window {
            manager = manager.with_freshness_window(window);
        }
        let auth = Arc::new(manager);
        let api = ApiDispatcher::new(Arc::clone(&auth), transport);

        info!(base_url = auth.identity().base_url(), "PlantbookClient initialized");
        Ok(PlantbookClient { auth, api })
    }
}

impl Default for PlantbookClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
