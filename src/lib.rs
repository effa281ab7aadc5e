//! # plantbook-sdk
//!
//! Async client library for the Open Plantbook API.
//!
//! Handles the OAuth2 client-credentials exchange and token caching, and
//! exposes plant search, plant detail, plant instance registration and
//! sensor data upload.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plantbook_sdk::{InstanceRegistration, PlantbookClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = PlantbookClient::builder()
//!         .client_id("my-client-id")
//!         .secret("my-secret")
//!         .build()?;
//!
//!     // Look up a plant; `None` means the request failed and was logged
//!     if let Some(detail) = client.plant_detail("abelia chinensis", Some("de")).await?.ok() {
//!         println!("{:?}", detail.temperature());
//!     }
//!
//!     // Bind a sensor to that plant
//!     let registration = InstanceRegistration::new()
//!         .sensor("Sensor-1", "abelia chinensis")
//!         .country("AU");
//!     let created = client.register_instances(&registration).await?;
//!     println!("{:?}", created.ok());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod timeseries;
pub mod transport;

// Re-exports for ergonomic usage
pub use api::{CallOptions, Outcome};
pub use auth::{ClientIdentity, Credential, TokenManager};
pub use client::{PlantbookClient, PlantbookClientBuilder};
pub use config::Config;
pub use error::{Error, Result};
pub use models::instance::{
    FieldError, InstanceRegistration, Location, RegisteredInstance, SensorBinding, ValidationErrors,
};
pub use models::plant::{PlantDetail, PlantSummary, Range, SearchResponse};
pub use timeseries::{JtsDocument, TimeSeries, TsRecord};
pub use transport::{
    HttpRequest, HttpResponse, Method, QueryParams, RequestBody, RequestOptions, ReqwestTransport,
    Transport, TransportError,
};
