//! Authentication: client-credentials exchange and token caching.

pub mod exchange;
pub mod manager;

pub use crate::models::auth::{ClientIdentity, Credential};
pub use manager::TokenManager;
