//! Configuration constants and file/env loading.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::ClientIdentity;
use crate::error::{Error, Result};

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://open.plantbook.io/api/v1";

/// A cached token is reused only while it outlives this window.
pub const TOKEN_FRESHNESS_WINDOW: Duration = Duration::from_secs(300); // 5 minutes

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("plantbook-sdk/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Environment override tracking
// ---------------------------------------------------------------------------

/// Tracks which configuration settings are overridden by environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    overrides: HashMap<String, String>,
}

impl EnvOverrides {
    /// Check whether a setting key (e.g. "client_id") is overridden by an env var.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.overrides.contains_key(key)
    }

    /// Get the env var name that overrides the given setting key.
    pub fn env_var_for(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).map(String::as_str)
    }

    fn record(&mut self, key: &str, env_var: &str) {
        self.overrides.insert(key.to_string(), env_var.to_string());
    }
}

// ---------------------------------------------------------------------------
// Main configuration
// ---------------------------------------------------------------------------

/// Client configuration, usually read from `plantbook.toml`.
///
/// ```toml
/// client_id = "..."
/// secret = "..."
/// # base_url = "http://localhost:8000/api/v1"
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// OAuth client ID from the Plantbook API key page.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret from the Plantbook API key page.
    #[serde(default)]
    pub secret: String,
    /// API base URL, overridable for testing.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Env var overrides are not serialized to TOML.
    #[serde(skip)]
    pub env_overrides: EnvOverrides,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            secret: String::new(),
            base_url: default_base_url(),
            logging: LoggingConfig::default(),
            env_overrides: EnvOverrides::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("logging", &self.logging)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file, then apply `PLANTBOOK_*`
    /// environment overrides. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text without env overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Build the client identity described by this configuration.
    pub fn identity(&self) -> ClientIdentity {
        ClientIdentity::new(&self.client_id, &self.secret).with_base_url(&self.base_url)
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        let mut ov = EnvOverrides::default();

        macro_rules! env_str {
            ($key:expr, $env:expr, $field:expr) => {
                if let Ok(val) = std::env::var($env) {
                    $field = val;
                    ov.record($key, $env);
                }
            };
        }
        macro_rules! env_bool {
            ($key:expr, $env:expr, $field:expr) => {
                if let Ok(val) = std::env::var($env) {
                    $field = matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
                    ov.record($key, $env);
                }
            };
        }

        env_str!("client_id", "PLANTBOOK_CLIENT_ID", self.client_id);
        env_str!("secret", "PLANTBOOK_SECRET", self.secret);
        env_str!("base_url", "PLANTBOOK_BASE_URL", self.base_url);
        env_str!("logging.level", "PLANTBOOK_LOG_LEVEL", self.logging.level);
        env_bool!("logging.json", "PLANTBOOK_LOG_JSON", self.logging.json);

        self.env_overrides = ov;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
