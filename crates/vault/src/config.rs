//! Configuration loading and validation for the vault service.
//!
//! Values are read from environment variables at startup, after an optional
//! `.env` file has been loaded into the environment. The process exits with a
//! clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;

use crate::crypto::ServerSecret;

/// Which [`DocumentStore`](crate::store::DocumentStore) implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongodb,
    Memory,
}

/// Validated vault service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server secret mixed into every per-document key. **Required.**
    pub secret_key: ServerSecret,

    /// The single browser origin allowed by CORS. **Required.**
    pub client_url: String,

    /// MongoDB connection string. Required when `store_backend` is `mongodb`.
    #[serde(default)]
    pub db_url: Option<String>,

    /// Database used when `db_url` does not name one.
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Storage backend: `mongodb` or `memory`.
    #[serde(default)]
    pub store_backend: StoreBackend,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_db_name() -> String {
    "test".into()
}
fn default_port() -> u16 {
    3000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The CORS origin as an HTTP header value.
    ///
    /// # Errors
    ///
    /// Returns an error if `CLIENT_URL` contains characters not allowed in a header.
    pub fn allowed_origin(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(self.client_url.trim())
            .context("CLIENT_URL is not a valid origin header value")
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.secret_key.is_blank() {
            anyhow::bail!("SECRET_KEY is required and must not be empty");
        }
        ensure_non_empty(&self.client_url, "CLIENT_URL")?;
        self.allowed_origin()?;

        if self.store_backend == StoreBackend::Mongodb {
            ensure_non_empty(self.db_url.as_deref().unwrap_or_default(), "DB_URL")?;
            ensure_non_empty(&self.db_name, "DB_NAME")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
