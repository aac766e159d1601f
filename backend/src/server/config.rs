//! Environment-driven application configuration.
//!
//! Every value is read once at startup; nothing here is consulted as
//! ambient state afterwards.

use std::env;

use tracing::warn;
use uuid::Uuid;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration failures surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },
}

/// Startup configuration assembled from the environment.
pub struct AppConfig {
    /// PostgreSQL connection string (`DATABASE_URL`).
    pub database_url: String,
    /// HS256 signing key for bearer tokens (`TOKEN_SIGNING_KEY`).
    pub signing_key: Zeroizing<Vec<u8>>,
    /// Gemini API key (`GEMINI_API_KEY`).
    pub gemini_api_key: String,
    /// Model override (`GEMINI_MODEL`); the adapter default applies when
    /// unset.
    pub gemini_model: Option<String>,
    /// Listen address (`BIND_ADDR`), `0.0.0.0:8080` when unset.
    pub bind_addr: String,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or `GEMINI_API_KEY` is absent, or when
    /// `TOKEN_SIGNING_KEY` is absent in a release build. Debug builds
    /// fall back to an ephemeral signing key with a warning so local
    /// runs work without secrets.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| lookup(name).filter(|value| !value.is_empty());
        let require =
            |name: &'static str| get(name).ok_or(ConfigError::MissingVar { name });

        let database_url = require("DATABASE_URL")?;
        let signing_key = match get("TOKEN_SIGNING_KEY") {
            Some(key) => Zeroizing::new(key.into_bytes()),
            None if cfg!(debug_assertions) => {
                warn!("TOKEN_SIGNING_KEY is unset; using an ephemeral key (dev only)");
                Zeroizing::new(Uuid::new_v4().as_bytes().to_vec())
            }
            None => {
                return Err(ConfigError::MissingVar {
                    name: "TOKEN_SIGNING_KEY",
                });
            }
        };
        let gemini_api_key = require("GEMINI_API_KEY")?;
        let gemini_model = get("GEMINI_MODEL");
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());

        Ok(Self {
            database_url,
            signing_key,
            gemini_api_key,
            gemini_model,
            bind_addr,
        })
    }
}
