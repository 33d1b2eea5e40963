//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `VOLTMART_API_BASE_URL` - Remote API origin (default: `https://ecommerce-server-v2.onrender.com`)
//! - `VOLTMART_SESSION_FILE` - Path of the persistent session store (default: `.voltmart/session.json`)
//! - `VOLTMART_PAYMENT_KEY_ID` - Payment gateway public key id
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default remote API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://ecommerce-server-v2.onrender.com";

/// Default location of the persistent session store.
pub const DEFAULT_SESSION_FILE: &str = ".voltmart/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the payment key.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Remote API origin; endpoint paths are appended under `/api`.
    pub api_base_url: Url,
    /// Where the longer-lived session store lives on disk.
    pub session_file: PathBuf,
    /// Payment gateway public key id, handed to the gateway on checkout.
    pub payment_key_id: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("session_file", &self.session_file)
            .field(
                "payment_key_id",
                &self.payment_key_id.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration pointing at `api_base_url` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not an http(s) URL.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| (key == "VOLTMART_API_BASE_URL").then(|| api_base_url.to_owned()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_base = optional("VOLTMART_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&raw_base)?;

        let session_file = optional("VOLTMART_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        Ok(Self {
            api_base_url,
            session_file,
            payment_key_id: optional("VOLTMART_PAYMENT_KEY_ID").map(SecretString::from),
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and sanity-check the API origin.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("VOLTMART_API_BASE_URL".to_string(), reason);

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
