//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ESHOP_API_URL` - Base URL of the cart backend (default: `http://localhost:5000/api`)
//! - `ESHOP_API_TIMEOUT_SECS` - Network timeout per request (default: 10)
//! - `ESHOP_API_TOKEN` - Bearer token attached to every request
//! - `ESHOP_USER_ID` - Session identity used to scope bulk cart clears
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use eshop_core::UserId;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const MAX_TIMEOUT_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Cart backend API configuration
    pub api: CartApiConfig,
    /// Session identity, if signed in
    pub user_id: Option<UserId>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Cart backend API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct CartApiConfig {
    /// Base URL every cart path is appended to
    pub base_url: Url,
    /// Per-request network timeout
    pub timeout: Duration,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
}

impl std::fmt::Debug for CartApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CartApiConfig {
    /// Configuration pointing at `base_url` with the default timeout and no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ESHOP_API_URL", base_url)?,
            timeout: Duration::from_secs(10),
            api_token: None,
        })
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_env_or_default(&lookup, "ESHOP_API_URL", DEFAULT_API_URL);
        let base_url = parse_base_url("ESHOP_API_URL", &base_url)?;

        let timeout = get_env_or_default(&lookup, "ESHOP_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let timeout = parse_timeout("ESHOP_API_TIMEOUT_SECS", &timeout)?;

        let api_token = get_optional_env(&lookup, "ESHOP_API_TOKEN").map(SecretString::from);
        let user_id = get_optional_env(&lookup, "ESHOP_USER_ID").map(UserId::new);

        Ok(Self {
            api: CartApiConfig {
                base_url,
                timeout,
                api_token,
            },
            user_id,
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get_optional_env(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional variable. Empty values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_required_env(lookup, key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate the backend base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute base URL".to_string(),
        ));
    }
    Ok(url)
}

/// Parse a timeout in whole seconds, bounded to `1..=MAX_TIMEOUT_SECS`.
fn parse_timeout(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds (got {secs})"),
        ));
    }
    Ok(Duration::from_secs(secs))
}
