//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_BASE_URL` - Remote REST API base (e.g., `http://localhost:5000/api`)
//!
//! ## Optional
//! - `SHOPFRONT_IMAGE_BASE_URL` - Prefix for site-relative image paths (default: empty)
//! - `SHOPFRONT_HOSTNAME` - Hostname the client runs under (default: localhost)
//! - `SHOPFRONT_STORAGE_PATH` - Local key-value file (default: .shopfront/storage.json)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - HTTP timeout in seconds (default: 15)
//! - `SHOPFRONT_CATALOG_STALE_SECS` - Category cache staleness window (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_HOSTNAME: &str = "localhost";
const DEFAULT_STORAGE_PATH: &str = ".shopfront/storage.json";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CATALOG_STALE_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote REST API base URL
    pub api_base_url: Url,
    /// Prefix for site-relative image references (may be empty)
    pub image_base_url: String,
    /// Hostname used for tenant resolution
    pub hostname: String,
    /// File backing the local key-value store
    pub storage_path: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Maximum age of cached categories and subcategories
    pub catalog_stale_after: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_http_url(
            "SHOPFRONT_API_BASE_URL",
            &get_required_env("SHOPFRONT_API_BASE_URL")?,
        )?;

        let image_base_url = match get_optional_env("SHOPFRONT_IMAGE_BASE_URL") {
            Some(raw) if !raw.trim().is_empty() => {
                parse_http_url("SHOPFRONT_IMAGE_BASE_URL", &raw)?;
                raw.trim().to_string()
            }
            _ => String::new(),
        };

        let hostname = get_env_or_default("SHOPFRONT_HOSTNAME", DEFAULT_HOSTNAME)
            .trim()
            .to_ascii_lowercase();
        let storage_path = PathBuf::from(get_env_or_default(
            "SHOPFRONT_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let request_timeout = Duration::from_secs(get_secs(
            "SHOPFRONT_REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let catalog_stale_after = Duration::from_secs(get_secs(
            "SHOPFRONT_CATALOG_STALE_SECS",
            DEFAULT_CATALOG_STALE_SECS,
        )?);

        Ok(Self {
            api_base_url,
            image_base_url,
            hostname,
            storage_path,
            request_timeout,
            catalog_stale_after,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_base_url` with every optional value at
    /// its default. Used by tests and embedders that configure in code.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            image_base_url: String::new(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_stale_after: Duration::from_secs(DEFAULT_CATALOG_STALE_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Set the hostname used for tenant resolution.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into().trim().to_ascii_lowercase();
        self
    }

    /// Set the image base URL.
    #[must_use]
    pub fn with_image_base_url(mut self, base: impl Into<String>) -> Self {
        self.image_base_url = base.into();
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a whole-second duration variable.
fn get_secs(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse an absolute `http(s)` URL.
fn parse_http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url_accepts_http_and_https() {
        assert!(parse_http_url("X", "http://localhost:5000/api").is_ok());
        assert!(parse_http_url("X", " https://api.acme.test ").is_ok());
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        let err = parse_http_url("X", "ftp://files.acme.test").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_http_url("X", "not a url").is_err());
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = StorefrontConfig::new(Url::parse("http://api.test/api").unwrap());
        assert_eq!(config.hostname, "localhost");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.catalog_stale_after, Duration::from_secs(300));
        assert!(config.image_base_url.is_empty());
    }

    #[test]
    fn test_with_hostname_normalizes() {
        let config = StorefrontConfig::new(Url::parse("http://api.test").unwrap())
            .with_hostname(" Acme.Shop.Test ");
        assert_eq!(config.hostname, "acme.shop.test");
    }
}
