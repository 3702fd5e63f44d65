//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROBE_API_URL` - Backend base URL (default: `http://localhost:3000`)
//! - `ROBE_DATA_DIR` - Directory holding local storage (default: `.robe`)
//! - `ROBE_SHIPPING_FEE` - Flat shipping fee in Taka (default: 0)
//! - `ROBE_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `ROBE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use robe_core::Price;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_DATA_DIR: &str = ".robe";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL (products, coupons, orders endpoints live under it)
    pub api_url: Url,
    /// Directory for the local storage file
    pub data_dir: PathBuf,
    /// Flat shipping fee added after the discount
    pub shipping_fee: Price,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
    /// Timeout applied to every backend request
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(&lookup);

        let api_url = parse_base_url("ROBE_API_URL", &env.or_default("ROBE_API_URL", DEFAULT_API_URL))?;
        let data_dir = PathBuf::from(env.or_default("ROBE_DATA_DIR", DEFAULT_DATA_DIR));
        let shipping_fee = env
            .or_default("ROBE_SHIPPING_FEE", "0")
            .parse::<Price>()
            .map_err(|e| ConfigError::InvalidEnvVar("ROBE_SHIPPING_FEE".to_string(), e.to_string()))?;
        let cache_ttl = Duration::from_secs(env.secs("ROBE_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?);
        let http_timeout =
            Duration::from_secs(env.secs("ROBE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?);

        Ok(Self {
            api_url,
            data_dir,
            shipping_fee,
            cache_ttl,
            http_timeout,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Path of the local storage file inside the data directory.
    #[must_use]
    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir.join("local_storage.json")
    }
}

struct Lookup<'a, F>(&'a F);

impl<F> Lookup<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty value of `key`, if set.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn secs(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |v| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse a base URL, making sure it ends with `/` so relative joins keep
/// any path prefix (e.g. `https://api.example.com/v1/`).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unparseable or non-HTTP URLs.
pub fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
