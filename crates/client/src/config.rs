//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TENANTDESK_API_URL` - Base URL of the administration API (default: `http://localhost:8000`)
//! - `TENANTDESK_SESSION_FILE` - Persisted session path
//!   (default: `$HOME/.tenantdesk/auth-storage.json`, else `./auth-storage.json`)
//! - `TENANTDESK_CACHE_TTL_SECS` - Query cache time-to-live (default: 300)
//! - `TENANTDESK_CACHE_CAPACITY` - Maximum cached queries (default: 1000)
//! - `TENANTDESK_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: none, transport default)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;
const SESSION_FILE_NAME: &str = "auth-storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tenantdesk client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every resource path is appended to
    pub api_url: Url,
    /// Where the session document is persisted
    pub session_file: PathBuf,
    /// How long a fetched query stays cached
    pub cache_ttl: Duration,
    /// Maximum number of cached queries
    pub cache_capacity: u64,
    /// Optional per-request timeout; `None` leaves it to the transport
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
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

        let api_url = parse_api_url(
            "TENANTDESK_API_URL",
            &get_env_or_default("TENANTDESK_API_URL", DEFAULT_API_URL),
        )?;
        let session_file = get_optional_env("TENANTDESK_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);
        let cache_ttl = Duration::from_secs(get_env_u64(
            "TENANTDESK_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);
        let cache_capacity = get_env_u64("TENANTDESK_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        let request_timeout = get_optional_env("TENANTDESK_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_u64("TENANTDESK_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            api_url,
            session_file,
            cache_ttl,
            cache_capacity,
            request_timeout,
        })
    }

    /// Configuration pointing at `api_url` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute
    /// http(s) URL.
    pub fn with_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("api_url", api_url)?,
            session_file: default_session_file(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            request_timeout: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get an unsigned integer environment variable with a default value.
fn get_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| parse_u64(key, &raw))
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and validate the API base URL.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}' (expected http or https)", url.scheme()),
        ));
    }

    Ok(url)
}

fn default_session_file() -> PathBuf {
    get_optional_env("HOME").map_or_else(
        || PathBuf::from(SESSION_FILE_NAME),
        |home| PathBuf::from(home).join(".tenantdesk").join(SESSION_FILE_NAME),
    )
}
