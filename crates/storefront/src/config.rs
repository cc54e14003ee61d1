//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MOTO_API_BASE_URL` - Base URL of the remote store API
//!
//! ## Optional
//! - `MOTO_SESSION_DIR` - Directory holding the session file (default: `.moto-session`)
//! - `MOTO_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_DIR: &str = ".moto-session";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote store API settings
    pub api: ApiConfig,
    /// Where the file-backed session lives
    pub session_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Remote store API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is resolved against
    pub base_url: Url,
    /// How long catalog listings stay cached
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with default cache settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("MOTO_API_BASE_URL", base_url)?,
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        })
    }
}

impl ClientConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let base_url = vars.required("MOTO_API_BASE_URL")?;
        let base_url = parse_base_url("MOTO_API_BASE_URL", &base_url)?;

        let ttl_secs = vars
            .or_default(
                "MOTO_CATALOG_CACHE_TTL_SECS",
                &DEFAULT_CATALOG_CACHE_TTL_SECS.to_string(),
            )
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MOTO_CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_cache_ttl: Duration::from_secs(ttl_secs),
            },
            session_dir: PathBuf::from(vars.or_default("MOTO_SESSION_DIR", DEFAULT_SESSION_DIR)),
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse the API base URL, forcing a trailing slash so relative endpoint
/// paths join underneath it instead of replacing its last segment.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "MOTO_API_BASE_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("MOTO_API_BASE_URL", "https://api.motoparts.test")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://api.motoparts.test/");
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.session_dir, PathBuf::from(".moto-session"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = load(&[("MOTO_API_BASE_URL", "https://host.test/api/v1")]).unwrap();
        assert_eq!(
            config.api.base_url.join("orders").unwrap().as_str(),
            "https://host.test/api/v1/orders"
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            load(&[("MOTO_API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("MOTO_API_BASE_URL", "ftp://host.test")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[
                ("MOTO_API_BASE_URL", "http://host.test"),
                ("MOTO_CATALOG_CACHE_TTL_SECS", "soon"),
            ]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_blank_optional_counts_as_unset() {
        let config = load(&[
            ("MOTO_API_BASE_URL", "http://host.test"),
            ("SENTRY_DSN", "  "),
            ("MOTO_SESSION_DIR", "/tmp/moto"),
        ])
        .unwrap();
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.session_dir, PathBuf::from("/tmp/moto"));
    }
}
