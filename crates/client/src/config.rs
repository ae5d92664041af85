//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STORE_API_BASE_URL` - REST API root (default: `http://localhost:8080/api`)
//! - `STORE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `STORE_CATALOG_CACHE_TTL_SECS` - Product catalog cache lifetime (default: 300)
//! - `STORE_EMAIL` / `STORE_PASSWORD` - Account used by `fs-cli` to log in
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API root; always ends with `/` so relative paths join under it.
    pub base_url: Url,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// How long the product catalog stays cached.
    pub catalog_ttl: Duration,
    /// Login credentials, when provided.
    pub credentials: Option<Credentials>,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

/// Account credentials for the auth service.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("STORE_API_BASE_URL", base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            credentials: None,
            sentry_dsn: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if only
    /// one of `STORE_EMAIL` / `STORE_PASSWORD` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("STORE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = parse_base_url("STORE_API_BASE_URL", &base_url)?;

        let request_timeout = parse_secs(
            "STORE_REQUEST_TIMEOUT_SECS",
            lookup("STORE_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let catalog_ttl = parse_secs(
            "STORE_CATALOG_CACHE_TTL_SECS",
            lookup("STORE_CATALOG_CACHE_TTL_SECS"),
            DEFAULT_CATALOG_TTL_SECS,
        )?;

        let credentials = match (lookup("STORE_EMAIL"), lookup("STORE_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials {
                email,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("STORE_PASSWORD".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("STORE_EMAIL".to_string())),
        };

        Ok(Self {
            base_url,
            request_timeout,
            catalog_ttl,
            credentials,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API root, appending the trailing slash `Url::join` relies on.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a whole number of seconds, falling back to `default` when unset.
fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    value.map_or(Ok(Duration::from_secs(default)), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert!(config.credentials.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("STORE_API_BASE_URL", "https://shop.example.ro/api/"),
            ("STORE_REQUEST_TIMEOUT_SECS", "5"),
            ("STORE_EMAIL", "admin@example.ro"),
            ("STORE_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://shop.example.ro/api/");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.email, "admin@example.ro");
        assert_eq!(credentials.password.expose_secret(), "hunter2");
    }

    #[test]
    fn test_invalid_values() {
        let err = ClientConfig::from_lookup(lookup_from(&[("STORE_API_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STORE_API_BASE_URL"));

        let err = ClientConfig::from_lookup(lookup_from(&[("STORE_REQUEST_TIMEOUT_SECS", "-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let err =
            ClientConfig::from_lookup(lookup_from(&[("STORE_EMAIL", "a@b.ro")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "STORE_PASSWORD"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials {
            email: "a@b.ro".to_string(),
            password: SecretString::from("super-secret".to_string()),
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
