//! Web configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `DOGFINDER_HOST` - Bind address (default: 127.0.0.1)
//! - `DOGFINDER_PORT` - Listen port (default: 3000)
//! - `DOGFINDER_BASE_URL` - Public URL; `https` enables secure cookies (default: <http://localhost:3000>)
//! - `FETCH_API_BASE_URL` - Remote dog API root (default: <https://frontend-take-home-service.fetch.com>)
//! - `FETCH_IMAGE_ORIGIN` - Origin serving dog photos (default: <https://frontend-take-home.fetch.com>)
//! - `DOGFINDER_FAVORITES_CAP` - Favorites cap, or `none` for no cap (default: 100)
//! - `DOGFINDER_REDIRECT_ON_UNAUTHORIZED` - Send visitors to login on a remote 401 (default: true)
//! - `DOGFINDER_BREEDS_TTL_SECS` - Breed list cache lifetime (default: 600)
//! - `DOGFINDER_PAGE_TTL_SECS` - Search page cache lifetime (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use dogfinder_core::FavoritesPolicy;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://frontend-take-home-service.fetch.com";
const DEFAULT_IMAGE_ORIGIN: &str = "https://frontend-take-home.fetch.com";
const DEFAULT_BREEDS_TTL_SECS: u64 = 600;
const DEFAULT_PAGE_TTL_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Remote dog API configuration
    pub api: FetchApiConfig,
    /// Favorites cap and unauthorized handling
    pub policy: PolicyConfig,
    /// Remote result cache lifetimes
    pub cache: CacheConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote dog API configuration.
#[derive(Debug, Clone)]
pub struct FetchApiConfig {
    /// API root, e.g. `https://frontend-take-home-service.fetch.com`
    pub base_url: String,
    /// Origin dog images are served from, allowed by the CSP
    pub image_origin: String,
}

/// Product policy that is configuration rather than a constant.
#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    pub favorites: FavoritesPolicy,
    /// Whether a remote 401 sends the visitor back to `/login`.
    pub redirect_on_unauthorized: bool,
}

/// Cache lifetimes for remote results.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub breeds_ttl: Duration,
    pub page_ttl: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            api: FetchApiConfig::default(),
            policy: PolicyConfig::default(),
            cache: CacheConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl Default for FetchApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            image_origin: DEFAULT_IMAGE_ORIGIN.to_string(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            favorites: FavoritesPolicy::default(),
            redirect_on_unauthorized: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            breeds_ttl: Duration::from_secs(DEFAULT_BREEDS_TTL_SECS),
            page_ttl: Duration::from_secs(DEFAULT_PAGE_TTL_SECS),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("DOGFINDER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DOGFINDER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DOGFINDER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DOGFINDER_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("DOGFINDER_BASE_URL", "http://localhost:3000");

        Ok(Self {
            host,
            port,
            base_url,
            api: FetchApiConfig::from_env()?,
            policy: PolicyConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN").map(SecretString::from),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl FetchApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("FETCH_API_BASE_URL", DEFAULT_API_BASE_URL);
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FETCH_API_BASE_URL".to_string(), e.to_string())
        })?;
        Ok(Self {
            base_url,
            image_origin: get_env_or_default("FETCH_IMAGE_ORIGIN", DEFAULT_IMAGE_ORIGIN),
        })
    }
}

impl PolicyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let favorites = parse_favorites_cap(&get_env_or_default("DOGFINDER_FAVORITES_CAP", "100"))
            .map_err(|e| ConfigError::InvalidEnvVar("DOGFINDER_FAVORITES_CAP".to_string(), e))?;
        let redirect_on_unauthorized =
            parse_bool(&get_env_or_default("DOGFINDER_REDIRECT_ON_UNAUTHORIZED", "true")).map_err(
                |e| ConfigError::InvalidEnvVar("DOGFINDER_REDIRECT_ON_UNAUTHORIZED".to_string(), e),
            )?;
        Ok(Self {
            favorites,
            redirect_on_unauthorized,
        })
    }
}

impl CacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            breeds_ttl: get_duration_secs("DOGFINDER_BREEDS_TTL_SECS", DEFAULT_BREEDS_TTL_SECS)?,
            page_ttl: get_duration_secs("DOGFINDER_PAGE_TTL_SECS", DEFAULT_PAGE_TTL_SECS)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_duration_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_env_or_default(key, &default.to_string())
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a favorites cap: a positive count, or `none` for no cap.
fn parse_favorites_cap(value: &str) -> Result<FavoritesPolicy, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(FavoritesPolicy::unbounded());
    }
    match value.parse::<usize>() {
        Ok(0) => Err("cap must be at least 1".to_string()),
        Ok(cap) => Ok(FavoritesPolicy::capped(cap)),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected true or false, got '{other}'")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_favorites_cap() {
        assert_eq!(parse_favorites_cap("100").unwrap(), FavoritesPolicy::capped(100));
        assert_eq!(parse_favorites_cap(" 5 ").unwrap(), FavoritesPolicy::capped(5));
        assert_eq!(parse_favorites_cap("none").unwrap(), FavoritesPolicy::unbounded());
        assert_eq!(parse_favorites_cap("NONE").unwrap(), FavoritesPolicy::unbounded());
    }

    #[test]
    fn test_parse_favorites_cap_rejects_garbage() {
        assert!(parse_favorites_cap("0").is_err());
        assert!(parse_favorites_cap("-1").is_err());
        assert!(parse_favorites_cap("lots").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("On").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.api.base_url,
            "https://frontend-take-home-service.fetch.com"
        );
        assert_eq!(config.policy.favorites, FavoritesPolicy::capped(100));
        assert!(config.policy.redirect_on_unauthorized);
        assert_eq!(config.cache.breeds_ttl, Duration::from_secs(600));
        assert_eq!(config.cache.page_ttl, Duration::from_secs(30));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_socket_addr() {
        let config = WebConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            ..WebConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_sentry_dsn() {
        let config = WebConfig {
            sentry_dsn: Some(SecretString::from("https://key@sentry.example/1")),
            ..WebConfig::default()
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("key@sentry"));
    }
}
