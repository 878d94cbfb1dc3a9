//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible defaults
//! for development. In production, configure via environment variables or a `.env` file.
//!
//! # Upstream Configuration
//!
//! - `RAWG_API_KEY`: Provider credential. Not required at startup; every fetch
//!   fails with `MissingCredential` until it is set.
//! - `RAWG_BASE_URL`: Provider base URL (default: `https://api.rawg.io/api`)
//! - `RAWG_STORE_FILTER`: Store ids applied to collection queries (empty = no filter)
//!
//! # Request Policies
//!
//! - `MAX_REQUEST_BODY_SIZE`: Body cap in bytes (default: 10 MiB)
//! - `MAX_QUERY_LENGTH`: Raw query string limit (default: 1024)
//! - `RATE_LIMIT_WINDOW_MS`: One request per window per client (default: 1000, 0 = disabled)
//! - `RATE_LIMIT_IDLE_SECS`: Idle client entries are purged after this (default: 60)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Default RAWG API base URL.
pub const DEFAULT_RAWG_BASE_URL: &str = "https://api.rawg.io/api";

/// Store ids for Steam, Xbox Store, PlayStation Store, GOG, Nintendo and Epic Games.
pub const DEFAULT_STORE_FILTER: &str = "1,2,3,5,6,11";

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8080)
    pub port: u16,

    /// Deadline for a single inbound request (default: 15 seconds)
    pub request_timeout: Duration,

    /// How long in-flight requests may run after a shutdown signal (default: 5 seconds)
    pub shutdown_grace: Duration,

    // =========================================================================
    // Upstream Configuration
    // =========================================================================
    /// RAWG API key. Checked on every fetch, not at startup.
    pub rawg_api_key: Option<String>,

    /// RAWG base URL, without trailing slash
    pub rawg_base_url: String,

    /// Number of results requested per upstream page
    pub page_size: u32,

    /// Comma-separated store ids for collection queries (empty = no filter)
    pub store_filter: String,

    /// Total timeout for one upstream call (default: 10 seconds)
    pub upstream_timeout: Duration,

    /// Length of the `/games/upcoming` release window in days
    pub upcoming_window_days: u32,

    // =========================================================================
    // Request Policy Configuration
    // =========================================================================
    /// Maximum request body size in bytes (default: 10MB)
    pub max_request_body_size: usize,

    /// Maximum raw query string length (default: 1024)
    pub max_query_length: usize,

    /// Minimum spacing between two requests from one client (0 = disabled)
    pub rate_limit_window: Duration,

    /// Client entries idle for longer than this are purged (default: 60 seconds)
    pub rate_limit_idle_ttl: Duration,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any value fails to parse or
    /// validation rejects it.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 8080)?,
            request_timeout: Duration::from_secs(Self::parse_env("REQUEST_TIMEOUT_SECS", 15)?),
            shutdown_grace: Duration::from_secs(Self::parse_env("SHUTDOWN_GRACE_SECS", 5)?),

            // Upstream
            rawg_api_key: env::var("RAWG_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            rawg_base_url: env::var("RAWG_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RAWG_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            page_size: Self::parse_env("RAWG_PAGE_SIZE", 20)?,
            store_filter: env::var("RAWG_STORE_FILTER")
                .unwrap_or_else(|_| DEFAULT_STORE_FILTER.to_string())
                .trim()
                .to_string(),
            upstream_timeout: Duration::from_secs(Self::parse_env("UPSTREAM_TIMEOUT_SECS", 10)?),
            upcoming_window_days: Self::parse_env("UPCOMING_WINDOW_DAYS", 365)?,

            // Request policies
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 10 * 1024 * 1024)?, // 10MB
            max_query_length: Self::parse_env("MAX_QUERY_LENGTH", 1024)?,
            rate_limit_window: Duration::from_millis(Self::parse_env("RATE_LIMIT_WINDOW_MS", 1000)?),
            rate_limit_idle_ttl: Duration::from_secs(Self::parse_env("RATE_LIMIT_IDLE_SECS", 60)?),

            // Observability
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.max_query_length == 0 {
            return Err(AppError::ConfigError(
                "MAX_QUERY_LENGTH must be greater than 0".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(AppError::ConfigError(
                "RAWG_PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.upstream_timeout.is_zero() {
            return Err(AppError::ConfigError(
                "UPSTREAM_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(AppError::ConfigError(
                "REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout <= self.upstream_timeout {
            return Err(AppError::ConfigError(format!(
                "REQUEST_TIMEOUT_SECS ({:?}) must exceed UPSTREAM_TIMEOUT_SECS ({:?})",
                self.request_timeout, self.upstream_timeout
            )));
        }

        if self.rate_limiting_enabled() && self.rate_limit_idle_ttl < self.rate_limit_window {
            return Err(AppError::ConfigError(format!(
                "RATE_LIMIT_IDLE_SECS ({:?}) must be >= RATE_LIMIT_WINDOW_MS ({:?})",
                self.rate_limit_idle_ttl, self.rate_limit_window
            )));
        }

        if !self.rawg_base_url.starts_with("http://") && !self.rawg_base_url.starts_with("https://")
        {
            return Err(AppError::ConfigError(format!(
                "RAWG_BASE_URL must be an http(s) URL, got '{}'",
                self.rawg_base_url
            )));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if per-client rate limiting is enabled.
    pub fn rate_limiting_enabled(&self) -> bool {
        !self.rate_limit_window.is_zero()
    }

    /// Check if the upstream credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.rawg_api_key.is_some()
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_enabled()
            .then(|| SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(15),
            shutdown_grace: Duration::from_secs(5),
            // Upstream
            rawg_api_key: None,
            rawg_base_url: DEFAULT_RAWG_BASE_URL.to_string(),
            page_size: 20,
            store_filter: DEFAULT_STORE_FILTER.to_string(),
            upstream_timeout: Duration::from_secs(10),
            upcoming_window_days: 365,
            // Request policies
            max_request_body_size: 10 * 1024 * 1024, // 10MB
            max_query_length: 1024,
            rate_limit_window: Duration::from_secs(1),
            rate_limit_idle_ttl: Duration::from_secs(60),
            // Observability
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.max_request_body_size, 10 * 1024 * 1024);
        assert_eq!(config.max_query_length, 1024);
        assert_eq!(config.rate_limit_window, Duration::from_secs(1));
        assert_eq!(config.rate_limit_idle_ttl, Duration::from_secs(60));
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
        assert!(config.rawg_api_key.is_none());
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_rate_limiting_enabled() {
        assert!(Config::default().rate_limiting_enabled());

        let config = Config {
            rate_limit_window: Duration::ZERO,
            ..Config::default()
        };
        assert!(!config.rate_limiting_enabled());
    }

    #[test]
    fn test_metrics_addr_disabled() {
        let config = Config {
            metrics_port: 0,
            ..Config::default()
        };
        assert!(config.metrics_addr().is_none());
        assert_eq!(Config::default().metrics_addr().unwrap().port(), 9090);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_body_size() {
        let config = Config {
            max_request_body_size: 0,
            ..Config::default()
        };

        let result = config.validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("MAX_REQUEST_BODY_SIZE")
        );
    }

    #[test]
    fn test_validate_idle_ttl_shorter_than_window() {
        let config = Config {
            rate_limit_window: Duration::from_secs(120),
            rate_limit_idle_ttl: Duration::from_secs(60),
            ..Config::default()
        };

        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("RATE_LIMIT_IDLE_SECS")
        );
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let config = Config {
            rawg_base_url: "ftp://api.rawg.io".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_request_timeout() {
        let config = Config {
            request_timeout: Duration::ZERO,
            ..Config::default()
        };

        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("REQUEST_TIMEOUT_SECS must be greater than 0")
        );
    }

    #[test]
    fn test_validate_request_timeout_must_exceed_upstream() {
        for request_timeout in [Duration::from_secs(5), Duration::from_secs(10)] {
            let config = Config {
                request_timeout,
                upstream_timeout: Duration::from_secs(10),
                ..Config::default()
            };

            assert!(
                config
                    .validate()
                    .unwrap_err()
                    .to_string()
                    .contains("must exceed UPSTREAM_TIMEOUT_SECS"),
                "{request_timeout:?}"
            );
        }

        let config = Config {
            request_timeout: Duration::from_secs(11),
            upstream_timeout: Duration::from_secs(10),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
