//! Application configuration loaded from environment variables.
//!
//! # Server
//!
//! - `HOST` (default `0.0.0.0`), `PORT` (default `3000`)
//! - `MAX_REQUEST_BODY_SIZE`: bytes buffered for the body-hash scheme (default 64 KiB)
//!
//! # Authentication
//!
//! - `AUTH_TTL_MS`: replay window in milliseconds; `0` selects the 800ms default
//! - `AUTH_USERS`: comma-separated `login:secret` pairs for the hash schemes
//! - `AUTH_API_KEYS`: comma-separated `key:identity` pairs for the API-key scheme
//!
//! # Observability
//!
//! - `RUST_LOG` (default `info`)
//! - `METRICS_PORT`: Prometheus listener port (default 9090, `0` disables)

use std::env;
use std::fmt;

use crate::error::{AppError, AppResult};

/// Application configuration loaded from environment variables.
///
/// `Debug` prints only counts for users and API keys.
#[derive(Clone)]
pub struct Config {
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Maximum request body size in bytes (default: 64 KiB)
    pub max_request_body_size: usize,

    /// Replay window in milliseconds (0 = gate default of 800ms)
    pub auth_ttl_millis: i64,

    /// `(login, secret)` pairs resolvable by the hash-bearing schemes
    pub users: Vec<(String, String)>,

    /// `(key, identity)` pairs resolvable by the API-key scheme
    pub api_keys: Vec<(String, String)>,

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
    /// Returns `AppError::ConfigError` if a value cannot be parsed or fails
    /// validation.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 64 * 1024)?,

            auth_ttl_millis: Self::parse_env("AUTH_TTL_MS", 0)?,
            users: Self::parse_pairs("AUTH_USERS")?,
            api_keys: Self::parse_pairs("AUTH_API_KEYS")?,

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
        if self.auth_ttl_millis < 0 {
            return Err(AppError::ConfigError(format!(
                "AUTH_TTL_MS must not be negative (got {})",
                self.auth_ttl_millis
            )));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address, or `None` if disabled.
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        self.metrics_enabled()
            .then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
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

    fn parse_pairs(name: &str) -> AppResult<Vec<(String, String)>> {
        env::var(name)
            .map(|raw| split_pairs(name, &raw))
            .unwrap_or_else(|_| Ok(Vec::new()))
    }
}

/// Split `a:b,c:d` into pairs. Only the first `:` separates, so secrets may
/// contain colons.
fn split_pairs(name: &str, raw: &str) -> AppResult<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((left, right)) if !left.is_empty() && !right.is_empty() => {
                Ok((left.to_string(), right.to_string()))
            }
            _ => Err(AppError::ConfigError(format!(
                "Invalid {name}: entries must look like `name:value`"
            ))),
        })
        .collect()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_request_body_size", &self.max_request_body_size)
            .field("auth_ttl_millis", &self.auth_ttl_millis)
            .field("users", &self.users.len())
            .field("api_keys", &self.api_keys.len())
            .field("log_level", &self.log_level)
            .field("metrics_port", &self.metrics_port)
            .finish()
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_request_body_size: 64 * 1024,
            auth_ttl_millis: 0,
            users: Vec::new(),
            api_keys: Vec::new(),
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}
