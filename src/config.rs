//! Gateway configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with defaults suited
//! to local development. In production, configure via environment variables or
//! a `.env` file.
//!
//! # Authorization Exchange
//!
//! - `AUTH_URL`: Token endpoint receiving the authorization-code grant
//! - `CLIENT_ID` / `CLIENT_SECRET`: Client identity sent with every exchange
//! - `REDIRECT_URI` / `SCOPE`: Forwarded verbatim in the form body
//!
//! # Audit Log Collector
//!
//! - `LOG_HOST` / `LOG_PORT`: UDP destination for audit events (port default: 514)
//! - `LOG_PROGRAM`, `LOG_SERVICE`, `LOG_RETENTION`: Labels copied into every event

use std::env;

use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};

/// Default syslog-style port of the audit collector.
pub const DEFAULT_LOG_PORT: u16 = 514;

/// Settings of the gatekeeper itself.
///
/// Every field is opaque to the gateway. Empty strings are accepted; a missing
/// `auth_url` only shows up when the first request is handled.
///
/// Hosts that describe middleware in JSON can deserialize this directly:
///
/// ```rust
/// use net_gateway::GatewayConfig;
///
/// let config: GatewayConfig = serde_json::from_str(
///     r#"{"authUrl": "https://auth.example.com/token", "logHost": "10.0.0.5"}"#,
/// ).unwrap();
/// assert_eq!(config.log_port, 514);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    // =========================================================================
    // Authorization Exchange
    // =========================================================================
    /// Authorization endpoint URL
    pub auth_url: String,

    pub client_id: String,

    pub client_secret: String,

    pub redirect_uri: String,

    pub scope: String,

    // =========================================================================
    // Audit Log Collector
    // =========================================================================
    /// Collector host name or IP (empty = local host)
    pub log_host: String,

    /// Collector UDP port (default: 514)
    pub log_port: u16,

    pub log_program: String,

    pub log_service: String,

    /// Retention policy label understood by the collector
    pub log_retention: String,
}

impl GatewayConfig {
    /// Load the gateway section from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if `LOG_PORT` is not a valid port.
    pub fn from_env() -> GatewayResult<Self> {
        Ok(Self {
            auth_url: env_string("AUTH_URL"),
            client_id: env_string("CLIENT_ID"),
            client_secret: env_string("CLIENT_SECRET"),
            redirect_uri: env_string("REDIRECT_URI"),
            scope: env_string("SCOPE"),
            log_host: env_string("LOG_HOST"),
            log_port: parse_env("LOG_PORT", DEFAULT_LOG_PORT)?,
            log_program: env_string("LOG_PROGRAM"),
            log_service: env_string("LOG_SERVICE"),
            log_retention: env_string("LOG_RETENTION"),
        })
    }

    /// Collector address in `host:port` form, ready for resolution.
    ///
    /// An empty host targets the local machine. IPv6 literals are bracketed.
    pub fn collector_addr(&self) -> String {
        let host = self.log_host.trim();
        if host.is_empty() {
            format!("127.0.0.1:{}", self.log_port)
        } else if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.log_port)
        } else {
            format!("{host}:{}", self.log_port)
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scope: String::new(),
            log_host: String::new(),
            log_port: DEFAULT_LOG_PORT,
            log_program: String::new(),
            log_service: String::new(),
            log_retention: String::new(),
        }
    }
}

/// Configuration of the `net-gateway` binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,

    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if a numeric value does not parse
    /// or validation fails.
    pub fn from_env() -> GatewayResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 3000)?,
            metrics_port: parse_env("METRICS_PORT", 9090)?,
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            gateway: GatewayConfig::from_env()?,
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> GatewayResult<()> {
        if self.port == 0 {
            return Err(GatewayError::ConfigError(
                "PORT must be greater than 0".to_string(),
            ));
        }

        if self.gateway.log_port == 0 {
            return Err(GatewayError::ConfigError(
                "LOG_PORT must be greater than 0".to_string(),
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

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            metrics_port: 9090,
            log_level: "info".to_string(),
            gateway: GatewayConfig::default(),
        }
    }
}

fn env_string(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

/// Parse an environment variable into the specified type with a default value.
fn parse_env<T>(name: &str, default: T) -> GatewayResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| GatewayError::ConfigError(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
