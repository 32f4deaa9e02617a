//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the HTTP server binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Key for the Google Fonts developer API
    pub google_api_key: String,
    /// Root directory for snapshots and license files
    pub data_dir: PathBuf,
    /// TTL in seconds for font family metadata
    pub metadata_ttl: u64,
    /// TTL in seconds for parsed font binaries
    pub font_ttl: u64,
    /// Interval in seconds between cache sweeps
    pub sweep_interval: u64,
    /// Interval in seconds between catalog refreshes
    pub refresh_interval: u64,
    /// Maximum concurrent license downloads
    pub license_concurrency: usize,
    /// Timeout in seconds for outgoing HTTP requests
    pub http_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_HOST` - Bind address (default: 0.0.0.0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `GOOGLE_API_KEY` - Google Fonts API key (default: empty)
    /// - `DATA_DIR` - Data directory (default: data)
    /// - `METADATA_TTL` - Metadata TTL in seconds (default: 86400)
    /// - `FONT_TTL` - Font binary TTL in seconds (default: 86400)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 5)
    /// - `REFRESH_INTERVAL` - Catalog refresh frequency in seconds (default: 43200)
    /// - `LICENSE_CONCURRENCY` - Parallel license downloads (default: 100)
    /// - `HTTP_TIMEOUT` - Outgoing request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            google_api_key: env::var("GOOGLE_API_KEY").unwrap_or(defaults.google_api_key),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            metadata_ttl: parse_var("METADATA_TTL").unwrap_or(defaults.metadata_ttl),
            font_ttl: parse_var("FONT_TTL").unwrap_or(defaults.font_ttl),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            refresh_interval: parse_var("REFRESH_INTERVAL").unwrap_or(defaults.refresh_interval),
            license_concurrency: parse_var("LICENSE_CONCURRENCY")
                .unwrap_or(defaults.license_concurrency),
            http_timeout: parse_var("HTTP_TIMEOUT").unwrap_or(defaults.http_timeout),
        }
    }

    /// Address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn metadata_ttl(&self) -> Duration {
        Duration::from_secs(self.metadata_ttl)
    }

    pub fn font_ttl(&self) -> Duration {
        Duration::from_secs(self.font_ttl)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout.max(1))
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            google_api_key: String::new(),
            data_dir: PathBuf::from("data"),
            metadata_ttl: 86_400,
            font_ttl: 86_400,
            sweep_interval: 5,
            refresh_interval: 43_200,
            license_concurrency: 100,
            http_timeout: 30,
        }
    }
}
