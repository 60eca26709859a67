//! YAML configuration for the dashboard binaries.

use livefeed::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub live_feed: LiveFeedConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub series: SeriesConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid api address: {}", e)))
    }

    /// Base URL the client binaries use to reach this API.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveFeedConfig {
    pub ws_url: String,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// None means keep trying forever (every drop is still logged)
    pub max_attempts: Option<usize>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.max_attempts,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Retention window for the client-side series
    pub max_points: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self { max_points: 10_000 }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DashboardConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.api.port == 0 {
            return Err(ConfigError::ValidationError(
                "api.port must not be zero".to_string(),
            ));
        }
        if !self.live_feed.ws_url.starts_with("ws://")
            && !self.live_feed.ws_url.starts_with("wss://")
        {
            return Err(ConfigError::ValidationError(format!(
                "live_feed.ws_url must be a ws:// or wss:// URL, got '{}'",
                self.live_feed.ws_url
            )));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.series.max_points == 0 {
            return Err(ConfigError::ValidationError(
                "series.max_points must be at least 1".to_string(),
            ));
        }
        let reconnect = &self.live_feed.reconnect;
        if reconnect.initial_delay_ms > reconnect.max_delay_ms {
            return Err(ConfigError::ValidationError(
                "live_feed.reconnect.initial_delay_ms must not exceed max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Log the effective configuration at startup.
    pub fn log(&self) {
        info!("Database: {}", self.database.url);
        info!("API: {}", self.api.base_url());
        info!("Live feed: {}", self.live_feed.ws_url);
        info!(
            "Poll every {}s, series window {} points",
            self.poll.interval_secs, self.series.max_points
        );
    }
}
