//! Configuration management for docgate.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{GateError, Result};
use crate::ratelimit::{RateLimitConfig, TimeUnit};

/// Registration endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Prefix for environment overrides, e.g. `DOCGATE__RATE_LIMIT__REQUEST_LIMIT=20`.
const ENV_PREFIX: &str = "DOCGATE";

/// Main configuration for a document client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitingConfig,

    /// Transport configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What `submit` does when the current window is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverLimitPolicy {
    /// Return `Decision::Reject` without touching the transport.
    #[default]
    Reject,
    /// Sleep until the window resets and try again.
    Wait,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Window granularity
    #[serde(default = "default_time_unit")]
    pub time_unit: TimeUnit,

    /// Window length in `time_unit`s
    #[serde(default = "default_window_units")]
    pub window_units: u32,

    /// Maximum admitted requests per window
    #[serde(default = "default_request_limit")]
    pub request_limit: u32,

    /// Behavior once the window is exhausted
    #[serde(default)]
    pub over_limit: OverLimitPolicy,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            time_unit: default_time_unit(),
            window_units: default_window_units(),
            request_limit: default_request_limit(),
            over_limit: OverLimitPolicy::default(),
        }
    }
}

fn default_time_unit() -> TimeUnit {
    TimeUnit::Seconds
}

fn default_window_units() -> u32 {
    1
}

fn default_request_limit() -> u32 {
    10
}

impl RateLimitingConfig {
    /// Check the limit settings and build the gate's limit config.
    pub fn validate(&self) -> Result<RateLimitConfig> {
        RateLimitConfig::from_units(self.request_limit, self.window_units, self.time_unit)
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Fixed registration endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in milliseconds; no timeout when unset
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Header carrying the document signature; not sent when unset
    #[serde(default)]
    pub signature_header: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: None,
            signature_header: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl TransportConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GateConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GateError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from an optional file, then apply `DOCGATE__*`
    /// environment overrides.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            let path = path.as_ref();
            info!(path = %path.display(), "Loading configuration");
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| GateError::Config(e.to_string()))
    }
}
