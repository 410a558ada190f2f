//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::provider::Region;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClbConfig {
    /// Regions enumerated when looking up a balancer by name.
    pub regions: Vec<Region>,

    /// Provider endpoint and credential settings.
    pub provider: ProviderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for provider reads.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClbConfig {
    fn default() -> Self {
        Self {
            regions: Region::DEFAULT_SET.to_vec(),
            provider: ProviderConfig::default(),
            timeouts: TimeoutConfig::default(),
            retries: RetryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClbConfig {
    /// Narrow enumeration to a single region, if one is given.
    pub fn restrict_to(mut self, region: Option<Region>) -> Self {
        if let Some(region) = region {
            self.regions = vec![region];
        }
        self
    }
}

/// Provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Identity service base URL (the `/tokens` path is appended).
    pub identity_url: String,

    /// Environment variable holding the account username.
    pub username_env: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            identity_url: "https://identity.api.rackspacecloud.com/v2.0".to_string(),
            username_env: "RS_USERNAME".to_string(),
            api_key_env: "RS_APIKEY".to_string(),
        }
    }
}

/// Timeout configuration for provider calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for a single request/response in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries of idempotent reads.
    pub enabled: bool,

    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error or a full
    /// `EnvFilter` directive). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
        }
    }
}
