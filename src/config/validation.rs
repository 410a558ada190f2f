//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts > 0, delay bounds)
//! - Reject duplicate regions and malformed URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClbConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::ClbConfig;
use crate::provider::Region;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("regions must not be empty")]
    NoRegions,

    #[error("region {0} is listed more than once")]
    DuplicateRegion(Region),

    #[error("provider.identity_url '{0}' is not a valid http(s) URL")]
    InvalidIdentityUrl(String),

    #[error("provider.{0} must name an environment variable")]
    EmptyEnvName(&'static str),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    DelayBounds { base: u64, max: u64 },

    #[error("observability.log_level '{0}' is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ClbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.regions.is_empty() {
        errors.push(ValidationError::NoRegions);
    }
    let mut seen = HashSet::new();
    for region in &config.regions {
        if !seen.insert(*region) {
            errors.push(ValidationError::DuplicateRegion(*region));
        }
    }

    match Url::parse(&config.provider.identity_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() => {}
        _ => errors.push(ValidationError::InvalidIdentityUrl(
            config.provider.identity_url.clone(),
        )),
    }
    if config.provider.username_env.trim().is_empty() {
        errors.push(ValidationError::EmptyEnvName("username_env"));
    }
    if config.provider.api_key_env.trim().is_empty() {
        errors.push(ValidationError::EmptyEnvName("api_key_env"));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::DelayBounds {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
