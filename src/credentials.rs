//! Provider credentials.
//!
//! Credentials come only from the environment. The API key is never logged.

use std::fmt;

use thiserror::Error;

use crate::config::ProviderConfig;

/// Missing credential material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("environment variable {0} is not set")]
    Missing(String),

    #[error("environment variable {0} is empty")]
    Empty(String),
}

/// Account username and API key.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    api_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    /// Read credentials from the variables named in the provider config.
    pub fn from_env(config: &ProviderConfig) -> Result<Self, CredentialsError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(config: &ProviderConfig, lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| -> Result<String, CredentialsError> {
            let value = lookup(name).ok_or_else(|| CredentialsError::Missing(name.to_string()))?;
            if value.trim().is_empty() {
                return Err(CredentialsError::Empty(name.to_string()));
            }
            Ok(value)
        };

        Ok(Self {
            username: read(&config.username_env)?,
            api_key: read(&config.api_key_env)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
