//! Top-level error type and process exit codes.

use thiserror::Error;

use crate::config::ConfigError;
use crate::credentials::CredentialsError;
use crate::provider::ProviderError;

/// Process exit codes, one per kind of result.
pub mod exit_code {
    /// The pool was changed.
    pub const CHANGED: u8 = 0;
    /// Any error not listed below.
    pub const FAILURE: u8 = 1;
    /// Command line could not be parsed (clap's own code).
    pub const USAGE: u8 = 2;
    /// The pool already matched the request.
    pub const UNCHANGED: u8 = 3;
    /// No balancer carries the requested name.
    pub const NO_MATCHING_BALANCER: u8 = 4;
    /// The pool changed between the membership check and the mutation.
    pub const CONFLICT: u8 = 5;
}

/// Anything that stops an invocation before it produces an outcome.
#[derive(Debug, Error)]
pub enum ClbError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ClbError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ClbError::Provider(ProviderError::Conflict { .. }) => exit_code::CONFLICT,
            _ => exit_code::FAILURE,
        }
    }
}
