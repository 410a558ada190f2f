//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config file (TOML, optional)
//!     → loader.rs (parse & deserialize, or defaults)
//!     → validation.rs (semantic checks)
//!     → ClbConfig (validated, immutable)
//!     → --region override narrows the region list
//! ```
//!
//! # Design Decisions
//! - Config is read once per invocation; nothing is written back
//! - All fields have defaults so the tool runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::ClbConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProviderConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
pub use validation::{validate_config, ValidationError};
