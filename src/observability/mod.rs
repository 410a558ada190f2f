//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → inside one `invocation` span per run (UUID, action, balancer)
//!
//! Consumers:
//!     → stderr, human-readable or JSON
//! ```
//!
//! # Design Decisions
//! - Logs never share stdout with the outcome line
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::{init_logging, invocation_span};
