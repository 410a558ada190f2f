//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Provider read (GET):
//!     → request sent with connect/request timeouts from config
//!     → On failure: retries.rs (check if retryable, retry with backoff)
//!     → backoff.rs (exponential delay with jitter)
//!
//! Provider mutation (POST/DELETE):
//!     → sent once, failures surface to the caller unchanged
//! ```
//!
//! # Design Decisions
//! - Every provider call has a deadline (reqwest client timeouts)
//! - Retries only for idempotent reads
//! - Attempts are bounded by configuration

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::RetryPolicy;
