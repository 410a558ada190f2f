//! Node reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! configured regions
//!     → directory.rs (list balancers per region, index by name)
//!     → resolve target by exact name
//!     → membership.rs (find (ip, port) in the live pool)
//!     → reconcile.rs (attach / detach / no-op)
//!     → Outcome (printed line + exit code)
//! ```
//!
//! # Design Decisions
//! - Directory is rebuilt on every invocation; nothing is cached
//! - A member is identified by (ip, port) only
//! - Duplicate names across regions resolve to the first one enumerated
//! - At most one mutating call per invocation

pub mod directory;
pub mod membership;
pub mod reconcile;

pub use directory::BalancerDirectory;
pub use membership::find_member;
pub use reconcile::{NodeAction, NodeSpec, Outcome, Reconciler};
