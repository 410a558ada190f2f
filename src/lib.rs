//! Attach and detach backend nodes on named cloud load balancers.

pub mod app;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod load_balancer;
pub mod observability;
pub mod provider;
pub mod resilience;

pub use config::ClbConfig;
pub use error::ClbError;
pub use load_balancer::{NodeAction, NodeSpec, Outcome};
pub use provider::{LoadBalancerProvider, RackspaceProvider};
