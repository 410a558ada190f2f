//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Open the per-invocation span
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format on request, compact format otherwise
//! - Log level configurable via config and environment

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::load_balancer::{NodeAction, NodeSpec};

/// Install the global subscriber. Call once, before any other logging.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// Span wrapping one add/delete run.
pub fn invocation_span(action: NodeAction, spec: &NodeSpec) -> Span {
    tracing::info_span!(
        "invocation",
        id = %Uuid::new_v4(),
        action = %action,
        balancer = %spec.balancer,
        node = %spec.endpoint(),
        node_name = spec.name.as_deref().unwrap_or("-"),
    )
}
