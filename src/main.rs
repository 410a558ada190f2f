//! clb: cloud load balancer node tool
//!
//! Attaches or detaches a single backend node (IP:port) on a load balancer
//! found by name across the configured regions.
//!
//! # Flow
//!
//! ```text
//!   args ─▶ config ─▶ credentials ─▶ identity token
//!                                        │
//!                                        ▼
//!                   ┌──────────── region enumeration ────────────┐
//!                   │  iad ─▶ dfw ─▶ ord ─▶ syd ─▶ hkg (serial)  │
//!                   └────────────────────┬───────────────────────┘
//!                                        ▼
//!                          resolve balancer by name
//!                                        │
//!                                        ▼
//!                        check (ip, port) in live pool
//!                                        │
//!                          ┌─────────────┴─────────────┐
//!                          ▼                           ▼
//!                   attach / detach                  no-op
//!                          │                           │
//!                          └──────────┬────────────────┘
//!                                     ▼
//!                         outcome line + exit code
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::Instrument;

use clb::cli::Cli;
use clb::config::{load_or_default, ObservabilityConfig};
use clb::error::ClbError;
use clb::observability::{init_logging, invocation_span};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            return report(ClbError::from(e));
        }
    };
    init_logging(&config.observability);
    let config = config.restrict_to(cli.region);

    tracing::debug!(
        regions = ?config.regions,
        identity_url = %config.provider.identity_url,
        "Configuration loaded"
    );

    let (action, spec) = cli.command.into_parts();
    let span = invocation_span(action, &spec);

    match clb::app::run(&config, action, &spec).instrument(span).await {
        Ok(outcome) => {
            println!("{}", outcome);
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => report(e),
    }
}

/// Print the failure once on stderr and pick its exit code.
fn report(err: ClbError) -> ExitCode {
    eprintln!("Error: {}", err);
    ExitCode::from(err.exit_code())
}
