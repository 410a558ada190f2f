//! Command-line surface.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::load_balancer::{NodeAction, NodeSpec};
use crate::provider::Region;

#[derive(Parser, Debug)]
#[command(name = "clb")]
#[command(version, long_about = None)]
#[command(about = "Attach or detach nodes on Rackspace cloud load balancers")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only search this region for the balancer
    #[arg(short, long, global = true, value_name = "REGION")]
    pub region: Option<Region>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add Node
    Add(NodeArgs),
    /// Delete Node
    Delete(NodeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Load Balancer Name
    #[arg(short, long, value_name = "LB")]
    pub lb: String,

    /// Node Name
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// IP Address
    #[arg(short, long, value_name = "IP", value_parser = parse_ip)]
    pub ip: String,

    /// Container Port
    #[arg(short, long, value_name = "PORT", default_value_t = 8080)]
    pub port: u16,
}

impl Commands {
    pub fn into_parts(self) -> (NodeAction, NodeSpec) {
        let (action, args) = match self {
            Commands::Add(args) => (NodeAction::Add, args),
            Commands::Delete(args) => (NodeAction::Delete, args),
        };
        (action, args.into())
    }
}

impl From<NodeArgs> for NodeSpec {
    fn from(args: NodeArgs) -> Self {
        NodeSpec {
            balancer: args.lb,
            name: args.name,
            ip: args.ip,
            port: args.port,
        }
    }
}

/// Accept only literal IP addresses, normalised to their canonical form.
fn parse_ip(value: &str) -> Result<String, String> {
    value
        .trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|e| format!("'{}' is not an IP address: {}", value, e))
}
