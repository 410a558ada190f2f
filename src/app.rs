//! One invocation, end to end.

use crate::config::ClbConfig;
use crate::credentials::Credentials;
use crate::error::ClbError;
use crate::load_balancer::{BalancerDirectory, NodeAction, NodeSpec, Outcome, Reconciler};
use crate::provider::{LoadBalancerProvider, RackspaceProvider, Region};

/// Read credentials, connect to the provider and apply `action`.
pub async fn run(
    config: &ClbConfig,
    action: NodeAction,
    spec: &NodeSpec,
) -> Result<Outcome, ClbError> {
    let credentials = Credentials::from_env(&config.provider)?;
    let provider = RackspaceProvider::connect(config, &credentials).await?;
    execute(&provider, &config.regions, action, spec).await
}

/// Enumerate `regions`, resolve the balancer and reconcile the node.
pub async fn execute<P>(
    provider: &P,
    regions: &[Region],
    action: NodeAction,
    spec: &NodeSpec,
) -> Result<Outcome, ClbError>
where
    P: LoadBalancerProvider + ?Sized,
{
    let directory = BalancerDirectory::collect(provider, regions).await?;
    let outcome = Reconciler::new(provider).apply(&directory, action, spec).await?;
    Ok(outcome)
}
