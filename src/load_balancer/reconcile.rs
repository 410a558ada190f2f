//! Node reconciliation.
//!
//! # Responsibilities
//! - Resolve the target balancer by name
//! - Check the live pool for the `(ip, port)` node
//! - Attach or detach exactly one member when the pool disagrees
//! - Report what happened as an `Outcome`
//!
//! The check and the mutation are separate provider calls. A pool change in
//! between comes back from the provider as `ProviderError::Conflict`.

use std::fmt;

use crate::error::exit_code;
use crate::load_balancer::directory::BalancerDirectory;
use crate::load_balancer::membership::find_member;
use crate::provider::{LoadBalancerProvider, NewMember, ProviderResult};

/// What to do with the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Add,
    Delete,
}

impl fmt::Display for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeAction::Add => f.write_str("add"),
            NodeAction::Delete => f.write_str("delete"),
        }
    }
}

/// The node and the balancer it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    /// Balancer name, matched exactly.
    pub balancer: String,
    /// Advisory label; not used to identify the member.
    pub name: Option<String>,
    pub ip: String,
    pub port: u16,
}

impl NodeSpec {
    /// `ip:port` as printed in reports.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Attached { node: String, balancer: String },
    AlreadyPresent { node: String, balancer: String },
    Detached { node: String, balancer: String },
    NotPresent { node: String, balancer: String },
    NoMatchingBalancer { balancer: String },
}

impl Outcome {
    /// True if the provider pool was changed.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Outcome::Attached { .. } | Outcome::Detached { .. })
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Attached { .. } | Outcome::Detached { .. } => exit_code::CHANGED,
            Outcome::AlreadyPresent { .. } | Outcome::NotPresent { .. } => exit_code::UNCHANGED,
            Outcome::NoMatchingBalancer { .. } => exit_code::NO_MATCHING_BALANCER,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Attached { node, balancer } => {
                write!(f, "Node {} attached to {} pool.", node, balancer)
            }
            Outcome::AlreadyPresent { node, balancer } => {
                write!(f, "Node {} exists in {} pool.", node, balancer)
            }
            Outcome::Detached { node, balancer } => {
                write!(f, "Node {} detached from {} pool.", node, balancer)
            }
            Outcome::NotPresent { node, balancer } => {
                write!(f, "Node {} does not exist in {} pool.", node, balancer)
            }
            Outcome::NoMatchingBalancer { .. } => f.write_str("No Matching LB"),
        }
    }
}

/// Applies node actions through a provider.
pub struct Reconciler<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P> Reconciler<'a, P>
where
    P: LoadBalancerProvider + ?Sized,
{
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub async fn apply(
        &self,
        directory: &BalancerDirectory,
        action: NodeAction,
        spec: &NodeSpec,
    ) -> ProviderResult<Outcome> {
        let node = spec.endpoint();

        let Some(target) = directory.resolve(&spec.balancer) else {
            tracing::info!(balancer = %spec.balancer, "No balancer with that name");
            return Ok(Outcome::NoMatchingBalancer {
                balancer: spec.balancer.clone(),
            });
        };

        let balancer = self.provider.get_balancer(target.region, &target.id).await?;
        tracing::debug!(
            id = %balancer.id,
            region = %balancer.region,
            status = %balancer.status,
            "Resolved balancer"
        );

        let members = self.provider.list_members(target.region, &balancer.id).await?;
        let existing = find_member(&members, &spec.ip, spec.port);

        let outcome = match (action, existing) {
            (NodeAction::Add, Some(member)) => {
                tracing::debug!(node = %node, member_id = %member.id, "Node already in pool");
                Outcome::AlreadyPresent {
                    node,
                    balancer: spec.balancer.clone(),
                }
            }
            (NodeAction::Add, None) => {
                let new_member = NewMember {
                    ip: spec.ip.clone(),
                    port: spec.port,
                };
                let created = self
                    .provider
                    .attach_member(target.region, &balancer.id, &new_member)
                    .await?;
                let member_id = created.as_ref().map_or("-", |m| m.id.as_str());
                tracing::info!(node = %node, member_id, "Attached node");
                Outcome::Attached {
                    node,
                    balancer: spec.balancer.clone(),
                }
            }
            (NodeAction::Delete, Some(member)) => {
                self.provider
                    .detach_member(target.region, &balancer.id, member)
                    .await?;
                tracing::info!(node = %node, member_id = %member.id, "Detached node");
                Outcome::Detached {
                    node,
                    balancer: spec.balancer.clone(),
                }
            }
            (NodeAction::Delete, None) => {
                tracing::debug!(node = %node, "Node not in pool");
                Outcome::NotPresent {
                    node,
                    balancer: spec.balancer.clone(),
                }
            }
        };

        tracing::info!(
            balancer = %spec.balancer,
            changed = outcome.is_mutation(),
            "Reconciled node"
        );
        Ok(outcome)
    }

    pub async fn add(
        &self,
        directory: &BalancerDirectory,
        spec: &NodeSpec,
    ) -> ProviderResult<Outcome> {
        self.apply(directory, NodeAction::Add, spec).await
    }

    pub async fn delete(
        &self,
        directory: &BalancerDirectory,
        spec: &NodeSpec,
    ) -> ProviderResult<Outcome> {
        self.apply(directory, NodeAction::Delete, spec).await
    }
}
