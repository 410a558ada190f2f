//! Load balancer provider subsystem.
//!
//! # Data Flow
//! ```text
//! Credentials (environment)
//!     → rackspace.rs (identity token + regional endpoints)
//!     → LoadBalancerProvider calls:
//!         - list_balancers (per region, paginated)
//!         - get_balancer / list_members (per balancer)
//!         - attach_member / detach_member (single node)
//! ```
//!
//! # Design Decisions
//! - One trait at the seam so reconciliation runs against any backend
//! - Calls are addressed by (region, balancer id); ids are opaque strings
//! - Only reads are retried; mutations go out exactly once
//! - Pool changes racing a mutation surface as `ProviderError::Conflict`

pub mod rackspace;
pub mod types;

use async_trait::async_trait;

pub use rackspace::RackspaceProvider;
pub use types::{
    Balancer, BalancerDescriptor, Member, NewMember, ParseRegionError, ProviderError,
    ProviderResult, Region,
};

/// Operations the node tool needs from a cloud load balancer API.
#[async_trait]
pub trait LoadBalancerProvider: Send + Sync {
    /// List every balancer in a region.
    async fn list_balancers(&self, region: Region) -> ProviderResult<Vec<BalancerDescriptor>>;

    /// Fetch a single balancer.
    async fn get_balancer(&self, region: Region, balancer_id: &str) -> ProviderResult<Balancer>;

    /// List the live members of a balancer pool.
    async fn list_members(&self, region: Region, balancer_id: &str) -> ProviderResult<Vec<Member>>;

    /// Attach exactly one member.
    ///
    /// Returns the member as registered by the provider when the response
    /// describes it. `None` still means the attach succeeded.
    async fn attach_member(
        &self,
        region: Region,
        balancer_id: &str,
        member: &NewMember,
    ) -> ProviderResult<Option<Member>>;

    /// Detach exactly one member.
    async fn detach_member(
        &self,
        region: Region,
        balancer_id: &str,
        member: &Member,
    ) -> ProviderResult<()>;
}
