//! Balancer directory.
//!
//! # Responsibilities
//! - Enumerate balancers across the configured regions, one region at a time
//! - Index them by name once per invocation
//! - Resolve a name to the first balancer enumerated with that name

use std::collections::HashMap;

use crate::provider::{BalancerDescriptor, LoadBalancerProvider, ProviderResult, Region};

/// Flat list of every balancer seen, with a name index.
#[derive(Debug, Default)]
pub struct BalancerDirectory {
    balancers: Vec<BalancerDescriptor>,
    by_name: HashMap<String, usize>,
}

impl BalancerDirectory {
    /// Query each region in order and collect its balancers.
    ///
    /// A failing region aborts the whole enumeration.
    pub async fn collect<P>(provider: &P, regions: &[Region]) -> ProviderResult<Self>
    where
        P: LoadBalancerProvider + ?Sized,
    {
        let mut balancers = Vec::new();
        for &region in regions {
            let found = provider.list_balancers(region).await.map_err(|e| {
                tracing::debug!(region = %region, error = %e, "Region enumeration failed");
                e
            })?;
            tracing::debug!(region = %region, count = found.len(), "Enumerated region");
            balancers.extend(found);
        }

        let directory = Self::from_descriptors(balancers);
        tracing::info!(
            regions = regions.len(),
            balancers = directory.len(),
            "Balancer directory built"
        );
        Ok(directory)
    }

    /// Build a directory from descriptors already in enumeration order.
    pub fn from_descriptors(balancers: Vec<BalancerDescriptor>) -> Self {
        let mut by_name = HashMap::with_capacity(balancers.len());
        for (idx, balancer) in balancers.iter().enumerate() {
            if let Some(&first) = by_name.get(&balancer.name) {
                let first: &BalancerDescriptor = &balancers[first];
                tracing::warn!(
                    name = %balancer.name,
                    kept_region = %first.region,
                    kept_id = %first.id,
                    ignored_region = %balancer.region,
                    ignored_id = %balancer.id,
                    "Duplicate balancer name, keeping the first one enumerated"
                );
                continue;
            }
            by_name.insert(balancer.name.clone(), idx);
        }

        Self { balancers, by_name }
    }

    /// Exact, case-sensitive name lookup.
    pub fn resolve(&self, name: &str) -> Option<&BalancerDescriptor> {
        self.by_name.get(name).map(|&idx| &self.balancers[idx])
    }

    pub fn len(&self) -> usize {
        self.balancers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balancers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalancerDescriptor> {
        self.balancers.iter()
    }
}
