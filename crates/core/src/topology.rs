// SPDX-License-Identifier: MIT

//! Tier ordering derived from the user's `fuku.yaml`.

use indexmap::IndexMap;

use crate::config::ServiceConfig;

/// The reserved tier name for services without an explicit `tier`.
pub const DEFAULT_TIER: &str = "default";

/// A named group of services, ordered for startup against other tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub name: String,
    pub services: Vec<String>,
}

/// User-declared tier ordering: the order in which tier names first appear
/// across `services` in the YAML document, with `default` appended if any
/// service needs it and it wasn't already declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    order: Vec<String>,
}

impl Topology {
    /// Build the tier order from a service map, honoring `defaults.tier` as
    /// the fallback a tier-less service receives before falling further back
    /// to [`DEFAULT_TIER`].
    pub fn from_services(
        services: &IndexMap<String, ServiceConfig>,
        defaults_tier: Option<&str>,
    ) -> Self {
        let mut order = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut needs_default = false;

        for service in services.values() {
            let tier = service
                .tier
                .as_deref()
                .or(defaults_tier)
                .unwrap_or(DEFAULT_TIER);
            if tier == DEFAULT_TIER {
                needs_default = true;
            }
            if seen.insert(tier.to_string()) {
                order.push(tier.to_string());
            }
        }

        if needs_default && !seen.contains(DEFAULT_TIER) {
            order.push(DEFAULT_TIER.to_string());
        }

        Self { order }
    }

    /// Index of `tier` in declared order, or `None` if never declared (in
    /// which case the caller should coalesce into [`DEFAULT_TIER`]).
    pub fn index_of(&self, tier: &str) -> Option<usize> {
        self.order.iter().position(|t| t == tier)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
