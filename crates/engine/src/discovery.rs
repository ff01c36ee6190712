// SPDX-License-Identifier: MIT

//! Resolves a named profile into an ordered list of tiers to start.

use std::collections::HashSet;

use fuku_core::{Config, DiscoveryError, ProfileSelector, Tier, Topology};

/// Resolves `profile` against `config` into tiers in startup order.
pub fn resolve(config: &Config, profile: &str) -> Result<Vec<Tier>, DiscoveryError> {
    let selector = config
        .profiles
        .get(profile)
        .ok_or_else(|| DiscoveryError::ProfileNotFound(profile.to_string()))?;

    let names: Vec<String> = match selector {
        ProfileSelector::All(_) => config.services.keys().cloned().collect(),
        ProfileSelector::One(s) => vec![s.clone()],
        ProfileSelector::Many(v) => v.clone(),
    };

    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for name in names {
        if !config.services.contains_key(&name) {
            return Err(DiscoveryError::ServiceNotFound(name));
        }
        if seen.insert(name.clone()) {
            ordered.push(name);
        }
    }

    let topology = Topology::from_services(&config.services, config.defaults.tier.as_deref());

    let mut by_tier_index: std::collections::BTreeMap<usize, Vec<String>> =
        std::collections::BTreeMap::new();
    for name in ordered {
        let service = &config.services[&name];
        let tier = service
            .tier
            .as_deref()
            .or(config.defaults.tier.as_deref())
            .unwrap_or(fuku_core::topology::DEFAULT_TIER);
        let index = topology
            .index_of(tier)
            .unwrap_or_else(|| topology.index_of(fuku_core::topology::DEFAULT_TIER).unwrap_or(0));
        by_tier_index.entry(index).or_default().push(name);
    }

    let tiers = topology
        .order()
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            by_tier_index.get(&index).map(|services| {
                let mut services = services.clone();
                services.sort();
                Tier {
                    name: name.clone(),
                    services,
                }
            })
        })
        .collect();

    Ok(tiers)
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
