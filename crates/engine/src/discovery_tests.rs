// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use indexmap::IndexMap;
use fuku_core::{Config, ConcurrencyConfig, DefaultsConfig, LoggingConfig, LogsConfig, ProfileSelector, RetryConfig, ServiceConfig};

use super::*;

fn service(tier: Option<&str>) -> ServiceConfig {
    ServiceConfig {
        dir: "/tmp".into(),
        tier: tier.map(str::to_string),
        profiles: vec![],
        readiness: None,
        watch: None,
    }
}

fn base_config(services: IndexMap<String, ServiceConfig>, profiles: BTreeMap<String, ProfileSelector>) -> Config {
    Config {
        version: 1,
        logging: LoggingConfig::default(),
        concurrency: ConcurrencyConfig::default(),
        retry: RetryConfig::default(),
        logs: LogsConfig::default(),
        defaults: DefaultsConfig::default(),
        services,
        profiles,
    }
}

#[test]
fn unknown_profile_is_an_error() {
    let config = base_config(IndexMap::new(), BTreeMap::new());
    let result = resolve(&config, "missing");
    assert_eq!(result, Err(DiscoveryError::ProfileNotFound("missing".to_string())));
}

#[test]
fn all_marker_expands_to_every_service_grouped_by_tier() {
    let mut services = IndexMap::new();
    services.insert("api".to_string(), service(Some("backend")));
    services.insert("web".to_string(), service(Some("frontend")));
    services.insert("worker".to_string(), service(Some("backend")));

    let mut profiles = BTreeMap::new();
    profiles.insert("*".to_string(), ProfileSelector::All(fuku_core::config::AllMarker));
    let config = base_config(services, profiles);

    let tiers = resolve(&config, "*").unwrap();
    assert_eq!(tiers.len(), 2);
    assert_eq!(tiers[0].name, "backend");
    assert_eq!(tiers[0].services, vec!["api", "worker"]);
    assert_eq!(tiers[1].name, "frontend");
    assert_eq!(tiers[1].services, vec!["web"]);
}

#[test]
fn unresolved_service_name_is_an_error() {
    let services = IndexMap::new();
    let mut profiles = BTreeMap::new();
    profiles.insert("dev".to_string(), ProfileSelector::One("ghost".to_string()));
    let config = base_config(services, profiles);

    let result = resolve(&config, "dev");
    assert_eq!(result, Err(DiscoveryError::ServiceNotFound("ghost".to_string())));
}

#[test]
fn duplicate_names_in_a_list_profile_are_deduplicated() {
    let mut services = IndexMap::new();
    services.insert("api".to_string(), service(None));

    let mut profiles = BTreeMap::new();
    profiles.insert(
        "dev".to_string(),
        ProfileSelector::Many(vec!["api".to_string(), "api".to_string()]),
    );
    let config = base_config(services, profiles);

    let tiers = resolve(&config, "dev").unwrap();
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0].services, vec!["api"]);
}

#[test]
fn tierless_services_fall_back_to_default() {
    let mut services = IndexMap::new();
    services.insert("api".to_string(), service(None));
    services.insert("web".to_string(), service(Some("frontend")));

    let mut profiles = BTreeMap::new();
    profiles.insert(
        "dev".to_string(),
        ProfileSelector::Many(vec!["api".to_string(), "web".to_string()]),
    );
    let config = base_config(services, profiles);

    let tiers = resolve(&config, "dev").unwrap();
    let names: Vec<&str> = tiers.iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"default"));
    assert!(names.contains(&"frontend"));
}
