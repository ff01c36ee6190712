// SPDX-License-Identifier: MIT

use super::*;
use std::path::Path;

const MINIMAL: &str = r#"
services:
  db:
    dir: ./db
  api:
    dir: ./api
    tier: platform
    readiness:
      type: http
      url: http://localhost:8080/health
profiles:
  all: "*"
  solo: api
  pair: [db, api]
"#;

#[test]
fn parses_minimal_document() {
    let config = Config::from_yaml(MINIMAL, Path::new("fuku.yaml")).unwrap();
    assert_eq!(config.version, 1);
    assert_eq!(config.services.len(), 2);
    assert_eq!(config.concurrency.workers, 4);
    assert_eq!(config.retry.attempts, 3);
    assert_eq!(config.retry.backoff, Duration::from_millis(500));
}

#[test]
fn profile_selector_variants_parse() {
    let config = Config::from_yaml(MINIMAL, Path::new("fuku.yaml")).unwrap();
    assert!(matches!(config.profiles["all"], ProfileSelector::All(_)));
    assert!(matches!(config.profiles["solo"], ProfileSelector::One(ref s) if s == "api"));
    assert!(matches!(config.profiles["pair"], ProfileSelector::Many(ref v) if v.len() == 2));
}

#[test]
fn validate_passes_for_minimal_document() {
    let config = Config::from_yaml(MINIMAL, Path::new("fuku.yaml")).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn validate_rejects_http_readiness_without_url() {
    let yaml = r#"
services:
  api:
    dir: ./api
    readiness:
      type: http
"#;
    let config = Config::from_yaml(yaml, Path::new("fuku.yaml")).unwrap();
    let err = config.validate().unwrap_err();
    match err {
        ConfigError::Invalid(errors) => {
            assert!(errors.iter().any(|e| e.contains("requires url")));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn validate_rejects_unknown_profile_service() {
    let yaml = r#"
services:
  api:
    dir: ./api
profiles:
  bad: [api, ghost]
"#;
    let config = Config::from_yaml(yaml, Path::new("fuku.yaml")).unwrap();
    let err = config.validate().unwrap_err();
    match err {
        ConfigError::Invalid(errors) => {
            assert!(errors.iter().any(|e| e.contains("ghost")));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn validate_accumulates_multiple_errors() {
    let yaml = r#"
services:
  api:
    dir: ./api
    readiness:
      type: http
  worker:
    dir: ./worker
    readiness:
      type: tcp
profiles:
  bad: [api, ghost]
"#;
    let config = Config::from_yaml(yaml, Path::new("fuku.yaml")).unwrap();
    let err = config.validate().unwrap_err();
    match err {
        ConfigError::Invalid(errors) => assert!(errors.len() >= 3),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn watch_debounce_falls_back_to_default() {
    let watch = WatchConfig::default();
    assert_eq!(watch.debounce_or_default(), Duration::from_millis(300));
}

#[test]
fn load_reports_read_error_for_missing_file() {
    let err = Config::load(Path::new("/nonexistent/fuku.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
