// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn discovery_error_messages_are_stable() {
    assert_eq!(
        DiscoveryError::ProfileNotFound("dev".into()).to_string(),
        "profile not found: dev"
    );
    assert_eq!(
        DiscoveryError::ServiceNotFound("api".into()).to_string(),
        "service not found: api"
    );
}

#[test]
fn readiness_error_variants_round_trip_display() {
    assert_eq!(
        ReadinessError::ReadinessTimeout.to_string(),
        "readiness timed out"
    );
    assert_eq!(
        ReadinessError::ProcessExited.to_string(),
        "process exited before becoming ready"
    );
}

#[test]
fn runner_error_wraps_discovery_error() {
    let err: RunnerError = DiscoveryError::ProfileNotFound("x".into()).into();
    assert!(matches!(err, RunnerError::Discovery(_)));
}
