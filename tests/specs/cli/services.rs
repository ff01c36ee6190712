//! `fuku services` specs.

use crate::prelude::*;

#[test]
fn lists_tiers_and_services_for_a_profile() {
    let project = Project::empty();
    project.config(
        r#"
services:
  db:
    dir: .
    tier: backend
  api:
    dir: .
    tier: frontend
profiles:
  default: "*"
"#,
    );

    project
        .fuku()
        .args(&["services"])
        .passes()
        .stdout_has("backend:")
        .stdout_has("  db")
        .stdout_has("frontend:")
        .stdout_has("  api");
}

#[test]
fn explicit_profile_narrows_the_listed_services() {
    let project = Project::empty();
    project.config(
        r#"
services:
  db:
    dir: .
  api:
    dir: .
profiles:
  default: "*"
  solo: api
"#,
    );

    let assert = project.fuku().args(&["services", "solo"]).passes();
    let stdout = assert.stdout();
    assert!(stdout.contains("api"));
    assert!(!stdout.contains("db"));
}

#[test]
fn unknown_profile_is_an_error() {
    let project = Project::empty();
    project.config(
        r#"
services:
  api:
    dir: .
profiles:
  default: "*"
"#,
    );

    project
        .fuku()
        .args(&["services", "ghost"])
        .fails()
        .stderr_has("profile not found");
}
