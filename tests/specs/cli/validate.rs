//! `fuku validate` specs.

use crate::prelude::*;

#[test]
fn valid_config_reports_success() {
    let project = Project::empty();
    project.config("services: {}\n");

    project
        .fuku()
        .args(&["validate"])
        .passes()
        .stdout_has("is valid");
}

#[test]
fn missing_config_file_is_an_error() {
    let project = Project::empty();

    project
        .fuku()
        .args(&["validate"])
        .fails()
        .stderr_has("Error:");
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let project = Project::empty();
    project.config("services: [this is not a map]\n");

    project
        .fuku()
        .args(&["validate"])
        .fails()
        .stderr_has("Error:");
}

#[test]
fn unknown_profile_service_is_a_validation_error() {
    let project = Project::empty();
    project.config(
        r#"
services:
  api:
    dir: .
profiles:
  default: ghost
"#,
    );

    project
        .fuku()
        .args(&["validate"])
        .fails()
        .stderr_has("unknown service");
}

#[test]
fn config_flag_points_at_an_alternate_path() {
    let project = Project::empty();
    project.file("custom.yaml", "services: {}\n");

    project
        .fuku()
        .args(&["-c", "custom.yaml", "validate"])
        .passes()
        .stdout_has("custom.yaml is valid");
}
