//! CLI help and usage output specs.

use crate::prelude::*;

#[test]
fn no_args_is_a_usage_error() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn help_flag_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn run_help_shows_usage() {
    cli().args(&["run", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn validate_help_shows_usage() {
    cli().args(&["validate", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn services_help_shows_usage() {
    cli().args(&["services", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn version_flag_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    cli().args(&["bogus"]).fails().stderr_has("error:");
}
