//! `fuku run` specs: the supervisor actually starting, reporting readiness,
//! and shutting down cleanly on SIGTERM.

use std::time::Duration;

use crate::prelude::*;

#[test]
fn invalid_config_exits_immediately_with_an_error() {
    let project = Project::empty();
    project.config("services: [not, a, map]\n");

    project
        .fuku()
        .args(&["run"])
        .fails()
        .stderr_has("Error:");
}

#[test]
fn unknown_profile_exits_immediately_with_an_error() {
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
        .args(&["run", "ghost"])
        .fails()
        .stderr_has("profile not found");
}

#[test]
fn starts_a_service_and_shuts_down_cleanly_on_sigterm() {
    let project = Project::empty();
    let ready_marker = project.path().join("ready");
    project.service_dir(
        "api",
        &format!("touch {} && sleep 30 &", ready_marker.display()),
    );
    project.config(
        r#"
services:
  api:
    dir: api
profiles:
  default: "*"
"#,
    );

    let mut child = project.fuku().args(&["run"]).spawn();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || ready_marker.exists()),
        "service never started"
    );

    terminate(&child);

    let status = wait_for_exit(&mut child, SPEC_WAIT_MAX_MS);
    assert!(status.success(), "expected clean shutdown, got {status:?}");
}

#[test]
fn shutdown_reaps_the_whole_service_process_group() {
    let project = Project::empty();
    let ready_marker = project.path().join("ready");
    let pid_file = project.path().join("child.pid");
    project.service_dir(
        "api",
        &format!(
            "(sleep 30 & echo $! > {}) && touch {}",
            pid_file.display(),
            ready_marker.display()
        ),
    );
    project.config(
        r#"
services:
  api:
    dir: api
profiles:
  default: "*"
"#,
    );

    let mut child = project.fuku().args(&["run"]).spawn();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || ready_marker.exists()),
        "service never started"
    );
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || pid_file.exists()),
        "grandchild pid was never recorded"
    );

    let grandchild_pid = std::fs::read_to_string(&pid_file)
        .expect("read pid file")
        .trim()
        .to_string();

    terminate(&child);
    let status = wait_for_exit(&mut child, SPEC_WAIT_MAX_MS);
    assert!(status.success());

    assert!(
        wait_for(1000, || !process_alive(&grandchild_pid)),
        "grandchild process survived supervisor shutdown"
    );
}

fn wait_for_exit(child: &mut std::process::Child, timeout_ms: u64) -> std::process::ExitStatus {
    let start = std::time::Instant::now();
    loop {
        if let Some(status) = child.try_wait().expect("try_wait") {
            return status;
        }
        if start.elapsed() > Duration::from_millis(timeout_ms) {
            kill_group(child);
            panic!("fuku run did not exit within {timeout_ms}ms");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn process_alive(pid: &str) -> bool {
    std::process::Command::new("kill")
        .args(["-0", pid])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
