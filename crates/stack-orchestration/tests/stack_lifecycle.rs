//! Lifecycle tests against a stub orchestrator
//!
//! The stub is a shell script standing in for the `docker` binary. It serves
//! canned status listings, records which subcommands were invoked, and
//! mutates its own status file on deploy/rm so the postcondition checks see
//! the state change.

#![cfg(unix)]

use stack_orchestration::{Error, Progress, RetryPolicy, Stack};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const STACK: &str = "abc123";

fn write_definition(dir: &Path, file_name: &str, services: &[&str]) -> PathBuf {
    let mut doc = String::from("services:\n");
    for service in services {
        doc.push_str(&format!("  {service}:\n    image: busybox\n"));
    }
    let path = dir.join(file_name);
    fs::write(&path, doc).unwrap();
    path
}

/// Install the stub orchestrator into `dir` and return its path.
///
/// Subcommand behavior:
/// - `ps`: append to `ps-calls.txt`, print `status.txt`
/// - `stack deploy`: record the call, print `deploy-output.txt`, then
///   overwrite `status.txt` with `status-after-deploy.txt`
/// - `stack rm`: record the call, print `rm-output.txt`, then empty
///   `status.txt`
/// - `service`: record the full argument list, print `logs-output.txt`
fn install_stub(dir: &Path) -> PathBuf {
    let script = dir.join("docker");
    let body = r#"#!/bin/sh
dir="$(dirname "$0")"
case "$1" in
  ps)
    echo ps >> "$dir/ps-calls.txt"
    cat "$dir/status.txt" 2>/dev/null
    ;;
  stack)
    echo "$2" >> "$dir/stack-calls.txt"
    if [ "$2" = deploy ]; then
      cat "$dir/deploy-output.txt" 2>/dev/null
      cp "$dir/status-after-deploy.txt" "$dir/status.txt" 2>/dev/null
    elif [ "$2" = rm ]; then
      cat "$dir/rm-output.txt" 2>/dev/null
      : > "$dir/status.txt"
    fi
    ;;
  service)
    echo "$@" >> "$dir/service-calls.txt"
    cat "$dir/logs-output.txt" 2>/dev/null
    ;;
esac
exit 0
"#;
    fs::write(&script, body).unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}

fn set_status(dir: &Path, services: &[&str]) {
    let listing: Vec<String> = services.iter().map(|s| format!("{STACK}_{s}")).collect();
    fs::write(dir.join("status.txt"), listing.join("\n")).unwrap();
}

fn stack_calls(dir: &Path) -> String {
    fs::read_to_string(dir.join("stack-calls.txt")).unwrap_or_default()
}

fn ps_call_count(dir: &Path) -> usize {
    fs::read_to_string(dir.join("ps-calls.txt"))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

/// Build the web+db test stack against the stub, with fast check budgets.
fn stub_stack(dir: &Path) -> Stack {
    let source = write_definition(dir, "stack.yml", &["web", "db"]);
    let stub = install_stub(dir);
    Stack::builder([source])
        .name(STACK)
        .orchestrator_program(stub.to_str().unwrap())
        .progress(Progress::Quiet)
        .deployed_check_policy(RetryPolicy::new(2, Duration::from_millis(10)))
        .not_deployed_check_policy(RetryPolicy::new(2, Duration::from_millis(10)))
        .build()
        .unwrap()
}

#[test]
fn check_deployed_passes_when_all_services_listed() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &["web", "db"]);

        stack.check_deployed(true).await.expect("should be deployed");
        // Satisfied on the first attempt, so exactly one query
        assert_eq!(ps_call_count(dir.path()), 1);
    });
}

#[test]
fn check_deployed_exhausts_budget_when_a_component_is_missing() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &["web"]); // db missing

        let err = stack
            .check_deployed(true)
            .await
            .expect_err("db is not running");
        match err {
            Error::NotDeployed { stack, output } => {
                assert_eq!(stack, STACK);
                assert!(output.contains("abc123_web"));
            }
            other => panic!("expected NotDeployed, got {other:?}"),
        }
        // 2 extra retries configured: three queries in total
        assert_eq!(ps_call_count(dir.path()), 3);
    });
}

#[test]
fn check_not_deployed_passes_on_empty_listing() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &[]);

        stack
            .check_deployed(false)
            .await
            .expect("nothing is running");
    });
}

#[test]
fn check_not_deployed_fails_while_any_service_persists() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &["db"]);

        let err = stack
            .check_deployed(false)
            .await
            .expect_err("db still running");
        assert!(matches!(err, Error::IsDeployed { .. }));
    });
}

#[test]
fn repeated_checks_against_unchanged_state_agree() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &["web", "db"]);

        stack.check_deployed(true).await.expect("first check");
        stack.check_deployed(true).await.expect("second check");
    });
}

#[test]
fn deploy_on_deployed_stack_fails_without_invoking_deploy() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &["web", "db"]);

        let err = stack.deploy().await.expect_err("already deployed");
        assert!(matches!(err, Error::IsDeployed { .. }));
        assert!(!stack_calls(dir.path()).contains("deploy"));
    });
}

#[test]
fn teardown_on_absent_stack_fails_without_invoking_rm() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &[]);

        let err = stack.teardown().await.expect_err("nothing to tear down");
        assert!(matches!(err, Error::NotDeployed { .. }));
        assert!(!stack_calls(dir.path()).contains("rm"));
    });
}

#[test]
fn deploy_then_teardown_full_lifecycle() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &[]);
        fs::write(
            dir.path().join("deploy-output.txt"),
            "Creating network abc123_default\n\
             Creating service abc123_web\n\
             Creating service abc123_db\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("status-after-deploy.txt"),
            "abc123_web\nabc123_db\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("rm-output.txt"),
            "Removing service abc123_web\n\
             Removing service abc123_db\n\
             Removing network abc123_default\n",
        )
        .unwrap();

        stack.deploy().await.expect("deploy should succeed");
        assert_eq!(stack_calls(dir.path()), "deploy\n");

        stack.teardown().await.expect("teardown should succeed");
        assert_eq!(stack_calls(dir.path()), "deploy\nrm\n");
        stack
            .check_deployed(false)
            .await
            .expect("stack is gone again");
    });
}

#[test]
fn deploy_failure_carries_the_captured_output() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &[]);
        fs::write(
            dir.path().join("deploy-output.txt"),
            "failed to create service abc123_web: no such image\n",
        )
        .unwrap();

        let err = stack
            .deploy_with(&RetryPolicy::new(0, Duration::ZERO))
            .await
            .expect_err("creation lines missing");
        match &err {
            Error::DeployFailed { output, .. } => {
                assert!(output.contains("no such image"));
            }
            other => panic!("expected DeployFailed, got {other:?}"),
        }
        // The rendered message interpolates the output for troubleshooting
        assert!(err.to_string().contains("no such image"));
    });
}

#[test]
fn teardown_failure_carries_the_captured_output() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let stack = stub_stack(dir.path());
        set_status(dir.path(), &["web", "db"]);
        fs::write(
            dir.path().join("rm-output.txt"),
            "Removing service abc123_web\n",
        )
        .unwrap();

        let err = stack
            .teardown_with(&RetryPolicy::new(0, Duration::ZERO))
            .await
            .expect_err("db removal line missing");
        match err {
            Error::TeardownFailed { output, .. } => {
                assert!(output.contains("abc123_web"));
            }
            other => panic!("expected TeardownFailed, got {other:?}"),
        }
    });
}

#[test]
fn logs_resolves_aliases_before_invoking_the_orchestrator() {
    smol::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let source = write_definition(dir.path(), "stack.yml", &["web", "db"]);
        let stub = install_stub(dir.path());
        let stack = Stack::builder([source])
            .name(STACK)
            .orchestrator_program(stub.to_str().unwrap())
            .progress(Progress::Quiet)
            .alias("frontend", "web")
            .build()
            .unwrap();
        fs::write(dir.path().join("logs-output.txt"), "log line\n").unwrap();

        stack.logs("frontend", false).await.expect("logs pass through");

        let calls = fs::read_to_string(dir.path().join("service-calls.txt")).unwrap();
        assert_eq!(calls.trim(), "service logs --raw abc123_web");
    });
}
