//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

// === Top level ===

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("bootstrap"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// === Serve Command Tests ===

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--default-user-email"))
        .stdout(predicate::str::contains("Address to bind to"));
}

#[test]
fn test_serve_rejects_invalid_default_email() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.env_remove("TASKBOARD_DEFAULT_USER_EMAIL")
        .env_remove("TASKBOARD_BIND")
        .env_remove("TASKBOARD_MONGO_TIMEOUT_SECS")
        .arg("serve")
        .arg("--default-user-email")
        .arg("not-an-email");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --default-user-email"));
}

// === Bootstrap Command Tests ===

#[test]
fn test_bootstrap_help() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.arg("bootstrap").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--if-absent"))
        .stdout(predicate::str::contains("Password for the application user"));
}

#[test]
fn test_bootstrap_requires_password() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.env_remove("TASKBOARD_APP_PASSWORD").arg("bootstrap");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--app-password"));
}

#[test]
fn test_bootstrap_rejects_empty_password() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.arg("bootstrap").arg("--app-password").arg("");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("application password is empty"));
}

// === Verify Command Tests ===

#[test]
fn test_verify_help() {
    let mut cmd = Command::cargo_bin("taskboard").unwrap();
    cmd.arg("verify").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Database to provision"));
}
