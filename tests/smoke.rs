//! Smoke tests -- verify the binary runs and key subcommands exist.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("iftriage")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Interface health analytics for device syslog events",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("iftriage")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("iftriage"));
}

#[test]
fn test_flapping_subcommand_exists() {
    Command::cargo_bin("iftriage")
        .unwrap()
        .args(["flapping", "--help"])
        .assert()
        .success();
}

#[test]
fn test_stability_subcommand_exists() {
    Command::cargo_bin("iftriage")
        .unwrap()
        .args(["stability", "--help"])
        .assert()
        .success();
}

#[test]
fn test_metrics_subcommand_exists() {
    Command::cargo_bin("iftriage")
        .unwrap()
        .args(["metrics", "--help"])
        .assert()
        .success();
}

#[test]
fn test_ingest_subcommand_exists() {
    Command::cargo_bin("iftriage")
        .unwrap()
        .args(["ingest", "--help"])
        .assert()
        .success();
}
