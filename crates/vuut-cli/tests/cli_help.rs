use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_help_shows_flags_and_commands() {
    cargo_bin_cmd!("vuut")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--offline"))
        .stdout(predicate::str::contains("--channel"))
        .stdout(predicate::str::contains("--no-send"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_rejects_non_numeric_channel() {
    cargo_bin_cmd!("vuut")
        .args(["--channel", "general"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_chat_requires_terminal() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("vuut")
        .env("VUUT_HOME", dir.path())
        .arg("--offline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}

#[test]
fn test_bad_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "prefix_len = \"wide\"").unwrap();

    cargo_bin_cmd!("vuut")
        .env("VUUT_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
