//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn dump(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("config-dump"));
    let path = dir.path().to_str().expect("utf8 path");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg(format!("--config-path={path}"))
        .arg(format!("--secrets-path={path}"));
    cmd
}

fn resolved(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run config-dump");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn test_cli_help_lists_generated_flags() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = dump(&tmp);
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--config-path"))
        .stdout(predicate::str::contains("--secrets-path"))
        .stdout(predicate::str::contains("--server.port"))
        .stdout(predicate::str::contains("port to listen on"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--database.options").not());
}

#[test]
fn test_defaults_are_printed() {
    let tmp = TempDir::new().expect("tmp");
    let out = resolved(&mut dump(&tmp));
    assert_eq!(out["server.port"], 8080);
    assert_eq!(out["server.address"], "0.0.0.0");
    assert_eq!(out["server.keepalive"], true);
    assert_eq!(out["database.options"]["pool"], 4);
}

#[test]
fn test_structured_item_warns_once() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = dump(&tmp);
    cmd.assert().success().stderr(predicate::str::contains(
        "unsupported data type for config item database.options",
    ));
}

#[test]
fn test_environment_beats_config_file() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.yaml"), "server:\n  port: 9000\n").expect("write config");

    let out = resolved(&mut dump(&tmp));
    assert_eq!(out["server.port"], 9000);

    let out = resolved(dump(&tmp).env("CONFIG_server_port", "7000"));
    assert_eq!(out["server.port"], 7000);
}

#[test]
fn test_flat_dotted_keys_in_config_file() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.yaml"), "server.port: 9000\nlog.level: debug\n").expect("write config");

    let out = resolved(&mut dump(&tmp));
    assert_eq!(out["server.port"], 9000);
    assert_eq!(out["log.level"], "debug");
}

#[test]
fn test_flag_beats_environment() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.yaml"), "server:\n  port: 9000\n").expect("write config");

    let out = resolved(dump(&tmp).env("CONFIG_server_port", "7000").arg("--server.port=6000"));
    assert_eq!(out["server.port"], 6000);
}

#[test]
fn test_secrets_file_beats_config_file() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.json"), r#"{"server": {"address": "10.0.0.1"}}"#)
        .expect("write config");
    fs::write(tmp.path().join("secrets.toml"), "[server]\naddress = \"10.0.0.2\"\n")
        .expect("write secrets");

    let out = resolved(&mut dump(&tmp));
    assert_eq!(out["server.address"], "10.0.0.2");
}

#[test]
fn test_unset_bool_flag_keeps_true_default() {
    let tmp = TempDir::new().expect("tmp");
    let out = resolved(&mut dump(&tmp));
    assert_eq!(out["server.keepalive"], true);

    let out = resolved(dump(&tmp).arg("--server.keepalive=false"));
    assert_eq!(out["server.keepalive"], false);
}

#[test]
fn test_validation_failure_exits_with_key() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = dump(&tmp);
    cmd.env("CONFIG_server_port", "80");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("server.port"))
        .stderr(predicate::str::contains("outside the allowed range"));
}

#[test]
fn test_fatal_error_is_printed_once() {
    let tmp = TempDir::new().expect("tmp");
    let output = dump(&tmp).env("CONFIG_server_port", "80").output().expect("run config-dump");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("outside the allowed range").count(), 1, "stderr: {stderr}");
}

#[test]
fn test_invalid_flag_value_is_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = dump(&tmp);
    cmd.arg("--server.port=http");
    cmd.assert().failure().stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_sources_and_yaml_output() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = dump(&tmp);
    cmd.env("CONFIG_log_level", "debug").args(["--format=yaml", "--dump.sources"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("source: environment"))
        .stdout(predicate::str::contains("source: command line"))
        .stdout(predicate::str::contains("value: debug"));
}

#[test]
fn test_active_profiles_are_reported() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = dump(&tmp);
    cmd.arg("--profiles=dev,local");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("profile-specific configuration files are not loaded"));
}
