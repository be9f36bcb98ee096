//! Integration tests for the `rfgate` CLI binary.
//!
//! Everything runs against temp files; the user's real config is never read.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `rfgate` binary with env isolation.
fn rfgate_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rfgate");
    cmd.env("HOME", "/tmp/rfgate-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/rfgate-cli-test-nonexistent")
        .env_remove("RFGATE_CONFIG")
        .env_remove("RFGATE_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn demo_script() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/intersection.json")
}

fn write_script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("script.json");
    std::fs::write(&path, body).unwrap();
    path
}

/// A repeater with no RF link: two topology errors.
const ORPHAN_REPEATER: &str = r#"[
  {"enact": {"description": "orphan", "actions": [
    {"objectType": "MAP_REPEATER", "objectId": "6001", "updateType": "ADD", "newData": {}}
  ]}}
]"#;

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = rfgate_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    rfgate_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("replay")
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_completions_zsh() {
    rfgate_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Replay ──────────────────────────────────────────────────────────

#[test]
fn test_replay_demo_is_clean() {
    rfgate_cmd()
        .args(["replay", "--strict", "--color", "never"])
        .arg(demo_script())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("No validation errors")
                .and(predicate::str::contains("5 step(s) applied")),
        );
}

#[test]
fn test_replay_demo_json_with_state() {
    let output = rfgate_cmd()
        .args(["replay", "--state", "-o", "json"])
        .arg(demo_script())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["steps"], 5);
    assert_eq!(report["undoDepth"], 2);
    assert_eq!(report["redoDepth"], 0);
    // The zone came back under its server id after undo/redo.
    assert!(report["state"]["sensorZones"].get("sz-7").is_some());
    assert!(report["state"]["sensorZones"].get("clientSz-0000abcd").is_none());
}

#[test]
fn test_replay_reports_topology_errors() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, ORPHAN_REPEATER);
    rfgate_cmd()
        .args(["replay", "-o", "plain"])
        .arg(&script)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("MAP_REPEATER-6001\tRepeater 6001 needs an RF link")
                .and(predicate::str::contains("no RF connection to a Radio")),
        );
}

#[test]
fn test_replay_strict_fails_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, ORPHAN_REPEATER);
    rfgate_cmd()
        .args(["replay", "--strict", "-q"])
        .arg(&script)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("validation error"));
}

#[test]
fn test_replay_rejected_step() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        &dir,
        r#"[{"enact": {"description": "bad", "actions": [
            {"objectType": "STS_ADDR_MAP", "objectId": "STS", "updateType": "ADD", "newData": {}}
        ]}}]"#,
    );
    rfgate_cmd()
        .arg("replay")
        .arg(&script)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Step 1 was rejected"));
}

#[test]
fn test_replay_malformed_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, r#"[{"teleport": {}}]"#);
    rfgate_cmd()
        .arg("replay")
        .arg(&script)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid replay script"));
}

#[test]
fn test_replay_missing_script() {
    rfgate_cmd()
        .args(["replay", "/tmp/rfgate-cli-test-nonexistent/none.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not read script"));
}

#[test]
fn test_replay_reads_stdin() {
    rfgate_cmd()
        .args(["replay", "-", "-o", "json-compact"])
        .write_stdin(ORPHAN_REPEATER)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"undoDepth\":1"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    rfgate_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("undo_limit = 100"));
}

#[test]
fn test_config_init_then_refuse_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rfgate.toml");

    rfgate_cmd()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(std::fs::read_to_string(&path).unwrap().contains("[layout]"));

    rfgate_cmd()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("already exists"));

    rfgate_cmd()
        .args(["config", "init", "--force", "--config"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_config_output_default_applies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rfgate.toml");
    std::fs::write(&path, "[defaults]\noutput = \"json\"\n").unwrap();
    let script = write_script(&dir, ORPHAN_REPEATER);

    rfgate_cmd()
        .arg("--config")
        .arg(&path)
        .arg("replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn test_invalid_config_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rfgate.toml");
    std::fs::write(&path, "[history]\nundo_limit = 0\n").unwrap();

    rfgate_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .code(3);
}

#[test]
fn test_config_path_honours_flag() {
    rfgate_cmd()
        .args(["config", "path", "--config", "/tmp/elsewhere.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere.toml"));
}
