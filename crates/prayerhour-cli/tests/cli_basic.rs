//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_prayerhour"))
        .args(args)
        .env("PRAYERHOUR_HOME", home.path())
        .env_remove("PRAYERHOUR_STEP_DURATION")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &TempDir, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_steps_lists_twelve_in_order() {
    let home = TempDir::new().unwrap();
    let steps = run_json(&home, &["steps"]);
    let steps = steps.as_array().unwrap();

    assert_eq!(steps.len(), 12);
    assert_eq!(steps[0]["label"], "Praise");
    assert_eq!(steps[11]["label"], "Praise");
    assert_eq!(steps[3]["label"], "Scripture Praying");
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step["id"], i as u64);
        assert_eq!(step["durationSecs"], 300);
    }
}

#[test]
fn test_status_without_session() {
    let home = TempDir::new().unwrap();
    let status = run_json(&home, &["status"]);

    assert!(status["session"].is_null());
    assert_eq!(status["status"], "idle");
    assert_eq!(status["stepProgress"]["current"], 1);
    assert_eq!(status["progressPct"], 0.0);
    assert_eq!(status["settings"]["primaryColor"], "#7c3aed");
}

#[test]
fn test_settings_set_and_show() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["settings", "set", "audio_enabled", "false"]);
    assert_eq!(code, 0, "settings set failed: {stderr}");
    let (_, stderr, code) = run_cli(&home, &["settings", "set", "primaryColor", "#112233"]);
    assert_eq!(code, 0, "settings set failed: {stderr}");

    let settings = run_json(&home, &["settings", "show"]);
    assert_eq!(settings["audioEnabled"], false);
    assert_eq!(settings["primaryColor"], "#112233");
    assert_eq!(settings["wakeLockEnabled"], true);

    let (_, _, code) = run_cli(&home, &["settings", "reset"]);
    assert_eq!(code, 0);
    let settings = run_json(&home, &["settings", "show"]);
    assert_eq!(settings["audioEnabled"], true);
}

#[test]
fn test_settings_rejects_bad_input() {
    let home = TempDir::new().unwrap();

    let (_, stderr, code) = run_cli(&home, &["settings", "set", "volume", "11"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(&home, &["settings", "set", "primary_color", "purple"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_path_and_set() {
    let home = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(&home, &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(&*home.path().to_string_lossy()));

    let (_, _, code) = run_cli(&home, &["config", "set", "step_duration_secs", "60"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(&home, &["config", "get", "step_duration_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let steps = run_json(&home, &["steps"]);
    assert_eq!(steps[0]["durationSecs"], 60);

    let (_, _, code) = run_cli(&home, &["config", "set", "step_duration_secs", "0"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(&home, &["config", "get", "no_such_key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_session_clear_without_session() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["session", "clear"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("session cleared"));
}

#[test]
fn test_run_short_cycle_to_completion() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(&home, &["run", "--step-duration", "1"]);
    assert_eq!(code, 0, "run failed: {stderr}");

    let events: Vec<Value> = stdout
        .lines()
        .filter(|l| l.starts_with('{') && l.ends_with('}'))
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect();
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(kinds.first(), Some(&"cycle_started"));
    assert!(kinds.contains(&"cycle_completed"));
    assert_eq!(kinds.iter().filter(|k| **k == "step_advanced").count(), 11);

    // A completed cycle leaves nothing to recover.
    let status = run_json(&home, &["status"]);
    assert!(status["session"].is_null());
}
