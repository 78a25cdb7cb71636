//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary config file and verify
//! outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(config: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_hourglass"))
        .args(args)
        .env("HOURGLASS_CONFIG", config)
        .env_remove("HOURGLASS_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn temp_config() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    (dir, path)
}

#[test]
fn test_config_path() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["config", "path"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), config.display().to_string());
}

#[test]
fn test_headless_without_birth_date() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["--headless"]);
    assert_eq!(code, 0, "headless failed");
    assert!(stdout.starts_with("now: "));
    assert!(stdout.contains("DAY  done: "));
    assert!(stdout.contains("YEAR done: "));
    assert!(stdout.contains("LIFE not configured"));
}

#[test]
fn test_headless_json() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["--headless", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let fraction = parsed["day"]["fraction"].as_f64().unwrap();
    assert!((0.0..1.0).contains(&fraction));
    assert!(parsed["life"].is_null());
}

#[test]
fn test_dob_enables_life() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["dob", "1990-05-20"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("BirthDateSet"));

    let (code, stdout, _) = run_cli(&config, &["--headless"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("LIFE done: "));
    assert!(stdout.contains("age: "));

    let (_, stdout, _) = run_cli(&config, &["config", "get", "dob"]);
    assert_eq!(stdout.trim(), "1990-05-20");
}

#[test]
fn test_dob_rejects_future_and_malformed_dates() {
    let (_dir, config) = temp_config();
    let (code, _, stderr) = run_cli(&config, &["dob", "2999-01-01"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, stderr) = run_cli(&config, &["dob", "20/05/1990"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not a valid date"));
}

#[test]
fn test_timer_countdown_lifecycle() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["timer", "countdown", "00:01:30"]);
    assert_eq!(code, 0, "countdown failed");
    assert!(stdout.contains("TimerConfigured"));
    assert!(stdout.contains("TimerPaused"));
    assert!(stdout.contains("countdown saved paused"));

    let (code, stdout, _) = run_cli(&config, &["timer", "status"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["countdown"]["total_ms"], 90_000);
    assert_eq!(parsed["countdown"]["remaining_ms"], 90_000);
    assert_eq!(parsed["countdown"]["status"], "paused");
    assert!(parsed["deadline"].is_null());

    let (_, stdout, _) = run_cli(&config, &["--headless"]);
    assert!(stdout.contains("COUNTDOWN done:   0.0%  remaining: 00:01:30  (paused)"));

    let (code, stdout, _) = run_cli(&config, &["timer", "rewind", "countdown"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("TimerRewound"));

    let (code, _, _) = run_cli(&config, &["timer", "reset", "countdown"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&config, &["timer", "status"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["countdown"].is_null());
}

#[test]
fn test_timer_rejects_bad_duration() {
    let (_dir, config) = temp_config();
    let (code, _, stderr) = run_cli(&config, &["timer", "countdown", "0060"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("6 digits"));

    let (code, _, stderr) = run_cli(&config, &["timer", "countdown", "000075"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("below 60"));
}

#[test]
fn test_timer_deadline() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["timer", "deadline", "2099-12-31 23:59"]);
    assert_eq!(code, 0, "deadline failed");
    assert!(stdout.contains("TimerStarted"));

    let (_, stdout, _) = run_cli(&config, &["timer", "status"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["deadline"]["status"], "running");

    let (code, _, stderr) = run_cli(&config, &["timer", "pause", "deadline"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot be paused"));
}

#[test]
fn test_timer_commands_need_configuration() {
    let (_dir, config) = temp_config();
    let (code, _, stderr) = run_cli(&config, &["timer", "start", "deadline"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not configured"));
}

#[test]
fn test_countdown_run_controls_are_dashboard_only() {
    let (_dir, config) = temp_config();
    let (code, _, _) = run_cli(&config, &["timer", "countdown", "000130"]);
    assert_eq!(code, 0);

    for action in ["start", "pause", "toggle"] {
        let (code, stdout, stderr) = run_cli(&config, &["timer", action, "countdown"]);
        assert_eq!(code, 1, "{action} should fail");
        assert!(stdout.is_empty());
        assert!(stderr.contains("only run inside the dashboard"));
    }

    let (_, stdout, _) = run_cli(&config, &["timer", "status"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["countdown"]["status"], "paused");
}

#[test]
fn test_config_set_and_get() {
    let (_dir, config) = temp_config();
    let (code, stdout, _) = run_cli(&config, &["config", "set", "settings.lifespan_years", "90"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (_, stdout, _) = run_cli(&config, &["config", "get", "settings.lifespan_years"]);
    assert_eq!(stdout.trim(), "90");

    let (code, _, stderr) = run_cli(&config, &["config", "set", "settings.lifespan_years", "4294967295"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("between 1 and 200"));
    let (_, stdout, _) = run_cli(&config, &["config", "get", "settings.lifespan_years"]);
    assert_eq!(stdout.trim(), "90");

    let (code, _, stderr) = run_cli(&config, &["config", "get", "settings.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, stdout, _) = run_cli(&config, &["config", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["settings"]["frame_rate"], 24);
}

#[test]
fn test_corrupt_config_falls_back_to_defaults() {
    let (_dir, config) = temp_config();
    std::fs::write(&config, "{ broken").unwrap();
    let (code, stdout, _) = run_cli(&config, &["--headless"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("LIFE not configured"));
}
