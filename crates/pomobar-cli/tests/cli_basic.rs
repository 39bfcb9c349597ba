//! Basic CLI E2E tests.
//!
//! Each test points `--config` at a file in its own temp directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn pomobar(config: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pomobar"));
    command.arg("--config").arg(config).env("POMOBAR_LOG", "off");
    command
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config: &Path, args: &[&str]) -> (String, String, i32) {
    let output = pomobar(config)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run `pomobar run` with `input` piped to stdin.
fn run_host(config: &Path, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = pomobar(config)
        .arg("run")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Config file in a fresh directory, with cue sounds looked up next to it.
fn isolated_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let config = dir.path().join("config.toml");
    let sounds = dir.path().join("sounds");
    let (_, stderr, code) = run_cli(&config, &["config", "set", "sound.directory", sounds.to_str().unwrap()]);
    assert_eq!(code, 0, "{stderr}");
    config
}

#[test]
fn test_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    assert_eq!(run_cli(&config, &["format", "1500"]).0.trim(), "25:00");
    assert_eq!(run_cli(&config, &["format", "59.9"]).0.trim(), "00:59");
    assert_eq!(run_cli(&config, &["format", "-5"]).0.trim(), "00:00");
    assert_eq!(run_cli(&config, &["format", "6000"]).0.trim(), "100:00");
}

#[test]
fn test_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    let (stdout, _, code) = run_cli(&config, &["config", "path"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), config.display().to_string());
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (stdout, _, code) = run_cli(&config, &["config", "get", "timer.duration_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (stdout, _, code) = run_cli(&config, &["config", "set", "timer.duration_minutes", "50"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(&config, &["config", "get", "timer.duration_minutes"]);
    assert_eq!(stdout.trim(), "50");
    assert!(std::fs::read_to_string(&config).unwrap().contains("duration_minutes = 50"));
}

#[test]
fn test_config_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (_, stderr, code) = run_cli(&config, &["config", "set", "timer.duration_minutes", "42"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "stderr: {stderr}");

    let (_, _, code) = run_cli(&config, &["config", "set", "endpoint.url", "ftp://example.com"]);
    assert_ne!(code, 0);

    let (_, _, code) = run_cli(&config, &["config", "get", "timer.no_such_key"]);
    assert_ne!(code, 0);

    let (stdout, _, _) = run_cli(&config, &["config", "get", "timer.duration_minutes"]);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn test_config_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    run_cli(&config, &["config", "set", "sound.volume", "0.5"]);
    let (stdout, _, code) = run_cli(&config, &["config", "list"]);
    assert_eq!(code, 0);
    let listed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listed["sound"]["volume"], 0.5);
    assert_eq!(listed["endpoint"]["url"], "http://127.0.0.1:3000/pomodoro");

    let (_, _, code) = run_cli(&config, &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&config, &["config", "get", "sound.volume"]);
    assert_eq!(stdout.trim(), "1.0");
}

#[test]
fn test_run_status_and_stop() {
    let dir = tempfile::tempdir().unwrap();
    let config = isolated_config(&dir);

    let (stdout, stderr, code) = run_host(
        &config,
        &["--offline", "--mute", "--start", "--duration", "15"],
        "status\npause\nstatus\nstop\nstatus\nquit\n",
    );
    assert_eq!(code, 0, "{stderr}");

    let states: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(states.len(), 3);
    assert_eq!(states[0]["state"], "running");
    assert_eq!(states[0]["duration_minutes"], 15);
    assert_eq!(states[1]["state"], "paused");
    assert_eq!(states[2]["state"], "idle");
    assert_eq!(states[2]["has_session"], false);
    assert!(stderr.contains("No session running"));
}

#[test]
fn test_run_reports_unknown_commands() {
    let dir = tempfile::tempdir().unwrap();
    let config = isolated_config(&dir);

    let (_, stderr, code) = run_host(&config, &["--offline", "--mute"], "launch\n");
    assert_eq!(code, 0);
    assert!(stderr.contains("unrecognized command: launch"));
}

#[test]
fn test_run_rejects_invalid_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = isolated_config(&dir);

    let (_, stderr, code) = run_host(&config, &["--offline", "--duration", "7"], "quit\n");
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}
