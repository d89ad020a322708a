//! Integration test: the replay binary end to end.

use std::fs;
use std::process::Command;

fn scenario_path(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write scenario");
    path
}

fn vistrack() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_vistrack"));
    let log_dir = std::env::temp_dir().join("vistrack_cli_test_logs");
    command
        .env("VISTRACK_CONFIG", log_dir.join("absent-config.toml"))
        .env_remove("VISTRACK_THRESHOLD")
        .env_remove("VISTRACK_QUIET_PERIOD_MS")
        .env("XDG_STATE_HOME", &log_dir);
    command
}

#[test]
fn binary_prints_version() {
    let output = vistrack()
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("0.1.0"),
        "Expected output to contain version '0.1.0', but got: {}",
        stdout
    );
}

#[test]
fn binary_replays_scenario_as_json_lines() {
    let path = scenario_path(
        "vistrack_cli_scenario.json",
        r#"{
            "document": [
                {"tag": "p", "id": "a", "children": [{"text": "visible text"}]}
            ],
            "steps": [
                {"at": 0, "action": "intersect", "id": "a", "ratio": 0.9},
                {"at": 0, "action": "scroll"},
                {"at": 200, "action": "scroll"}
            ]
        }"#,
    );

    let output = vistrack()
        .arg(&path)
        .arg("--compact")
        .output()
        .expect("Failed to execute binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        r#"{"at":1200,"content":{"p":["visible text"]}}"#
    );

    fs::remove_file(path).ok();
}

#[test]
fn binary_honors_quiet_period_flag() {
    let path = scenario_path(
        "vistrack_cli_quiet.json",
        r#"{"steps": [{"at": 10, "action": "click"}]}"#,
    );

    let output = vistrack()
        .arg(&path)
        .args(["--compact", "--quiet-period-ms", "50"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"at":60,"content":{}}"#
    );

    fs::remove_file(path).ok();
}

#[test]
fn binary_fails_on_missing_scenario() {
    let output = vistrack()
        .arg("/nonexistent/vistrack-scenario.json")
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
}
