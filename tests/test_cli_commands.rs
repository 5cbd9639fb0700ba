//! Binary-level tests for every subcommand.

mod common;

use std::io::Write;

use common::{SignalProcess, json_lines, run_command};

// ============================================================================
// version
// ============================================================================

#[test]
fn version_human() {
    let output = run_command(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("signalphase "), "unexpected output: {stdout}");
}

#[test]
fn version_json() {
    let output = run_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed = &json_lines(&output)[0];
    assert_eq!(parsed["name"], "signalphase");
    assert!(parsed["version"].is_string());
}

// ============================================================================
// simulate
// ============================================================================

#[test]
fn simulate_prints_one_snapshot_per_tick() {
    let output = run_command(&["simulate", "--ticks", "19", "--format", "json"]);
    assert!(
        output.status.success(),
        "simulate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let snapshots = json_lines(&output);
    assert_eq!(snapshots.len(), 20);
    assert_eq!(snapshots[0]["phase_index"], 0);
    assert_eq!(snapshots[0]["east_west_display"], "19");
    assert_eq!(snapshots[19]["phase_index"], 4);
    assert_eq!(snapshots[19]["countdown_east_west"], 0);
    assert_eq!(snapshots[19]["signals"][2]["light"], "green");
}

#[test]
fn simulate_applies_scheduled_change() {
    let output = run_command(&[
        "simulate", "--ticks", "5", "--set-at", "5:12:5", "--format", "json",
    ]);
    assert!(output.status.success());
    let snapshots = json_lines(&output);
    assert_eq!(snapshots[4]["phase_remaining"], 6);
    assert_eq!(snapshots[5]["phase_remaining"], 7);
    assert_eq!(snapshots[5]["applied"]["green"], 12);
}

#[test]
fn simulate_sanitizes_duration_flags() {
    let output = run_command(&[
        "simulate", "--ticks", "0", "--green", "0x12", "--left-turn", "abc", "--format", "json",
    ]);
    assert!(output.status.success());
    let snapshot = &json_lines(&output)[0];
    assert_eq!(snapshot["configured"]["green"], 12);
    assert_eq!(snapshot["configured"]["left_turn"], 5);
    assert_eq!(snapshot["countdown_east_west"], 12 + 2 + 5 + 2);
}

#[test]
fn simulate_human_output() {
    let output = run_command(&["simulate", "--ticks", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[0] N-S (green) remaining=10s"), "{}", lines[0]);
    assert!(lines[1].contains("remaining=9s"), "{}", lines[1]);
}

// ============================================================================
// validate
// ============================================================================

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn validate_accepts_good_config() {
    let file = config_file("durations:\n  green: 15\n  left_turn: 4\ntick_interval: 500ms\n");
    let output = run_command(&["validate", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(": ok"));
}

#[test]
fn validate_rejects_zero_duration_with_config_exit_code() {
    let file = config_file("durations:\n  left_turn: 0\n");
    let output = run_command(&["validate", "--format", "json", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["valid"], false);
    assert!(
        report[0]["errors"][0]
            .as_str()
            .unwrap()
            .contains("durations.left_turn")
    );
}

#[test]
fn validate_rejects_unknown_fields() {
    let file = config_file("durations:\n  green: 10\n  amber: 3\n");
    let output = run_command(&["validate", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stdout).contains("FAILED"));
}

#[test]
fn simulate_with_missing_config_fails() {
    let output = run_command(&["simulate", "--ticks", "1", "--config", "/nonexistent/x.yaml"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn simulate_rejects_change_after_last_tick() {
    let output = run_command(&["simulate", "--ticks", "3", "--set-at", "5:12:5"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("after the last tick"), "stderr: {stderr}");
}

#[test]
fn run_rejects_huge_tick_interval() {
    let output = run_command(&["run", "--quiet", "--tick-interval", "400000000000years"]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not exceed"), "stderr: {stderr}");
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = run_command(&["launch"]);
    assert!(!output.status.success());
}

// ============================================================================
// run
// ============================================================================

#[tokio::test]
async fn run_waits_for_start_then_ticks() {
    let mut process = SignalProcess::spawn(&[]);

    let idle = process.next_snapshot().await.unwrap();
    assert_eq!(idle["initialized"], false);
    assert_eq!(idle["running"], false);
    assert_eq!(idle["signals"][0]["light"], "red");

    process.send("start").await;
    let started = process.wait_for(|s| s["running"] == true).await;
    assert_eq!(started["countdown_east_west"], 19);

    let ticked = process.wait_for(|s| s["phase_remaining"] == 8).await;
    assert_eq!(ticked["phase_index"], 0);

    process.send("stop").await;
    let stopped = process.wait_for(|s| s["running"] == false).await;
    assert_eq!(stopped["initialized"], true);

    assert!(process.quit().await.success());
}

#[tokio::test]
async fn run_set_and_reset() {
    let mut process = SignalProcess::spawn(&["--green", "20", "--autostart"]);
    process.wait_for(|s| s["running"] == true).await;

    process.send("set 30 5").await;
    let changed = process.wait_for(|s| s["configured"]["green"] == 30).await;
    assert!(changed["initialized"] == true);
    process.wait_for(|s| s["applied"]["green"] == 30).await;

    process.send("reset").await;
    let reset = process.wait_for(|s| s["initialized"] == false).await;
    assert_eq!(reset["phase_remaining"], 10);
    assert_eq!(reset["running"], false);

    process.send("bogus").await;
    process.send("status").await;
    let status = process.next_snapshot().await.unwrap();
    assert_eq!(status["initialized"], false);

    assert!(process.quit().await.success());
}
