//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use std::fs;

use predicates::prelude::*;

use common::{isolated, small_log_fixture};

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn test_version_command() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("metabolic-tracker"))
        .stdout(predicate::str::contains("Compiler:"));
}

// ─────────────────────────────────────────────────────────────────
// Report Tests (built-in sample)
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_dashboard_default_user() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Metabolic Health Tracker"))
        .stdout(predicate::str::contains("User: TC"))
        .stdout(predicate::str::contains("Weight: 200.6"))
        .stdout(predicate::str::contains("Glucose: 89"))
        .stdout(predicate::str::contains("Ketones: 1.1"))
        .stdout(predicate::str::contains("Ratio: 80.9"))
        .stdout(predicate::str::contains("Weight Trend"))
        .stdout(predicate::str::contains("G/K Ratio"));
}

#[test]
fn test_dashboard_json() {
    let (_dir, mut cmd) = isolated();
    let output = cmd
        .args(["dashboard", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["user"], "TC");
    assert_eq!(value["headline"]["weight"], 200.6);
    assert_eq!(value["observations"].as_array().unwrap().len(), 14);
}

#[test]
fn test_dashboard_unknown_user_is_empty() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["dashboard", "--user", "Nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No data to display."));
}

#[test]
fn test_summary_missing_values() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["summary", "--user", "Theresa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight: -"))
        .stdout(predicate::str::contains("Glucose: 109"))
        .stdout(predicate::str::contains("Ketones: 0.2"))
        .stdout(predicate::str::contains("Ratio: 545.0"));
}

#[test]
fn test_users_in_first_appearance_order() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("users")
        .assert()
        .success()
        .stdout(predicate::eq("Theresa\nTC\n"));
}

#[test]
fn test_trend_weight() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["trend", "weight"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight Trend"))
        .stdout(predicate::str::contains("Week 45 Monday"))
        .stdout(predicate::str::contains("205.0"))
        .stdout(predicate::str::contains("Week 45 Saturday").not());
}

#[test]
fn test_trend_all_null_series() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["trend", "weight", "--user", "Theresa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No data to display."));
}

#[test]
fn test_trend_unknown_metric() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["trend", "bmi"]).assert().failure();
}

// ─────────────────────────────────────────────────────────────────
// Add and Export Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_add_and_export_whole_log() {
    let (dir, mut cmd) = isolated();
    let out = dir.path().join("log.csv");

    cmd.args([
        "add",
        "--state",
        "fasted",
        "--date",
        "2026-01-15",
        "--time",
        "06:05",
        "--glucose",
        "100",
        "--ketones",
        "2.0",
        "--weight",
        "196.2",
        "--output",
    ])
    .arg(&out)
    .assert()
    .success()
    .stdout(predicate::str::contains("Saved!"));

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 17);
    assert_eq!(lines[16], "01/15/26,6:05 AM,TC,Fasted,100.0,2.0,50.0,196.2,,");
}

#[test]
fn test_add_zero_ketones_has_no_ratio() {
    let (dir, mut cmd) = isolated();
    let out = dir.path().join("log.csv");

    cmd.args(["add", "--state", "fed", "--user", "Theresa", "--date", "12/11/25", "--time", "8:00 PM"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.ends_with("12/11/25,8:00 PM,Theresa,Fed,90.0,,,,,\n"));
}

#[test]
fn test_add_ratio_rounds_half_to_even() {
    let (dir, mut cmd) = isolated();
    let out = dir.path().join("log.csv");

    cmd.args(["add", "--state", "fasted", "--glucose", "85", "--ketones", "0.8", "--date", "2026-01-20", "--time", "06:30"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.ends_with("01/20/26,6:30 AM,TC,Fasted,85.0,0.8,106.2,,,\n"));
}

#[test]
fn test_add_rejects_invalid_date() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["add", "--state", "fasted", "--date", "2025-02-30"])
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("E400"));
}

#[test]
fn test_add_rejects_empty_user() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["add", "--state", "fed", "--user", ""])
        .assert()
        .failure()
        .code(40);
}

#[test]
fn test_export_to_stdout() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["export", "--user", "Theresa", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "Date,Time,User,State,Glucose (mg/dL),Ketones (mmol/L),Ratio,Weight (lbs),Body Fat %,Blood Pressure\n\
             12/09/25,4:40 PM,Theresa,Fed,109.0,0.2,545.0,,,\n",
        ));
}

#[test]
fn test_export_default_file() {
    let (dir, mut cmd) = isolated();
    cmd.arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 14 rows"))
        .stdout(predicate::str::contains("text/csv"));

    let csv = fs::read_to_string(dir.path().join("data.csv")).unwrap();
    assert_eq!(csv.lines().count(), 15);
    assert!(csv.contains("Week 45 Monday,6:30 AM,TC,Fasted,,,,205.0,15.2%,"));
}

#[test]
fn test_export_reimport_roundtrip() {
    let (dir, mut cmd) = isolated();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    cmd.args(["add", "--state", "fed", "--glucose", "110", "--ketones", "0.3", "--bp", "121/79, seated"])
        .arg("--output")
        .arg(&first)
        .assert()
        .success();

    common::tracker_cmd(dir.path())
        .arg("--data")
        .arg(&first)
        .args(["export", "--user", "TC", "--output"])
        .arg(&second)
        .assert()
        .success();

    let reexported = fs::read_to_string(&second).unwrap();
    assert_eq!(reexported.lines().count(), 16);
    assert!(reexported.contains("366.7,,,\"121/79, seated\""));
}

// ─────────────────────────────────────────────────────────────────
// Data File Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_data_flag_replaces_sample() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--data")
        .arg(small_log_fixture())
        .arg("users")
        .assert()
        .success()
        .stdout(predicate::eq("Alex\nSam\n"));
}

#[test]
fn test_data_env_var() {
    let (_dir, mut cmd) = isolated();
    cmd.env("METABOLIC_DATA", small_log_fixture())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight: 179.8"))
        .stdout(predicate::str::contains("Glucose: 90"))
        .stdout(predicate::str::contains("Ketones: 0.4"))
        .stdout(predicate::str::contains("Ratio: 300.0"));
}

#[test]
fn test_data_short_row_padded() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--data")
        .arg(small_log_fixture())
        .args(["summary", "--user", "Sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight: -"))
        .stdout(predicate::str::contains("Ratio: 50.5"));
}

#[test]
fn test_data_bad_state() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--data")
        .arg(common::fixture_path("bad_state.csv"))
        .arg("users")
        .assert()
        .failure()
        .code(30)
        .stderr(predicate::str::contains("E300"))
        .stderr(predicate::str::contains("State"));
}

#[test]
fn test_data_missing_file() {
    let (dir, mut cmd) = isolated();
    cmd.arg("--data")
        .arg(dir.path().join("nope.csv"))
        .arg("users")
        .assert()
        .failure()
        .code(20)
        .stderr(predicate::str::contains("E200"));
}

// ─────────────────────────────────────────────────────────────────
// Shell Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_shell_session() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("shell")
        .write_stdin("summary\nselect Theresa\nsummary\nselect Nobody\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight: 200.6"))
        .stdout(predicate::str::contains("Ratio: 545.0"))
        .stdout(predicate::str::contains("Error [E303]"));
}

#[test]
fn test_shell_add_then_export() {
    let (dir, mut cmd) = isolated();
    cmd.args(["shell", "--user", "Theresa"])
        .write_stdin("add --state fasted --glucose 80 --ketones 1.6 --date 2026-01-02 --time 07:00\nexport\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved!"))
        .stdout(predicate::str::contains("Exported 2 rows"));

    let csv = fs::read_to_string(dir.path().join("data.csv")).unwrap();
    assert!(csv.contains("01/02/26,7:00 AM,Theresa,Fasted,80.0,1.6,50.0,,,"));
}

#[test]
fn test_shell_unknown_start_user() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["shell", "--user", "Nobody"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .code(30);
}
