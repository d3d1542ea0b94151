//! Integration tests for the sprintboard CLI.
//!
//! These tests run the built binary end to end.

use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;

mod common;
use common::{run_sprintboard, run_sprintboard_with_input, stdout_of};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let stdout = stdout_of(&run_sprintboard(&["--help"]));
    assert!(stdout.contains("sprintboard"));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("interactive"));
}

#[test]
fn test_cli_version() {
    let stdout = stdout_of(&run_sprintboard(&["--version"]));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_fails() {
    let output = run_sprintboard(&["frobnicate"]);
    assert!(!output.status.success());
}

// ============================================================================
// Demo Tests
// ============================================================================

#[test]
fn test_default_command_runs_demo() {
    let stdout = stdout_of(&run_sprintboard(&[]));
    assert!(stdout.contains("1. Creating tickets"));
    assert!(stdout.contains("=== Demo Complete ==="));
}

#[test]
fn test_demo_json() {
    let stdout = stdout_of(&run_sprintboard(&["demo", "--json"]));
    let state: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(state["tickets"].as_array().unwrap().len(), 4);
    assert_eq!(state["tickets"][0]["sub_tasks"].as_array().unwrap().len(), 2);
}

#[rstest]
fn test_demo_uses_configured_sprint_length(temp_dir: TempDir) {
    let config = temp_dir.path().join("sprintboard.yaml");
    fs::write(&config, "sprint-length-days: 7\n").unwrap();

    let output = run_sprintboard(&["--config", config.to_str().unwrap(), "demo", "--json"]);
    let state: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();

    let start = state["active_sprint"]["start_date"].as_str().unwrap();
    let end = state["active_sprint"]["end_date"].as_str().unwrap();
    let start = chrono::DateTime::parse_from_rfc3339(start).unwrap();
    let end = chrono::DateTime::parse_from_rfc3339(end).unwrap();
    assert_eq!(end - start, chrono::Duration::days(7));
}

#[rstest]
#[case("sprint-length-days: 0\n")]
#[case("sprint-length-days: 4000000000\n")]
fn test_invalid_config_fails(temp_dir: TempDir, #[case] content: &str) {
    let config = temp_dir.path().join("sprintboard.yaml");
    fs::write(&config, content).unwrap();

    let output = run_sprintboard(&["--config", config.to_str().unwrap(), "demo"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sprint-length-days"));
}

#[rstest]
fn test_missing_config_fails(temp_dir: TempDir) {
    let config = temp_dir.path().join("absent.yaml");
    let output = run_sprintboard(&["--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
}

// ============================================================================
// Workflow Tests
// ============================================================================

#[rstest]
#[case("story", "STORY final status: DEPLOYED")]
#[case("epic", "EPIC final status: COMPLETED")]
#[case("on-call", "ON_CALL final status: RESOLVED")]
fn test_workflow_by_type(#[case] ticket_type: &str, #[case] expected: &str) {
    let stdout = stdout_of(&run_sprintboard(&["workflow", "--type", ticket_type]));
    assert!(stdout.starts_with(expected));
}

#[test]
fn test_workflow_json() {
    let stdout = stdout_of(&run_sprintboard(&["--json", "workflow"]));
    let tables: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tables.as_array().unwrap().len(), 3);
}

// ============================================================================
// Interactive Tests
// ============================================================================

#[test]
fn test_interactive_session() {
    let script = "1\nLogin\nEmail login\n1\nalice\n3\n1\nDesign\n\nbob\n4\n5\n0\n";
    let stdout = stdout_of(&run_sprintboard_with_input(&["interactive"], script));

    assert!(stdout.contains("Created #1 STORY [OPEN] Login  assignee: alice"));
    assert!(stdout.contains("Created sub-task"));
    assert!(stdout.contains("Started #1 Sprint-"));
    assert!(stdout.contains("Active Sprint:\n- #1 Sprint-"));
    assert!(stdout.ends_with("Goodbye!\n"));
}

#[test]
fn test_interactive_stops_at_end_of_input() {
    let stdout = stdout_of(&run_sprintboard_with_input(&["interactive"], "5\n"));
    assert!(stdout.contains("No tickets."));
    assert!(stdout.ends_with("Goodbye!\n"));
}
