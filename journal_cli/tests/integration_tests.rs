//! Integration tests for the journal binary.
//!
//! These tests verify end-to-end behavior including:
//! - Exercise and workout logging workflow
//! - Persistence across invocations
//! - The exercise delete guard
//! - Corruption recovery (degraded, empty reads instead of a crash)

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("journal"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fitness journal data store"));
}

#[test]
fn test_add_and_list_exercises() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add-exercise")
        .arg("Bench Press")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added exercise \"Bench Press\""));

    cli()
        .arg("exercises")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bench Press"));
}

#[test]
fn test_duplicate_exercise_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add-exercise")
        .arg("Squats")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("add-exercise")
        .arg("squats")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_log_writes_a_versioned_document() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add-exercise")
        .arg("Squats")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("log")
        .arg("Squats")
        .arg("--reps")
        .arg("5")
        .arg("--sets")
        .arg("3")
        .arg("--total")
        .arg("135")
        .arg("--rpe")
        .arg("8")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged Squats: 3x5 @ 135 lb"));

    // The document on disk carries the current schema version
    let contents = fs::read_to_string(data_dir.join("data.json")).expect("Failed to read data");
    let document: serde_json::Value = serde_json::from_str(&contents).expect("not JSON");
    assert_eq!(document["version"], serde_json::json!(2));
    assert_eq!(document["workouts"].as_array().unwrap().len(), 1);
    assert_eq!(document["exercises"].as_array().unwrap().len(), 1);

    cli()
        .arg("workouts")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Squats: 3x5 @ 135 lb"));
}

#[test]
fn test_show_exercise_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add-exercise")
        .arg("Deadlifts")
        .arg("--comment")
        .arg("pull slack out first")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("log")
        .arg("Deadlifts")
        .arg("--reps")
        .arg("5")
        .arg("--reps")
        .arg("3")
        .arg("--plates")
        .arg("90")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("show")
        .arg("deadlifts")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("max weight: 225 lb"))
        .stdout(predicate::str::contains("2 sets: 5/3 reps"));
}

#[test]
fn test_rm_exercise_guard() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add-exercise")
        .arg("Rows")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("log")
        .arg("Rows")
        .arg("--reps")
        .arg("10")
        .arg("--dumbbell")
        .arg("45")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    // Referenced by a logged segment: refused, with the exercise named
    cli()
        .arg("rm-exercise")
        .arg("Rows")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot delete \"Rows\""));

    // Still listed afterwards
    cli()
        .arg("exercises")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows"));
}

#[test]
fn test_rm_unused_exercise() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("add-exercise")
        .arg("Shrugs")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("rm-exercise")
        .arg("Shrugs")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted exercise \"Shrugs\""));

    cli()
        .arg("exercises")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises defined yet"));
}

#[test]
fn test_start_workout_with_date() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("start-workout")
        .arg("--date")
        .arg("2026-03-14")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Started workout on 2026-03-14"));

    cli()
        .arg("workouts")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-14"));
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let csv_path = temp_dir.path().join("out/journal.csv");

    cli()
        .arg("add-exercise")
        .arg("Bench Press")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("log")
        .arg("Bench Press")
        .arg("--reps")
        .arg("8")
        .arg("--sets")
        .arg("3")
        .arg("--plates")
        .arg("45")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("export")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 sets"));

    let contents = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert_eq!(contents.lines().count(), 4); // header + 3 sets
    assert!(contents.contains("Bench Press"));
}

#[test]
fn test_corrupt_document_degrades_to_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("data.json"), "{ not json }").expect("Failed to write");

    // Reads degrade to empty collections rather than crashing
    cli()
        .arg("workouts")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts logged yet"));

    // The corrupt document is not overwritten behind the user's back:
    // saves are refused while nothing is loaded
    cli()
        .arg("add-exercise")
        .arg("Squats")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
    let contents = fs::read_to_string(data_dir.join("data.json")).expect("Failed to read data");
    assert_eq!(contents, "{ not json }");
}

#[test]
fn test_log_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("log")
        .arg("Ghost")
        .arg("--reps")
        .arg("5")
        .arg("--total")
        .arg("100")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No exercise named \"Ghost\""));
}

#[test]
fn test_data_persists_across_invocations() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for name in ["Squats", "Bench Press", "Rows"] {
        cli()
            .arg("add-exercise")
            .arg(name)
            .arg("--data-dir")
            .arg(data_dir)
            .assert()
            .success();
    }

    cli()
        .arg("exercises")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Squats"))
        .stdout(predicate::str::contains("Bench Press"))
        .stdout(predicate::str::contains("Rows"));
}
