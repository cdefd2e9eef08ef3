//! CLI integration tests for the homeauto binary

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn homeauto() -> Command {
    Command::cargo_bin("homeauto").expect("Failed to find homeauto binary")
}

/// Generates a dataset and trains a small bundle inside `dir`.
fn trained_bundle(dir: &TempDir) -> std::path::PathBuf {
    let data = dir.path().join("data.csv");
    let model = dir.path().join("models.bin");
    homeauto()
        .args(["generate", "--rows", "300", "--seed", "5", "-o"])
        .arg(&data)
        .assert()
        .success();
    homeauto()
        .arg("train")
        .arg(&data)
        .arg("-o")
        .arg(&model)
        .args(["--trees", "8"])
        .assert()
        .success();
    model
}

#[test]
fn test_help_lists_commands() {
    homeauto()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_generate_writes_header() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.csv");
    homeauto()
        .args(["generate", "--rows", "20", "-o"])
        .arg(&data)
        .assert()
        .success();
    let text = std::fs::read_to_string(&data).unwrap();
    assert!(text.starts_with("mood,person_condition,time_of_day,at_home,is_holiday"));
    assert_eq!(text.lines().count(), 21);
}

#[test]
fn test_evaluate_report() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.csv");
    homeauto()
        .args(["generate", "--rows", "200", "-o"])
        .arg(&data)
        .assert()
        .success();
    homeauto()
        .arg("evaluate")
        .arg(&data)
        .args(["--trees", "5", "--samples", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Testing on 40 samples"))
        .stdout(predicate::str::contains("Device Control Accuracy:"))
        .stdout(predicate::str::contains("Accuracy for the 5 detailed samples:"));
}

#[test]
fn test_evaluate_json() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data.csv");
    homeauto()
        .args(["generate", "--rows", "100", "-o"])
        .arg(&data)
        .assert()
        .success();
    let output = homeauto()
        .arg("evaluate")
        .arg(&data)
        .args(["--trees", "3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["n_test"], 20);
    assert_eq!(report["device_accuracy"].as_array().map(Vec::len), Some(6));
}

#[test]
fn test_predict_numbered_actions() {
    let dir = TempDir::new().unwrap();
    let model = trained_bundle(&dir);
    homeauto()
        .arg("predict")
        .arg(&model)
        .args([
            "--mood", "happy", "--condition", "at_home", "--time", "evening", "--at-home", "1",
            "--holiday", "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. "))
        .stdout(predicate::str::contains("10. "));
}

#[test]
fn test_predict_unknown_mood_exit_code() {
    let dir = TempDir::new().unwrap();
    let model = trained_bundle(&dir);
    homeauto()
        .arg("predict")
        .arg(&model)
        .args(["--mood", "zzz-unknown", "--condition", "at_home", "--time", "evening"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("zzz-unknown"));
}

#[test]
fn test_predict_custom_falls_back() {
    let dir = TempDir::new().unwrap();
    let model = trained_bundle(&dir);
    let output = homeauto()
        .arg("predict")
        .arg(&model)
        .args([
            "--mood", "zzz-unknown", "--condition", "at_home", "--time", "evening", "--custom",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["substituted"][0][0], "mood");
    assert_eq!(body["actions"].as_array().map(Vec::len), Some(10));
}

#[test]
fn test_missing_model_exit_code() {
    homeauto()
        .args(["predict", "/nonexistent/models.bin", "--mood", "happy", "--condition", "out"])
        .args(["--time", "night"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_serve_corrupt_model_exit_code() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("models.bin");
    std::fs::write(&model, b"corrupt").unwrap();
    homeauto()
        .arg("serve")
        .arg(&model)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Model load failed"));
}
