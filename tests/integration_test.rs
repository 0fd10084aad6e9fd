//! Integration tests for the point-ledger CLI.
//!
//! These tests run the actual binary against command files written to a
//! temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Write `contents` to a fresh temp file and return its directory and path
fn write_input(contents: &str) -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("commands.csv");
    fs::write(&path, contents).unwrap();
    (dir, path.to_string_lossy().into_owned())
}

const SCENARIO: &str = "type,user,amount
charge,1,500
charge,1,300
use,1,200
use,1,1000
charge,2,40
";

#[test]
fn test_balances_output() {
    let (_dir, path) = write_input(SCENARIO);

    Command::cargo_bin("point-ledger")
        .unwrap()
        .arg(&path)
        .assert()
        .success()
        .stdout("user,points\n1,600\n2,40\n");
}

#[test]
fn test_history_output() {
    let (_dir, path) = write_input(SCENARIO);

    Command::cargo_bin("point-ledger")
        .unwrap()
        .arg(&path)
        .arg("--history")
        .assert()
        .success()
        .stdout("id,user,type,amount\n1,1,CHARGE,500\n2,1,CHARGE,300\n3,1,USE,200\n4,2,CHARGE,40\n");
}

#[test]
fn test_invalid_rows_are_skipped() {
    let (_dir, path) = write_input(
        "type,user,amount
charge,1,-5
bogus,1,5
charge,x,5
charge,1,5
",
    );

    Command::cargo_bin("point-ledger")
        .unwrap()
        .arg(&path)
        .assert()
        .success()
        .stdout("user,points\n1,5\n");
}

#[test]
fn test_missing_argument() {
    Command::cargo_bin("point-ledger")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file argument"));
}

#[test]
fn test_nonexistent_file() {
    Command::cargo_bin("point-ledger")
        .unwrap()
        .arg("does_not_exist.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_invalid_lock_timeout_env() {
    let (_dir, path) = write_input(SCENARIO);

    Command::cargo_bin("point-ledger")
        .unwrap()
        .arg(&path)
        .env("POINT_LEDGER_LOCK_TIMEOUT_MS", "forever")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_lock_timeout_env_accepted() {
    let (_dir, path) = write_input(SCENARIO);

    Command::cargo_bin("point-ledger")
        .unwrap()
        .arg(&path)
        .env("POINT_LEDGER_LOCK_TIMEOUT_MS", "500")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("user,points\n1,600"));
}
