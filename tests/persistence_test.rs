#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

mod common;
use common::*;

/// Reservation state and the id sequence survive a process restart.
#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let catalog = write_catalog();

    // 1. First run: create a reservation
    let commands1 = write_commands(&[create_command("alice", "2025-11-10", "2025-11-15")]);
    let mut cmd1 = Command::new(cargo_bin!("bookflow"));
    cmd1.arg(commands1.path())
        .arg("--rooms")
        .arg(catalog.path())
        .arg("--db-path")
        .arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains(r#""status":"PENDING""#));

    // 2. Second run against the same DB: the reservation is still there and
    // a new one gets the next id
    let commands2 = write_commands(&[
        r#"{"op":"get","principal":{"user":"alice"},"id":1}"#.to_string(),
        create_command("alice", "2025-12-01", "2025-12-05"),
        r#"{"op":"cancel","principal":{"user":"alice"},"id":1}"#.to_string(),
    ]);
    let mut cmd2 = Command::new(cargo_bin!("bookflow"));
    cmd2.arg(commands2.path())
        .arg("--rooms")
        .arg(catalog.path())
        .arg("--db-path")
        .arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains(r#""id":1"#));
    assert!(stdout2.contains(r#""id":2"#));
    assert!(stdout2.contains(r#""status":"CANCELLED""#));
}
