use crate::common::launcher;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_rollback_restores_backup() {
    let temp = TempDir::new().unwrap();
    let exe = temp.path().join("pants-launcher");
    fs::write(&exe, b"broken").unwrap();
    fs::write(temp.path().join("pants-launcher.bak"), b"previous").unwrap();

    launcher(temp.path())
        .args(["rollback", "--exe"])
        .arg(&exe)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully rolled back"));

    assert_eq!(fs::read(&exe).unwrap(), b"previous");
    assert!(!temp.path().join("pants-launcher.bak").exists());
}

#[test]
fn test_rollback_without_backup() {
    let temp = TempDir::new().unwrap();
    let exe = temp.path().join("pants-launcher");
    fs::write(&exe, b"current").unwrap();

    launcher(temp.path())
        .args(["rollback", "--exe"])
        .arg(&exe)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backup found"));

    assert_eq!(fs::read(&exe).unwrap(), b"current");
}
