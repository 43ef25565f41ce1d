use crate::common::launcher;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MIRROR: &str = "https://mirror.example/pants";

fn write_overrides(dir: &Path, file: &str, names: &[&str]) -> PathBuf {
    let entries: serde_json::Map<String, serde_json::Value> =
        names.iter().map(|name| (name.to_string(), format!("{MIRROR}/{name}").into())).collect();
    let path = dir.join(file);
    fs::write(&path, serde_json::json!({ "ptex": entries }).to_string()).unwrap();
    path
}

#[test]
fn test_resolve_from_overrides() {
    let temp = TempDir::new().unwrap();
    let overrides = write_overrides(temp.path(), "urls.json", &["pants.2.18.0-cp39-linux_x86_64.pex"]);

    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_URLS", &overrides)
        .args(["resolve", "2.18.0", "--platform", "linux_x86_64"])
        .assert()
        .success()
        .stdout(format!(
            "PANTS_PEX_URL={MIRROR}/pants.2.18.0-cp39-linux_x86_64.pex\nPANTS_VERSION=2.18.0\nPYTHON=cpython39\n"
        ));
}

#[test]
fn test_resolve_uses_runtime_for_version() {
    let temp = TempDir::new().unwrap();
    let overrides = write_overrides(temp.path(), "urls.json", &["pants.2.25.1-cp311-darwin_arm64.pex"]);

    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_URLS", &overrides)
        .args(["resolve", "2.25.1", "--platform", "darwin_arm64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PYTHON=cpython311"));
}

#[test]
fn test_later_override_document_wins() {
    let temp = TempDir::new().unwrap();
    let name = "pants.2.18.0-cp39-linux_x86_64.pex";
    let first = temp.path().join("first.json");
    fs::write(&first, serde_json::json!({"ptex": {name: "https://first.example/a.pex"}}).to_string()).unwrap();
    let second = write_overrides(temp.path(), "second.json", &[name]);
    let joined = std::env::join_paths([first, second]).unwrap();

    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_URLS", joined)
        .args(["resolve", "2.18.0", "--platform", "linux_x86_64"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("PANTS_PEX_URL={MIRROR}/{name}")));
}

#[test]
fn test_missing_override_is_an_error() {
    let temp = TempDir::new().unwrap();
    let overrides = write_overrides(temp.path(), "urls.json", &["pants.2.18.0-cp39-linux_x86_64.pex"]);

    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_URLS", &overrides)
        .args(["resolve", "2.19.0", "--platform", "linux_x86_64"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("pants.2.19.0-cp39-linux_x86_64.pex"))
        .stderr(predicate::str::contains("urls.json"));
}

#[test]
fn test_malformed_override_document() {
    let temp = TempDir::new().unwrap();
    let overrides = temp.path().join("urls.json");
    fs::write(&overrides, r#"{"urls": {}}"#).unwrap();

    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_URLS", &overrides)
        .args(["resolve", "2.18.0", "--platform", "linux_x86_64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ptex"));
}

#[test]
fn test_resolve_appends_to_env_file() {
    let temp = TempDir::new().unwrap();
    let overrides = write_overrides(temp.path(), "urls.json", &["pants.2.18.0-cp39-linux_x86_64.pex"]);
    let env_file = temp.path().join("github_env");
    fs::write(&env_file, "EXISTING=1\n").unwrap();

    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_URLS", &overrides)
        .args(["resolve", "2.18.0", "--platform", "linux_x86_64", "--env-file"])
        .arg(&env_file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&env_file).unwrap();
    assert!(content.starts_with("EXISTING=1\n"));
    assert!(content.contains("PANTS_VERSION=2.18.0\n"));
    assert!(content.ends_with("PYTHON=cpython39\n"));
}

#[test]
fn test_invalid_platform() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .args(["resolve", "2.18.0", "--platform", "linux"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("linux"));
}
