use crate::common::launcher;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_help() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("self-update"))
        .stdout(predicate::str::contains("rollback"));
}

#[test]
fn test_reports_version_when_booted_for_it() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .env("PANTS_LAUNCHER_BOOT", "version")
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_platform() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .arg("platform")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[a-z0-9]+_[a-z0-9_]+\n$").unwrap());
}

#[test]
fn test_partial_version_is_rejected() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .args(["resolve", "2.18"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("2.18"))
        .stderr(predicate::str::contains("2.18.0"));
}

#[test]
fn test_malformed_version_is_rejected() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .args(["resolve", "not-a-version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-a-version"));
}

#[test]
fn test_invalid_fetch_timeout() {
    let temp = TempDir::new().unwrap();
    launcher(temp.path())
        .env("PANTS_BOOTSTRAP_FETCH_TIMEOUT", "soon")
        .args(["resolve", "2.18.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PANTS_BOOTSTRAP_FETCH_TIMEOUT"));
}

#[test]
fn test_unreadable_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "fetch_timeout_secs = \"sixty\"\n").unwrap();

    launcher(temp.path())
        .env("PANTS_LAUNCHER_CONFIG", &config)
        .args(["resolve", "2.18.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn test_self_update_without_newer_release() {
    let temp = TempDir::new().unwrap();
    let platform_output = launcher(temp.path()).arg("platform").output().unwrap();
    let platform = String::from_utf8(platform_output.stdout).unwrap().trim().to_string();
    let asset = format!("pants-launcher-{platform}");

    let mut server = mockito::Server::new();
    let releases = server
        .mock("GET", "/releases")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!([{
                "tag_name": "v0.1.0",
                "draft": false,
                "prerelease": false,
                "assets": [
                    {"name": asset, "browser_download_url": format!("{}/download/{asset}", server.url())},
                    {"name": format!("{asset}.sha256"), "browser_download_url": format!("{}/download/{asset}.sha256", server.url())},
                ]
            }])
            .to_string(),
        )
        .expect(1)
        .create();

    let config = temp.path().join("config.toml");
    std::fs::write(&config, format!("[update]\napi_base_url = \"{}\"\n", server.url())).unwrap();
    let exe = temp.path().join("pants-launcher");
    std::fs::write(&exe, b"current").unwrap();

    launcher(temp.path())
        .env("PANTS_LAUNCHER_CONFIG", &config)
        .env("NO_PROXY", "127.0.0.1,localhost")
        .args(["self-update", "--current-version", "0.2.0", "--exe"])
        .arg(&exe)
        .assert()
        .success()
        .stdout(predicate::str::contains("Already on the latest version (0.2.0)"));

    releases.assert();
    assert_eq!(std::fs::read(&exe).unwrap(), b"current");
    assert!(!temp.path().join("pants-launcher.bak").exists());
}
