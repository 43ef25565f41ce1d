//! Shared helpers for integration tests.

use assert_cmd::Command;
use std::path::Path;

/// The launcher binary with an environment isolated from the developer's machine.
///
/// The config file points into `dir`, so a real user config is never read.
pub fn launcher(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pants-launcher").unwrap();
    cmd.current_dir(dir)
        .env("PANTS_LAUNCHER_CONFIG", dir.join("missing-config.toml"))
        .env_remove("PANTS_BOOTSTRAP_URLS")
        .env_remove("PANTS_BOOTSTRAP_FETCH_TIMEOUT")
        .env_remove("PANTS_BOOTSTRAP_GITHUB_API_BEARER_TOKEN")
        .env_remove("PANTS_LAUNCHER_BOOT")
        .env_remove("RUST_LOG");
    cmd
}
