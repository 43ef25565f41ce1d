//! Configuration for the launcher.
//!
//! Configuration is layered:
//!
//! 1. Built-in defaults (60 second fetch timeout, official release endpoints)
//! 2. An optional TOML file, `$PANTS_LAUNCHER_CONFIG` or `<config dir>/pants-launcher/config.toml`
//! 3. Environment variables:
//!    - `PANTS_BOOTSTRAP_FETCH_TIMEOUT`: fetch timeout in seconds
//!    - `PANTS_BOOTSTRAP_URLS`: path list of artifact override documents
//!    - `PANTS_BOOTSTRAP_GITHUB_API_BEARER_TOKEN`: token for GitHub API calls
//!
//! The resolved [`LauncherConfig`] is passed explicitly to the components that need it;
//! nothing reads configuration from global state after startup.

pub mod global;

pub use global::{LauncherConfig, UpdateConfig};
