//! Bootstrap and self-update core of the Pants launcher.
//!
//! The launcher decides which Pants version a repository needs, which interpreter that
//! version runs on, and where to download it from. It also replaces its own binary with
//! newer releases.
//!
//! # Architecture Overview
//!
//! - **Resolution**: [`resolver::VersionResolver`] turns an explicit version, a source ref
//!   or "latest" into a [`resolver::ResolveInfo`]
//! - **Artifacts**: [`artifact::ArtifactLocator`] finds the executable for a version,
//!   runtime and platform, honouring local override documents
//! - **Self-update**: [`upgrade::SelfUpdater`] downloads, verifies and swaps the
//!   launcher binary, keeping a backup until the new one proves itself
//! - **Network access**: everything goes through the [`fetch::Fetcher`] trait, so tests
//!   substitute a stub
//!
//! # Core Modules
//!
//! - [`artifact`] - Artifact naming, override documents and probing
//! - [`cli`] - Command-line interface
//! - [`config`] - Launcher configuration file and environment overrides
//! - [`constants`] - Endpoints, environment variable names and fixed values
//! - [`core`] - Error types and user-facing error rendering
//! - [`fetch`] - The fetch capability and its HTTP implementation
//! - [`resolver`] - Version resolution and the tag to commit fallback chain
//! - [`upgrade`] - Launcher self-update
//! - [`utils`] - Platform detection
//! - [`version`] - Pants version parsing and launcher release tags
//!
//! # Example
//!
//! ```rust,no_run
//! use pants_launcher::artifact::ArtifactLocator;
//! use pants_launcher::fetch::HttpFetcher;
//! use pants_launcher::resolver::{VersionResolver, VersionSpec};
//! use pants_launcher::utils::PlatformTag;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(60))?);
//! let locator = ArtifactLocator::new(fetcher.clone());
//! let resolver = VersionResolver::new(fetcher, locator);
//!
//! let info = resolver.resolve(&VersionSpec::Explicit("2.18.0".into()), &PlatformTag::current()).await?;
//! info.write_env(&mut std::io::stdout())?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fetch;
pub mod resolver;
pub mod upgrade;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
