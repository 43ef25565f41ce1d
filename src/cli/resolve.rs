use crate::artifact::{ArtifactLocator, ArtifactOverrides};
use crate::config::LauncherConfig;
use crate::fetch::HttpFetcher;
use crate::resolver::{ResolveInfo, VersionResolver, VersionSpec};
use crate::utils::PlatformTag;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve a Pants version to the interpreter and install location it needs.
///
/// Prints the installer environment as `KEY=value` lines:
///
/// ```text
/// PANTS_PEX_URL=https://github.com/pantsbuild/pants/releases/download/release_2.18.0/pants.2.18.0-cp39-linux_x86_64.pex
/// PANTS_VERSION=2.18.0
/// PYTHON=cpython39
/// ```
///
/// Without a version or `--sha` the latest stable release is resolved.
///
/// # Examples
///
/// ```bash
/// pants-launcher resolve 2.18.0
/// pants-launcher resolve --sha 1a2b3c4d...
/// pants-launcher resolve --platform darwin_arm64
/// pants-launcher resolve 2.18.0 --env-file "$GITHUB_ENV"
/// ```
#[derive(Parser, Debug)]
pub struct ResolveCommand {
    /// Pants version, e.g. 2.18.0
    #[arg(value_name = "VERSION", conflicts_with = "sha")]
    pub version: Option<String>,

    /// Commit id or tag in the Pants repository to install a source build of
    #[arg(long, value_name = "REF")]
    pub sha: Option<String>,

    /// Platform tag to resolve for instead of the current one, e.g. linux_arm64
    #[arg(long, value_name = "TAG")]
    pub platform: Option<String>,

    /// Append the environment to this file instead of printing it
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

impl ResolveCommand {
    /// The version spec these arguments select.
    #[must_use]
    pub fn spec(&self) -> VersionSpec {
        match (&self.version, &self.sha) {
            (Some(version), _) => VersionSpec::Explicit(version.clone()),
            (None, Some(reference)) => VersionSpec::SourceRef(reference.clone()),
            (None, None) => VersionSpec::Latest,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let platform = match &self.platform {
            Some(tag) => tag.parse::<PlatformTag>()?,
            None => PlatformTag::current(),
        };
        let config = LauncherConfig::load().await?;
        debug!("Using fetch timeout of {}s", config.fetch_timeout_secs);

        let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout())?);
        let overrides = ArtifactOverrides::load(&config.artifact_overrides).await?;
        if let Some(overrides) = &overrides {
            info!("Using {} artifact override(s)", overrides.len());
        }
        let locator = ArtifactLocator::new(fetcher.clone()).with_overrides(overrides);
        let resolver =
            VersionResolver::new(fetcher, locator).with_github_token(config.github_api_bearer_token.clone());

        let resolved = resolver.resolve(&self.spec(), &platform).await?;
        let scheme = if resolved.is_legacy() { "legacy index" } else { "artifact" };
        info!("Resolved Pants {} for {} from the {} scheme", resolved.selected_version(), platform, scheme);

        match &self.env_file {
            Some(path) => append_env(&resolved, path),
            None => {
                let stdout = std::io::stdout();
                resolved.write_env(&mut stdout.lock()).context("Failed to write to stdout")
            }
        }
    }
}

fn append_env(resolved: &ResolveInfo, path: &Path) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open env file: {}", path.display()))?;
    resolved.write_env(&mut file).with_context(|| format!("Failed to write env file: {}", path.display()))?;
    file.flush()?;
    Ok(())
}
