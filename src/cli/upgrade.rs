use crate::config::LauncherConfig;
use crate::fetch::HttpFetcher;
use crate::upgrade::{BackupManager, SelfUpdater, UpdateOutcome};
use crate::utils::PlatformTag;
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use semver::Version;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Replace the launcher binary with another release.
///
/// Without a version, installs the newest production release if it is newer than the
/// running one. With a version, installs exactly that release, even if it is older.
///
/// The new binary is downloaded next to the executable and its SHA-256 digest checked
/// before anything is replaced. The previous binary is kept as `<name>.bak` until the
/// new one has reported the expected version.
///
/// # Examples
///
/// ```bash
/// pants-launcher self-update
/// pants-launcher self-update 0.12.1
/// ```
#[derive(Parser, Debug)]
pub struct SelfUpdateCommand {
    /// Release to install, e.g. 0.12.1
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Executable to update instead of the running one
    #[arg(long, value_name = "PATH", hide = true)]
    pub exe: Option<PathBuf>,

    /// Version to assume for the executable instead of this build's
    #[arg(long, value_name = "VERSION", hide = true)]
    pub current_version: Option<Version>,
}

impl SelfUpdateCommand {
    pub async fn execute(self) -> Result<()> {
        let config = LauncherConfig::load().await?;
        let executable = target_executable(self.exe)?;
        let current_version = match self.current_version {
            Some(version) => version,
            None => Version::parse(env!("CARGO_PKG_VERSION")).context("Invalid package version")?,
        };

        let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout())?);
        let updater = SelfUpdater::new(fetcher, executable, current_version, PlatformTag::current())
            .with_release_source(&config.update.api_base_url, config.github_api_bearer_token.clone());

        let target = match &self.version {
            Some(version) => format!("version {version}"),
            None => "the latest version".to_string(),
        };
        println!("{}", format!("Updating {} to {target}...", updater.executable().display()).cyan());

        match updater.update(self.version.as_deref()).await? {
            UpdateOutcome::NoUpdate {
                current,
                ..
            } => {
                println!("{}", format!("Already on the latest version ({current})").green());
            }
            UpdateOutcome::Updated {
                version,
                backup_removed,
            } => {
                println!("{}", format!("Successfully updated the launcher to {version}").green());
                if !backup_removed {
                    println!(
                        "{}",
                        format!(
                            "The previous binary could not be removed from {}.bak",
                            updater.executable().display()
                        )
                        .yellow()
                    );
                }
            }
        }
        Ok(())
    }
}

/// Restore the binary that a self-update set aside.
#[derive(Parser, Debug)]
pub struct RollbackCommand {
    /// Executable to restore instead of the running one
    #[arg(long, value_name = "PATH", hide = true)]
    pub exe: Option<PathBuf>,
}

impl RollbackCommand {
    pub async fn execute(self) -> Result<()> {
        let executable = target_executable(self.exe)?;
        println!("{}", "Rolling back to previous version...".yellow());

        let backup_manager = BackupManager::new(executable);
        backup_manager.restore_backup().await?;

        println!("{}", "Successfully rolled back to previous version".green());
        Ok(())
    }
}

fn target_executable(exe: Option<PathBuf>) -> Result<PathBuf> {
    match exe {
        Some(path) => Ok(path),
        None => env::current_exe().context("Failed to get current executable path"),
    }
}
