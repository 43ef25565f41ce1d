use super::backup::BackupManager;
use super::release::{Release, ReleaseSource};
use super::verification::{ChecksumVerifier, Verification};
use crate::constants::{REPORT_VERSION_ENV, REPORT_VERSION_VALUE};
use crate::core::LauncherError;
use crate::fetch::{Fetcher, Headers};
use crate::utils::PlatformTag;
use crate::version::comparison::is_newer;
use anyhow::{Context, Result};
use semver::Version;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// What a self-update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No release newer than the running version exists.
    NoUpdate {
        /// The running version
        current: Version,
        /// The newest compatible production release, if any
        latest: Option<Version>,
    },
    /// A new binary was installed and reported the expected version.
    Updated {
        /// The installed version
        version: Version,
        /// Whether the backup of the previous binary was deleted
        backup_removed: bool,
    },
}

/// Replaces the launcher executable with another release.
///
/// The update is a single sequential attempt:
///
/// 1. Pick the target [`Release`] (explicit version, or the newest production release)
/// 2. Fetch and parse the expected SHA-256 digest
/// 3. Download the binary into a private directory next to the executable
/// 4. Verify the digest of the file on disk; on mismatch stop, keeping the download for
///    inspection and leaving the executable untouched
/// 5. Mark the download executable
/// 6. Rename the executable to its backup path, then rename the download into place
/// 7. Run the new binary with `PANTS_LAUNCHER_BOOT=version` and compare its output to the
///    release version
/// 8. Delete the backup; failing to do so only warns
///
/// If the rename in step 6 fails the previous binary is moved back. Every later failure
/// leaves the previous binary at the backup path and names that path in the error. Running two updates of the same executable at once is
/// not guarded against.
///
/// # Examples
///
/// ```rust,no_run
/// use pants_launcher::fetch::HttpFetcher;
/// use pants_launcher::upgrade::{SelfUpdater, UpdateOutcome};
/// use pants_launcher::utils::PlatformTag;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(60))?);
/// let updater = SelfUpdater::new(
///     fetcher,
///     std::env::current_exe()?,
///     semver::Version::parse(env!("CARGO_PKG_VERSION"))?,
///     PlatformTag::current(),
/// );
/// match updater.update(None).await? {
///     UpdateOutcome::NoUpdate { .. } => println!("Already up to date"),
///     UpdateOutcome::Updated { version, .. } => println!("Updated to {version}"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SelfUpdater {
    fetcher: Arc<dyn Fetcher>,
    releases: ReleaseSource,
    executable: PathBuf,
    current_version: Version,
    platform: PlatformTag,
}

impl SelfUpdater {
    /// Updater for `executable`, currently at `current_version`.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        executable: PathBuf,
        current_version: Version,
        platform: PlatformTag,
    ) -> Self {
        Self {
            releases: ReleaseSource::new(fetcher.clone()),
            fetcher,
            executable,
            current_version,
            platform,
        }
    }

    /// Use another release API base and token.
    #[must_use]
    pub fn with_release_source(mut self, api_base_url: &str, github_token: Option<String>) -> Self {
        self.releases = ReleaseSource::new(self.fetcher.clone())
            .with_api_base_url(api_base_url)
            .with_github_token(github_token);
        self
    }

    /// Executable being updated.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Update to `version`, or to the newest production release when `None`.
    ///
    /// An explicit version is always installed, even if it is not newer. The newest
    /// release is only installed if it is newer than the running version.
    ///
    /// # Errors
    ///
    /// Any failure of the update protocol; see the type documentation.
    pub async fn update(&self, version: Option<&str>) -> Result<UpdateOutcome> {
        let release = match version {
            Some(version) => self.releases.get_release(version, &self.platform).await?,
            None => {
                let latest = self.releases.find_latest_production_release(&self.platform).await?;
                match latest {
                    Some(release) if is_newer(&release.version, &self.current_version) => release,
                    other => {
                        info!("No new releases of the launcher were found");
                        return Ok(UpdateOutcome::NoUpdate {
                            current: self.current_version.clone(),
                            latest: other.map(|release| release.version),
                        });
                    }
                }
            }
        };

        info!("Updating launcher {} -> {}", self.current_version, release.version);
        self.install_release(&release).await
    }

    /// Run steps 2 to 8 for `release`.
    ///
    /// # Errors
    ///
    /// Any failure of the update protocol; see the type documentation.
    pub async fn install_release(&self, release: &Release) -> Result<UpdateOutcome> {
        let expected = self.fetch_expected_checksum(release).await?;

        let parent = self.executable.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let download_dir = tempfile::Builder::new()
            .prefix(".pants-launcher-update-")
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create a download directory in {}", parent.display()))?;
        let download = download_dir.path().join(&release.file_name);
        self.download(release, &download).await?;

        if let Verification::Mismatch {
            actual,
        } = ChecksumVerifier::verify_checksum(&download, &expected).await?
        {
            let kept = download_dir.keep();
            return Err(LauncherError::ChecksumMismatch {
                url: release.binary_url.clone(),
                checksum_url: release.checksum_url.clone(),
                expected,
                actual,
                download: kept.join(&release.file_name),
            }
            .into());
        }

        mark_executable(&download).await?;

        let backup = BackupManager::new(self.executable.clone());
        swap_into_place(&backup, &download, &self.executable).await?;
        drop(download_dir);

        let reported = match report_version(&self.executable).await {
            Ok(reported) => reported,
            Err(e) => {
                warn!("A backup is saved in {}", backup.backup_path().display());
                return Err(LauncherError::VersionReportFailed {
                    expected: release.version.to_string(),
                    path: self.executable.clone(),
                    backup: backup.backup_path().to_path_buf(),
                    reason: format!("{e:#}"),
                }
                .into());
            }
        };

        let reported_version = Version::parse(reported.trim_start_matches('v')).ok();
        if reported_version.as_ref() != Some(&release.version) {
            warn!("A backup is saved in {}", backup.backup_path().display());
            return Err(LauncherError::VerificationFailed {
                expected: release.version.to_string(),
                reported,
                path: self.executable.clone(),
                backup: backup.backup_path().to_path_buf(),
            }
            .into());
        }

        info!("Successfully installed launcher {} to {}", release.version, self.executable.display());
        let backup_removed = match backup.cleanup_backup().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove old version of the launcher at {}: {e:#}", backup.backup_path().display());
                false
            }
        };

        Ok(UpdateOutcome::Updated {
            version: release.version.clone(),
            backup_removed,
        })
    }

    async fn fetch_expected_checksum(&self, release: &Release) -> Result<String> {
        debug!("Fetching checksum from {}", release.checksum_url);
        let content = self
            .fetcher
            .fetch_text(&release.checksum_url, &Headers::new())
            .await
            .with_context(|| format!("Failed to fetch the checksum for launcher {}", release.version))?;
        Ok(ChecksumVerifier::parse_checksum_file(&release.checksum_url, &content)?)
    }

    async fn download(&self, release: &Release, destination: &Path) -> Result<()> {
        debug!("Downloading {} to {}", release.binary_url, destination.display());
        let mut file = fs::File::create(destination)
            .await
            .with_context(|| format!("Failed to create {}", destination.display()))?;
        self.fetcher
            .fetch_to_writer(&release.binary_url, &Headers::new(), &mut file)
            .await
            .with_context(|| format!("Failed to download launcher {}", release.version))?;
        file.sync_all().await.with_context(|| format!("Failed to write {}", destination.display()))?;
        Ok(())
    }
}

/// Set `executable` aside as the backup and rename `download` into its place.
///
/// If the rename fails the backup is moved back, so the executable is only missing if
/// that also fails.
pub(super) async fn swap_into_place(backup: &BackupManager, download: &Path, executable: &Path) -> Result<()> {
    backup.move_aside().await?;
    let Err(e) = fs::rename(download, executable).await else {
        return Ok(());
    };

    warn!("Failed to move {} into place: {e}", download.display());
    let restored = match backup.restore_backup().await {
        Ok(()) => true,
        Err(restore_error) => {
            warn!("A backup is saved in {}: {restore_error:#}", backup.backup_path().display());
            false
        }
    };
    Err(LauncherError::InstallFailed {
        path: executable.to_path_buf(),
        backup: backup.backup_path().to_path_buf(),
        reason: e.to_string(),
        restored,
    }
    .into())
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Ask a launcher binary for its version.
///
/// Runs `executable` with `PANTS_LAUNCHER_BOOT=version` and returns its trimmed stdout.
///
/// # Errors
///
/// Fails if the binary cannot be run or exits unsuccessfully.
pub async fn report_version(executable: &Path) -> Result<String> {
    const MAX_ATTEMPTS: u32 = 3;

    let mut attempts = 0;
    let output = loop {
        match Command::new(executable).env(REPORT_VERSION_ENV, REPORT_VERSION_VALUE).output().await {
            // A process forked elsewhere may still hold the freshly written file open.
            Err(e) if e.kind() == ErrorKind::ExecutableFileBusy && attempts < MAX_ATTEMPTS - 1 => {
                debug!("{} is busy, retrying", executable.display());
                tokio::time::sleep(Duration::from_millis(100)).await;
                attempts += 1;
            }
            result => break result.with_context(|| format!("Failed to run {}", executable.display()))?,
        }
    };

    if !output.status.success() {
        anyhow::bail!(
            "{} exited with {}: {}",
            executable.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
