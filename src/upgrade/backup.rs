use crate::core::LauncherError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Manages the backup of the launcher executable during a self-update.
///
/// The backup is made by *renaming* the executable to a sibling `<name>.bak`, never by
/// copying or deleting it: renaming a running executable is legal on every supported
/// platform, while deleting or overwriting it is not on Windows. The rename is also
/// atomic, so an interruption leaves either the original in place or the original at
/// the backup path.
///
/// # Lifecycle
///
/// 1. [`move_aside`](Self::move_aside) before the new binary is moved in
/// 2. [`cleanup_backup`](Self::cleanup_backup) once the new binary reported the expected
///    version
/// 3. [`restore_backup`](Self::restore_backup) when the user asks for a rollback
///
/// # Examples
///
/// ```rust,no_run
/// use pants_launcher::upgrade::backup::BackupManager;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let manager = BackupManager::new(PathBuf::from("/usr/local/bin/pants-launcher"));
/// assert_eq!(manager.backup_path(), PathBuf::from("/usr/local/bin/pants-launcher.bak"));
///
/// manager.move_aside().await?;
/// // ... move the new binary into place and verify it ...
/// manager.cleanup_backup().await?;
/// # Ok(())
/// # }
/// ```
pub struct BackupManager {
    original_path: PathBuf,
    backup_path: PathBuf,
}

impl BackupManager {
    /// Create a backup manager for the given executable.
    ///
    /// The backup lives next to the executable as `<file name>.bak`.
    pub fn new(executable_path: PathBuf) -> Self {
        let mut backup_path = executable_path.clone();
        backup_path.set_file_name(format!(
            "{}.bak",
            executable_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        Self {
            original_path: executable_path,
            backup_path,
        }
    }

    /// Rename the executable to the backup path.
    ///
    /// A stale backup left by an earlier interrupted update is replaced.
    ///
    /// # Errors
    ///
    /// Fails if the executable does not exist or cannot be renamed. In either case the
    /// executable is untouched.
    pub async fn move_aside(&self) -> Result<()> {
        if !self.original_path.exists() {
            return Err(self.fs_error("move executable aside", &self.original_path, "file does not exist"));
        }

        if self.backup_path.exists() {
            warn!("Replacing stale backup at {:?}", self.backup_path);
            fs::remove_file(&self.backup_path).await.context("Failed to remove stale backup")?;
        }

        info!("Moving {:?} aside to {:?}", self.original_path, self.backup_path);
        fs::rename(&self.original_path, &self.backup_path)
            .await
            .map_err(|e| self.fs_error("move executable aside", &self.original_path, e))?;
        Ok(())
    }

    /// Put the backup back in place of the executable.
    ///
    /// Retries a few times since Windows may hold the executable briefly after it exits.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::BackupNotFound`] if there is no backup, or the last
    /// filesystem error after all attempts failed.
    pub async fn restore_backup(&self) -> Result<()> {
        if !self.backup_path.exists() {
            return Err(LauncherError::BackupNotFound {
                path: self.backup_path.clone(),
            }
            .into());
        }

        warn!("Restoring from backup at {:?}", self.backup_path);

        let mut attempts = 0;
        const MAX_ATTEMPTS: u32 = 3;

        loop {
            match self.attempt_restore().await {
                Ok(()) => {
                    info!("Successfully restored from backup");
                    return Ok(());
                }
                Err(e) if attempts < MAX_ATTEMPTS - 1 => {
                    warn!("Restore attempt {} failed: {}. Retrying...", attempts + 1, e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt_restore(&self) -> Result<()> {
        if self.original_path.exists() {
            fs::remove_file(&self.original_path)
                .await
                .context("Failed to remove the installed binary")?;
        }

        fs::rename(&self.backup_path, &self.original_path)
            .await
            .map_err(|e| self.fs_error("restore backup", &self.backup_path, e))?;
        Ok(())
    }

    /// Delete the backup if it exists.
    ///
    /// # Errors
    ///
    /// Fails if the backup exists but cannot be removed.
    pub async fn cleanup_backup(&self) -> Result<()> {
        if self.backup_path.exists() {
            debug!("Cleaning up backup at {:?}", self.backup_path);
            fs::remove_file(&self.backup_path).await.context("Failed to remove backup")?;
        }
        Ok(())
    }

    /// Whether a backup file exists.
    pub fn backup_exists(&self) -> bool {
        self.backup_path.exists()
    }

    /// Path of the backup file.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    fn fs_error(&self, operation: &str, path: &Path, reason: impl ToString) -> anyhow::Error {
        LauncherError::FileSystemError {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
        .into()
    }
}
