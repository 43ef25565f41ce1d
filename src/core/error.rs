//! Error handling for the launcher
//!
//! This module provides the error taxonomy and user-facing error reporting for the
//! launcher core. The error system is designed around two principles:
//! 1. **Strongly-typed errors** so callers (and tests) can tell failure modes apart
//! 2. **Actionable messages** telling users what failed and where to get help or
//!    find recovery artifacts
//!
//! # Error Categories
//!
//! - **Input errors**: [`LauncherError::InvalidVersion`], [`LauncherError::VersionPrecision`]
//! - **Upstream contract violations**: [`LauncherError::UnexpectedReleaseTag`]
//! - **Exhausted fallback chains**: [`LauncherError::CommitNotFound`],
//!   [`LauncherError::ArtifactNotFound`], [`LauncherError::LatestReleaseUnavailable`]
//! - **Integrity failures**: [`LauncherError::ChecksumMismatch`]
//! - **Post-swap failures**: [`LauncherError::InstallFailed`],
//!   [`LauncherError::VerificationFailed`], [`LauncherError::VersionReportFailed`]
//!
//! Transient fetch failures inside a fallback chain are *not* represented here; they are
//! [`FetchError`](crate::fetch::FetchError)s that the chain recovers from locally.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pants_launcher::core::{LauncherError, user_friendly_error};
//!
//! let error = anyhow::Error::from(LauncherError::VersionPrecision {
//!     version: "2.18".to_string(),
//! });
//! user_friendly_error(error).display();
//! ```

use crate::constants::{HELP_URL, ISSUES_URL};
use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for fatal launcher conditions.
///
/// Every variant is a condition that terminates the current resolution or update. The
/// fields carry the context needed to render an actionable message; in particular the
/// post-swap variants always carry the backup location.
#[derive(Error, Debug, Clone)]
pub enum LauncherError {
    /// A version string could not be parsed at all.
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// The rejected input
        version: String,
        /// Why it was rejected
        reason: String,
    },

    /// A version lacks the patch component.
    #[error("Version '{version}' is not fully specified; a major.minor.patch version is required")]
    VersionPrecision {
        /// The rejected input
        version: String,
    },

    /// The "latest" release lookup could not be performed.
    #[error("Couldn't get the latest release by fetching {url}")]
    LatestReleaseUnavailable {
        /// URL that was fetched
        url: String,
        /// Underlying fetch failure
        reason: String,
    },

    /// The release tagged "latest" does not follow the `release_<version>` convention.
    #[error("Expected the release tagged \"latest\" to have the \"release_\" prefix. Got \"{tag}\"")]
    UnexpectedReleaseTag {
        /// The tag the upstream service returned
        tag: String,
    },

    /// No fallback tier produced a commit for a source reference.
    #[error("Could not resolve '{reference}' to a commit")]
    CommitNotFound {
        /// The tag or reference being resolved
        reference: String,
        /// What each tier reported
        attempts: Vec<String>,
    },

    /// The version file at a commit could not be read.
    #[error("Could not determine the version at commit {commit}")]
    CommitVersionUnavailable {
        /// Commit whose version file was fetched
        commit: String,
        /// Underlying failure
        reason: String,
    },

    /// No runtime candidate yielded a reachable artifact.
    #[error("No artifact for version {version} is available for platform {platform}")]
    ArtifactNotFound {
        /// Requested version
        version: String,
        /// Host platform tag
        platform: String,
        /// Artifact URLs that were tried, in order
        tried: Vec<String>,
        /// Error reported by the last probe
        last_error: String,
    },

    /// An override table is present but does not name the artifact.
    #[error("Artifact '{name}' is not listed in the artifact overrides")]
    ArtifactNotInOverrides {
        /// Artifact name looked up
        name: String,
        /// Override documents that were loaded
        sources: Vec<PathBuf>,
    },

    /// A runtime identifier this launcher has no interpreter mapping for.
    #[error("This version of the launcher does not support runtime '{runtime}'")]
    UnsupportedRuntime {
        /// The runtime abbreviation
        runtime: String,
    },

    /// A requested launcher release does not exist or has no asset for this platform.
    #[error("Failed to find release for version {version}: {reason}")]
    ReleaseNotFound {
        /// Requested launcher version
        version: String,
        /// Why lookup failed
        reason: String,
    },

    /// The checksum companion file is not in `<digest> <filename>` form.
    #[error("Malformed checksum file at {url}")]
    MalformedChecksum {
        /// URL of the checksum file
        url: String,
        /// The content that was received
        content: String,
    },

    /// The downloaded binary does not match its published digest.
    #[error("The binary downloaded from {url} is invalid")]
    ChecksumMismatch {
        /// Binary download URL
        url: String,
        /// Checksum companion URL
        checksum_url: String,
        /// Digest published upstream
        expected: String,
        /// Digest of the downloaded file
        actual: String,
        /// Where the rejected download was kept
        download: PathBuf,
    },

    /// Moving the new binary into place failed after the old one was set aside.
    #[error("Failed to install the new binary at {path}: {reason}")]
    InstallFailed {
        /// Executable path
        path: PathBuf,
        /// Backup path of the previous executable
        backup: PathBuf,
        /// Underlying failure
        reason: String,
        /// Whether the previous executable was moved back to `path`
        restored: bool,
    },

    /// The installed binary could not be asked for its version.
    #[error("Failed to verify installation of version {expected} at {path}: {reason}")]
    VersionReportFailed {
        /// Version that was installed
        expected: String,
        /// Executable path
        path: PathBuf,
        /// Where the previous executable now lives
        backup: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// The installed binary reports a different version than the release.
    #[error("Installed version {expected} to {path} but the installation reports version {reported}")]
    VerificationFailed {
        /// Version that was installed
        expected: String,
        /// Version the binary reported
        reported: String,
        /// Executable path
        path: PathBuf,
        /// Where the previous executable now lives
        backup: PathBuf,
    },

    /// No backup is available to roll back to.
    #[error("No backup found at {path}")]
    BackupNotFound {
        /// Expected backup location
        path: PathBuf,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// File system operation failed.
    #[error("File system error: {operation} ({path})")]
    FileSystemError {
        /// What was being done
        operation: String,
        /// Path involved
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper carrying user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying launcher error
    pub error: LauncherError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: LauncherError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for display.
///
/// Known [`LauncherError`]s anywhere in the chain get tailored details and suggestions;
/// anything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(launcher_error) = error.chain().find_map(|e| e.downcast_ref::<LauncherError>()) {
        return create_error_context(launcher_error.clone());
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(LauncherError::Other {
        message,
    })
    .with_suggestion(format!("If this is unexpected, please reach out: {HELP_URL}"))
}

fn create_error_context(error: LauncherError) -> ErrorContext {
    match &error {
        LauncherError::InvalidVersion {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Versions look like 2.18.0, 2.19.0rc1 or 2.20.0.dev3"),
        LauncherError::VersionPrecision {
            version,
        } => {
            let suggestion = format!("Add a patch component, for example '{version}.0'");
            ErrorContext::new(error.clone())
                .with_details("Partial versions are not expanded automatically, since that hides typos")
                .with_suggestion(suggestion)
        }
        LauncherError::LatestReleaseUnavailable {
            reason,
            ..
        } => ErrorContext::new(error.clone()).with_details(reason.clone()).with_suggestion(
            format!("If this is unexpected (e.g. GitHub isn't down), please reach out: {HELP_URL}"),
        ),
        LauncherError::UnexpectedReleaseTag {
            ..
        } => ErrorContext::new(error.clone())
            .with_details("The upstream release naming changed; retrying will not help")
            .with_suggestion(format!("Please reach out at {HELP_URL} or file an issue: {ISSUES_URL}")),
        LauncherError::CommitNotFound {
            attempts,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(attempts.join("\n"))
            .with_suggestion("Check the tag name, or set a bearer token if the GitHub API is rate limited"),
        LauncherError::CommitVersionUnavailable {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("Check that the commit exists in the upstream repository"),
        LauncherError::ArtifactNotFound {
            tried,
            last_error,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(format!("Tried:\n  {}\nLast error: {last_error}", tried.join("\n  ")))
            .with_suggestion(format!(
                "This platform may not be supported by that version. Get help at {HELP_URL}"
            )),
        LauncherError::ArtifactNotInOverrides {
            sources,
            ..
        } => {
            let files: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
            ErrorContext::new(error.clone())
                .with_details(format!("Override documents: {}", files.join(", ")))
                .with_suggestion("Add the artifact to an override document or unset the override")
        }
        LauncherError::UnsupportedRuntime {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Update the launcher with `pants-launcher self-update`"),
        LauncherError::ReleaseNotFound {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check the version number; release tags look like v0.12.0"),
        LauncherError::MalformedChecksum {
            content,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(format!("Received: {content:?}"))
            .with_suggestion(format!("Please reach out: {HELP_URL}")),
        LauncherError::ChecksumMismatch {
            checksum_url,
            expected,
            actual,
            download,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(format!(
                "The expected fingerprint from {checksum_url} was:\n  {expected}\n\
                 The actual fingerprint of the downloaded file is:\n  {actual}\n\
                 The rejected download was kept at {}",
                download.display()
            ))
            .with_suggestion("The current executable was not modified; try again later"),
        LauncherError::InstallFailed {
            path,
            restored: true,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(format!("The previous binary was put back at {}", path.display()))
            .with_suggestion("Check the permissions of the install directory and try again"),
        LauncherError::InstallFailed {
            backup,
            ..
        }
        | LauncherError::VersionReportFailed {
            backup,
            ..
        }
        | LauncherError::VerificationFailed {
            backup,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(format!("A backup is saved in {}", backup.display()))
            .with_suggestion("Run `pants-launcher rollback` or move the backup back into place"),
        LauncherError::BackupNotFound {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("A backup only exists after an update that failed verification"),
        LauncherError::ConfigError {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check the launcher config file and PANTS_BOOTSTRAP_* environment variables"),
        LauncherError::FileSystemError {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("Check file permissions and available disk space"),
        LauncherError::Other {
            ..
        } => ErrorContext::new(error.clone()),
    }
}
