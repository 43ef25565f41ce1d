//! Self-update of the launcher executable.
//!
//! The launcher replaces its own binary with another release without ever leaving the
//! user without a working executable.
//!
//! # Components
//!
//! - **[`SelfUpdater`]**: runs the download, verify and swap protocol
//! - **[`release::ReleaseSource`]**: finds releases and their platform assets
//! - **[`verification::ChecksumVerifier`]**: SHA-256 verification of downloads
//! - **[`backup::BackupManager`]**: the rename-based backup of the previous binary
//!
//! # Update Process Flow
//!
//! ```text
//! 1. Release lookup
//!    ├── Explicit version: releases/tags/v<version>
//!    └── Latest: newest non-draft, non-prerelease vX.Y.Z with a platform asset
//!
//! 2. Download (nothing on disk changes outside a private temp dir)
//!    ├── Fetch <asset>.sha256
//!    ├── Stream the binary into the temp dir
//!    └── Verify its digest from disk; keep the file and stop on mismatch
//!
//! 3. Swap
//!    ├── Rename the executable to <name>.bak
//!    └── Rename the download into place
//!
//! 4. Verification
//!    ├── Run the new binary with PANTS_LAUNCHER_BOOT=version
//!    ├── Mismatch: fail, pointing at the backup
//!    └── Match: delete the backup (warn if that fails)
//! ```
//!
//! Failures after the swap do not restore automatically; the error names the backup
//! and `pants-launcher rollback` moves it back.
//!
//! ```bash
//! pants-launcher self-update            # newest release, if newer
//! pants-launcher self-update 0.12.1     # exactly this release
//! pants-launcher rollback               # restore the backup
//! ```

/// Rename-based backup of the launcher executable.
pub mod backup;
/// Launcher release lookup on GitHub.
pub mod release;
/// The self-update protocol.
pub mod self_updater;
/// Download verification.
pub mod verification;


pub use backup::BackupManager;
pub use release::{Release, ReleaseSource};
pub use self_updater::{SelfUpdater, UpdateOutcome, report_version};
pub use verification::ChecksumVerifier;
