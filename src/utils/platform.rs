//! Host platform detection.
//!
//! Artifacts are published per platform under a tag of the form
//! `<lowercased-os-name>_<lowercased-machine-architecture>`, using the names `uname`
//! reports rather than Rust's target names: macOS is `darwin`, and Apple silicon is
//! `arm64` while ARM Linux is `aarch64`.
//!
//! | Host | Tag |
//! |------|-----|
//! | Linux x86-64 | `linux_x86_64` |
//! | Linux ARM64 | `linux_aarch64` |
//! | macOS Intel | `darwin_x86_64` |
//! | macOS Apple silicon | `darwin_arm64` |
//! | Windows x86-64 | `windows_x86_64` |

use crate::core::LauncherError;
use std::fmt;
use std::str::FromStr;

/// Normalized OS and architecture of a host.
///
/// Detected once at startup and passed by value afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformTag {
    os: String,
    arch: String,
}

impl PlatformTag {
    /// Build a tag from raw OS and architecture names, lowercasing both.
    #[must_use]
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_ascii_lowercase(),
            arch: arch.to_ascii_lowercase(),
        }
    }

    /// Tag of the machine this process runs on.
    #[must_use]
    pub fn current() -> Self {
        Self::from_rust_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust's `std::env::consts` names into `uname` names.
    #[must_use]
    pub fn from_rust_target(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match (os, arch) {
            ("darwin", "aarch64") => "arm64",
            (_, other) => other,
        };
        Self::new(os, arch)
    }

    /// Operating system name, e.g. `linux`.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Machine architecture, e.g. `x86_64`.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether this tag describes a Windows host.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Suffix executables carry on this platform (`.exe` on Windows, empty elsewhere).
    #[must_use]
    pub fn exe_extension(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

impl FromStr for PlatformTag {
    type Err = LauncherError;

    /// Parse `linux_x86_64`. The OS is everything before the first underscore, since
    /// architectures such as `x86_64` contain underscores themselves.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('_') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() => Ok(Self::new(os, arch)),
            _ => Err(LauncherError::ConfigError {
                message: format!("Invalid platform tag '{s}', expected <os>_<arch> such as linux_x86_64"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lowercases() {
        assert_eq!(PlatformTag::new("Linux", "X86_64").to_string(), "linux_x86_64");
    }

    #[test]
    fn test_rust_target_translation() {
        assert_eq!(PlatformTag::from_rust_target("macos", "aarch64").to_string(), "darwin_arm64");
        assert_eq!(PlatformTag::from_rust_target("macos", "x86_64").to_string(), "darwin_x86_64");
        assert_eq!(PlatformTag::from_rust_target("linux", "aarch64").to_string(), "linux_aarch64");
        assert_eq!(PlatformTag::from_rust_target("windows", "x86_64").exe_extension(), ".exe");
    }

    #[test]
    fn test_parse() {
        let tag: PlatformTag = "linux_x86_64".parse().unwrap();
        assert_eq!(tag.os(), "linux");
        assert_eq!(tag.arch(), "x86_64");
        assert_eq!(tag.exe_extension(), "");
        assert!("linux".parse::<PlatformTag>().is_err());
        assert!("_x86_64".parse::<PlatformTag>().is_err());
    }

    #[test]
    fn test_current_matches_build_target() {
        let current = PlatformTag::current();
        assert_eq!(current.is_windows(), cfg!(windows));
        assert!(!current.arch().is_empty());
    }
}
