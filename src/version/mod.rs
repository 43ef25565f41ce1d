//! Version parsing and ordering for build tool releases.
//!
//! Build tool versions follow the Python packaging scheme rather than semver:
//! `2.18.0`, `2.19.0rc1`, `2.20.0.dev3`, `2.17.0+git1a2b3c4d`. This module provides
//! [`PantsVersion`], which parses those strings and gives them a total order so the
//! resolver can compare requests against scheme thresholds such as `2.0.0.dev0`.
//!
//! # Ordering
//!
//! 1. Release components, numerically, with missing trailing components treated as `0`
//! 2. Pre-release: `dev` < `a` < `b` < `rc` < final release
//! 3. Local label (`+git...`): a version without a label sorts first
//!
//! ```rust
//! use pants_launcher::version::PantsVersion;
//!
//! let dev: PantsVersion = "2.18.0.dev0".parse().unwrap();
//! let rc: PantsVersion = "2.18.0rc1".parse().unwrap();
//! let final_release: PantsVersion = "2.18.0".parse().unwrap();
//! assert!(dev < rc && rc < final_release);
//! ```
//!
//! The launcher's own releases use strict semver tags; see [`comparison`].

pub mod comparison;

use crate::core::LauncherError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Kind of pre-release, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseKind {
    /// Development snapshot (`.devN`)
    Dev,
    /// Alpha (`aN`)
    Alpha,
    /// Beta (`bN`)
    Beta,
    /// Release candidate (`rcN`)
    ReleaseCandidate,
}

impl PreReleaseKind {
    fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "dev" => Some(Self::Dev),
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "rc" | "c" => Some(Self::ReleaseCandidate),
            _ => None,
        }
    }
}

/// A pre-release marker such as `rc1` or `.dev0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    /// Kind of pre-release
    pub kind: PreReleaseKind,
    /// Pre-release number
    pub number: u64,
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PreReleaseKind::Dev => write!(f, ".dev{}", self.number),
            PreReleaseKind::Alpha => write!(f, "a{}", self.number),
            PreReleaseKind::Beta => write!(f, "b{}", self.number),
            PreReleaseKind::ReleaseCandidate => write!(f, "rc{}", self.number),
        }
    }
}

/// A build tool version with a total order.
#[derive(Debug, Clone)]
pub struct PantsVersion {
    release: Vec<u64>,
    pre: Option<PreRelease>,
    local: Option<String>,
}

fn version_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?i)^v?(?P<release>\d+(?:\.\d+)*)(?:[.\-_]?(?P<pre>dev|alpha|beta|a|b|rc|c)(?P<pre_n>\d*))?(?:\+(?P<local>[a-z0-9]+(?:[.\-_][a-z0-9]+)*))?$",
            )
            .ok()
        })
        .as_ref()
}

impl PantsVersion {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::InvalidVersion`] when the string is not a version.
    pub fn parse(input: &str) -> Result<Self, LauncherError> {
        let trimmed = input.trim();
        let invalid = |reason: &str| LauncherError::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        let captures = version_regex()
            .and_then(|pattern| pattern.captures(trimmed))
            .ok_or_else(|| invalid("not a recognized version"))?;

        let release = captures["release"]
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid("release component out of range")))
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match captures.name("pre") {
            Some(label) => {
                let kind = PreReleaseKind::parse(label.as_str())
                    .ok_or_else(|| invalid("unknown pre-release label"))?;
                let number = match captures.name("pre_n").map(|m| m.as_str()) {
                    Some("") | None => 0,
                    Some(n) => n.parse().map_err(|_| invalid("pre-release number out of range"))?,
                };
                Some(PreRelease {
                    kind,
                    number,
                })
            }
            None => None,
        };

        Ok(Self {
            release,
            pre,
            local: captures.name("local").map(|m| m.as_str().to_ascii_lowercase()),
        })
    }

    /// Build a version from its parts, for thresholds known at compile time.
    #[must_use]
    pub fn from_parts(release: &[u64], pre: Option<PreRelease>) -> Self {
        Self {
            release: release.to_vec(),
            pre,
            local: None,
        }
    }

    /// `<major>.<minor>.<patch>.dev0`, the lowest version of a release line.
    #[must_use]
    pub fn dev0(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_parts(
            &[major, minor, patch],
            Some(PreRelease {
                kind: PreReleaseKind::Dev,
                number: 0,
            }),
        )
    }

    /// Number of release components the version was written with (`2.18` → 2).
    #[must_use]
    pub fn precision(&self) -> usize {
        self.release.len()
    }

    /// Major component.
    #[must_use]
    pub fn major(&self) -> u64 {
        self.component(0)
    }

    /// Minor component.
    #[must_use]
    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    /// Patch component.
    #[must_use]
    pub fn patch(&self) -> u64 {
        self.component(2)
    }

    fn component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Pre-release marker, if any.
    #[must_use]
    pub fn pre_release(&self) -> Option<PreRelease> {
        self.pre
    }

    /// Local label (the part after `+`), if any.
    #[must_use]
    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// Whether this is a dev, alpha, beta or release candidate version.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// Copy of this version with the given local label.
    #[must_use]
    pub fn with_local(&self, label: impl Into<String>) -> Self {
        Self {
            local: Some(label.into().to_ascii_lowercase()),
            ..self.clone()
        }
    }

    /// Copy of this version without a local label.
    #[must_use]
    pub fn public(&self) -> Self {
        Self {
            local: None,
            ..self.clone()
        }
    }

    /// The upstream release tag for this version (`release_2.18.0`).
    #[must_use]
    pub fn release_tag(&self) -> String {
        format!("{}{}", crate::constants::RELEASE_TAG_PREFIX, self.public())
    }

    fn significant_release(&self) -> &[u64] {
        let end = self.release.iter().rposition(|&n| n != 0).map_or(0, |i| i + 1);
        &self.release[..end]
    }
}

impl FromStr for PantsVersion {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PantsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "{pre}")?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

impl Ord for PantsVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.release.len().max(other.release.len());
        for index in 0..width {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }

        let pre = match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        };
        if pre != Ordering::Equal {
            return pre;
        }

        self.local.cmp(&other.local)
    }
}

impl PartialOrd for PantsVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PantsVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PantsVersion {}

impl Hash for PantsVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_release().hash(state);
        self.pre.hash(state);
        self.local.hash(state);
    }
}
