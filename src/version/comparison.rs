//! Strict release tag handling for the launcher's own releases.
//!
//! Launcher releases are tagged `v<major>.<minor>.<patch>` and nothing else counts as a
//! production release: tags with pre-release suffixes, build metadata or other prefixes
//! are skipped when looking for the newest version.

use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

fn release_tag_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v(?P<version>\d+\.\d+\.\d+)$").ok()).as_ref()
}

/// Parse a production release tag (`v0.12.1`) into a version.
///
/// Returns `None` for anything that is not exactly `v<major>.<minor>.<patch>`.
#[must_use]
pub fn parse_release_tag(tag: &str) -> Option<Version> {
    let captures = release_tag_regex()?.captures(tag)?;
    Version::parse(&captures["version"]).ok()
}

/// The tag name for a launcher version, accepting input with or without the `v`.
#[must_use]
pub fn release_tag_for(version: &str) -> String {
    format!("v{}", version.trim().trim_start_matches('v'))
}

/// Whether `candidate` is strictly newer than `current`.
#[must_use]
pub fn is_newer(candidate: &Version, current: &Version) -> bool {
    candidate > current
}
