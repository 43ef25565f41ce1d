//! Embedded release tag → commit index.
//!
//! Resolving a tag through the GitHub API costs two rate-limited round trips, so the
//! launcher ships a table of historical release tags and their commits. A hit here
//! answers without touching the network.
//!
//! The shipped table lives in `release_tags.json` next to this file, a flat JSON object
//! of `"<tag>": "<40 hex commit id>"` entries. It only carries tags whose commits have
//! been checked against the Pants repository, so it is sparse: any tag missing from it
//! falls through to the tag mapping endpoint and then the GitHub API.

use crate::core::LauncherError;
use std::collections::BTreeMap;
use tracing::warn;

const EMBEDDED_RELEASE_TAGS: &str = include_str!("release_tags.json");

/// Whether `candidate` is a full 40 character hexadecimal commit id.
#[must_use]
pub fn is_commit_id(candidate: &str) -> bool {
    candidate.len() == 40 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Read-only mapping from release tag name to commit id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseTagIndex {
    tags: BTreeMap<String, String>,
}

impl ReleaseTagIndex {
    /// The table compiled into the binary.
    ///
    /// A corrupt table only disables the fast path, so it is logged rather than fatal.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_RELEASE_TAGS).unwrap_or_else(|e| {
            warn!("Ignoring embedded release tag index: {e}");
            Self::default()
        })
    }

    /// Parse a `{"<tag>": "<commit>"}` document.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if the document is not a flat string map or
    /// any value is not a full commit id.
    pub fn from_json(json: &str) -> Result<Self, LauncherError> {
        let tags: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|e| LauncherError::ConfigError {
                message: format!("Invalid release tag index: {e}"),
            })?;
        Self::from_pairs(tags)
    }

    /// Build an index from `(tag, commit)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if any commit is not a full commit id.
    pub fn from_pairs<I, T, C>(pairs: I) -> Result<Self, LauncherError>
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        let mut tags = BTreeMap::new();
        for (tag, commit) in pairs {
            let (tag, commit) = (tag.into(), commit.into().to_ascii_lowercase());
            if !is_commit_id(&commit) {
                return Err(LauncherError::ConfigError {
                    message: format!("Release tag index maps '{tag}' to '{commit}', which is not a commit id"),
                });
            }
            tags.insert(tag, commit);
        }
        Ok(Self {
            tags,
        })
    }

    /// Commit for `tag`, if indexed.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Number of indexed tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
