//! Artifact override documents.
//!
//! An override document redirects artifact downloads, typically to a private mirror:
//!
//! ```json
//! {
//!   "ptex": {
//!     "pants.2.18.0-cp39-linux_x86_64.pex": "https://mirror.example/pants.2.18.0-cp39-linux_x86_64.pex"
//!   }
//! }
//! ```
//!
//! Several documents can be given; later documents win on conflicting names. Once any
//! document is configured the mapping is a closed set: an artifact missing from it is
//! an error, never a reason to fall back to the public release assets.

use crate::constants::OVERRIDES_TOP_LEVEL_KEY;
use crate::core::LauncherError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Artifact name → URL mapping loaded from one or more documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactOverrides {
    urls: BTreeMap<String, String>,
    sources: Vec<PathBuf>,
}

impl ArtifactOverrides {
    /// Load every document in `paths`, or `None` when no documents are configured.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] naming the file when a document cannot be
    /// read, is not JSON, or lacks a `"ptex"` object of string URLs.
    pub async fn load(paths: &[PathBuf]) -> Result<Option<Self>, LauncherError> {
        if paths.is_empty() {
            return Ok(None);
        }

        let mut overrides = Self::default();
        for path in paths {
            let content = fs::read_to_string(path).await.map_err(|e| LauncherError::ConfigError {
                message: format!("Failed to read artifact overrides from {}: {e}", path.display()),
            })?;
            overrides.merge_document(path, &content)?;
        }
        debug!(
            "Loaded {} artifact override(s) from {} document(s)",
            overrides.urls.len(),
            overrides.sources.len()
        );
        Ok(Some(overrides))
    }

    /// Build overrides directly from a mapping.
    #[must_use]
    pub fn from_map(urls: BTreeMap<String, String>) -> Self {
        Self {
            urls,
            sources: Vec::new(),
        }
    }

    fn merge_document(&mut self, path: &Path, content: &str) -> Result<(), LauncherError> {
        let invalid = |reason: String| LauncherError::ConfigError {
            message: format!("Invalid artifact overrides in {}: {reason}", path.display()),
        };

        let document: serde_json::Value =
            serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let entries = document
            .get(OVERRIDES_TOP_LEVEL_KEY)
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| invalid(format!("expected a top-level \"{OVERRIDES_TOP_LEVEL_KEY}\" object")))?;

        for (name, url) in entries {
            let url = url
                .as_str()
                .ok_or_else(|| invalid(format!("the URL for '{name}' is not a string")))?;
            self.urls.insert(name.clone(), url.to_string());
        }
        self.sources.push(path.to_path_buf());
        Ok(())
    }

    /// URL for an artifact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    /// Documents the mapping was loaded from.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Number of mapped artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether no artifacts are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
