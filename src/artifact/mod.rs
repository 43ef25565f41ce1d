//! Locating a reachable install artifact for a version and platform.
//!
//! Artifacts are self-contained executables named
//! `pants.<version>-<runtime>-<platform>.pex` and published as release assets under
//! `release_<version>`. Not every runtime is built for every platform, so the locator
//! probes candidates in order:
//!
//! 1. The preferred runtime for the version
//! 2. Every other known runtime, in the fixed fallback order
//!
//! The first candidate whose probe succeeds wins; nothing is probed after it. Probes use
//! HEAD semantics, so no artifact body is downloaded here.
//!
//! When artifact overrides are configured, only the preferred runtime's artifact name is
//! looked up in them and nothing is probed.

pub mod overrides;

pub use overrides::ArtifactOverrides;

use crate::constants::{PANTS_RELEASE_DOWNLOAD_URL, RELEASE_TAG_PREFIX};
use crate::core::LauncherError;
use crate::fetch::{Fetcher, Headers};
use crate::resolver::RuntimeCandidates;
use crate::utils::PlatformTag;
use crate::version::PantsVersion;
use std::sync::Arc;
use tracing::debug;

/// A confirmed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedArtifact {
    /// Artifact file name
    pub name: String,
    /// Where to download it
    pub url: String,
    /// Runtime it was built for, artifact spelling (`cp310`)
    pub runtime: String,
}

/// Finds and confirms artifact URLs.
pub struct ArtifactLocator {
    fetcher: Arc<dyn Fetcher>,
    overrides: Option<ArtifactOverrides>,
    download_base_url: String,
}

impl ArtifactLocator {
    /// Locator probing the public release assets.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            overrides: None,
            download_base_url: PANTS_RELEASE_DOWNLOAD_URL.to_string(),
        }
    }

    /// Use an override mapping instead of probing.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Option<ArtifactOverrides>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Artifact name for a version, runtime and platform.
    #[must_use]
    pub fn artifact_name(version: &PantsVersion, runtime: &str, platform: &PlatformTag) -> String {
        format!("pants.{version}-{runtime}-{platform}.pex")
    }

    /// Public release asset URL for an artifact.
    #[must_use]
    pub fn canonical_url(&self, version: &PantsVersion, name: &str) -> String {
        format!("{}/{RELEASE_TAG_PREFIX}{version}/{name}", self.download_base_url)
    }

    /// Find the first reachable artifact among `candidates`.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::ArtifactNotInOverrides`] if overrides are configured and lack
    ///   the preferred artifact
    /// - [`LauncherError::ArtifactNotFound`] with every URL tried and the last probe error
    ///   if no candidate is reachable
    pub async fn locate(
        &self,
        version: &PantsVersion,
        platform: &PlatformTag,
        candidates: &RuntimeCandidates,
    ) -> Result<LocatedArtifact, LauncherError> {
        if let Some(overrides) = &self.overrides {
            return Self::locate_in_overrides(overrides, version, platform, candidates);
        }

        let headers = Headers::new();
        let mut tried = Vec::with_capacity(candidates.len());
        let mut last_error = "no runtime candidates to try".to_string();

        for runtime in candidates.iter() {
            let name = Self::artifact_name(version, runtime, platform);
            let url = self.canonical_url(version, &name);
            match self.fetcher.probe(&url, &headers).await {
                Ok(()) => {
                    debug!("Found {} for runtime {}", url, runtime);
                    return Ok(LocatedArtifact {
                        name,
                        url,
                        runtime: runtime.to_string(),
                    });
                }
                Err(e) => {
                    debug!("No {} artifact: {}", runtime, e);
                    last_error = e.to_string();
                    tried.push(url);
                }
            }
        }

        Err(LauncherError::ArtifactNotFound {
            version: version.to_string(),
            platform: platform.to_string(),
            tried,
            last_error,
        })
    }

    fn locate_in_overrides(
        overrides: &ArtifactOverrides,
        version: &PantsVersion,
        platform: &PlatformTag,
        candidates: &RuntimeCandidates,
    ) -> Result<LocatedArtifact, LauncherError> {
        let runtime = candidates.preferred().ok_or_else(|| LauncherError::ArtifactNotFound {
            version: version.to_string(),
            platform: platform.to_string(),
            tried: Vec::new(),
            last_error: "no runtime candidates to try".to_string(),
        })?;
        let name = Self::artifact_name(version, runtime, platform);
        match overrides.get(&name) {
            Some(url) => {
                debug!("Using override {} for {}", url, name);
                Ok(LocatedArtifact {
                    url: url.to_string(),
                    runtime: runtime.to_string(),
                    name,
                })
            }
            None => Err(LauncherError::ArtifactNotInOverrides {
                name,
                sources: overrides.sources().to_vec(),
            }),
        }
    }

    /// Confirm a legacy package index is reachable before handing it out.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ArtifactNotFound`] if the probe fails.
    pub async fn confirm_index(
        &self,
        url: &str,
        version: &PantsVersion,
        platform: &PlatformTag,
    ) -> Result<(), LauncherError> {
        self.fetcher.probe(url, &Headers::new()).await.map_err(|e| {
            debug!("Legacy index probe failed: {}", e);
            LauncherError::ArtifactNotFound {
                version: version.to_string(),
                platform: platform.to_string(),
                tried: vec![url.to_string()],
                last_error: e.to_string(),
            }
        })
    }
}
