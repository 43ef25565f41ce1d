//! Launcher releases published on GitHub.

use crate::constants::{LAUNCHER_API_BASE_URL, LAUNCHER_BINARY_NAME};
use crate::core::LauncherError;
use crate::fetch::{Fetcher, Headers, fetch_typed};
use crate::utils::PlatformTag;
use crate::version::comparison::{parse_release_tag, release_tag_for};
use semver::Version;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// A launcher release with a binary for the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Release version
    pub version: Version,
    /// Asset file name, e.g. `pants-launcher-linux_x86_64`
    pub file_name: String,
    /// Download URL of the binary
    pub binary_url: String,
    /// Download URL of the `.sha256` companion
    pub checksum_url: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseData {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

impl Release {
    /// Binary asset name for a platform: `pants-launcher-<platform><exe suffix>`.
    #[must_use]
    pub fn binary_name(platform: &PlatformTag) -> String {
        format!("{LAUNCHER_BINARY_NAME}-{platform}{}", platform.exe_extension())
    }

    fn from_release_data(version: Version, platform: &PlatformTag, data: &ReleaseData) -> Option<Self> {
        let binary_name = Self::binary_name(platform);
        let checksum_name = format!("{binary_name}.sha256");

        let url_of = |name: &str| {
            data.assets.iter().find(|asset| asset.name == name).map(|asset| asset.browser_download_url.clone())
        };
        let release = Self {
            binary_url: url_of(&binary_name)?,
            checksum_url: url_of(&checksum_name)?,
            file_name: binary_name,
            version,
        };
        Some(release)
    }
}

/// Looks up launcher releases through the GitHub releases API.
pub struct ReleaseSource {
    fetcher: Arc<dyn Fetcher>,
    api_base_url: String,
    github_token: Option<String>,
}

impl ReleaseSource {
    /// Release source for the official launcher repository.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            api_base_url: LAUNCHER_API_BASE_URL.to_string(),
            github_token: None,
        }
    }

    /// Use another API base, e.g. a GitHub Enterprise mirror.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bearer token for API requests.
    #[must_use]
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }

    fn headers(&self) -> Headers {
        Headers::github_api(self.github_token.as_deref())
    }

    /// The release tagged `v<version>`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ReleaseNotFound`] if the version is not `X.Y.Z`, the tag
    /// does not exist, or the release has no binary for `platform`.
    pub async fn get_release(&self, version: &str, platform: &PlatformTag) -> Result<Release, LauncherError> {
        let not_found = |reason: String| LauncherError::ReleaseNotFound {
            version: version.to_string(),
            reason,
        };

        let tag = release_tag_for(version);
        let parsed = parse_release_tag(&tag)
            .ok_or_else(|| not_found("versions look like 0.12.1".to_string()))?;

        let url = format!("{}/releases/tags/{tag}", self.api_base_url);
        let data: ReleaseData =
            fetch_typed(self.fetcher.as_ref(), &url, &self.headers()).await.map_err(|e| not_found(e.to_string()))?;

        Release::from_release_data(parsed, platform, &data)
            .ok_or_else(|| not_found(format!("There were no compatible artifacts for {platform}.")))
    }

    /// The newest production release with a binary for `platform`.
    ///
    /// Drafts, pre-releases and tags other than `vX.Y.Z` are skipped. Returns `None` if
    /// nothing qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ReleaseNotFound`] if the release list cannot be fetched.
    pub async fn find_latest_production_release(
        &self,
        platform: &PlatformTag,
    ) -> Result<Option<Release>, LauncherError> {
        let url = format!("{}/releases", self.api_base_url);
        let releases: Vec<ReleaseData> =
            fetch_typed(self.fetcher.as_ref(), &url, &self.headers()).await.map_err(|e| {
                LauncherError::ReleaseNotFound {
                    version: "latest".to_string(),
                    reason: e.to_string(),
                }
            })?;

        let latest = releases
            .iter()
            .filter(|data| !data.draft && !data.prerelease)
            .filter_map(|data| {
                let tag = data.tag_name.as_deref()?;
                let Some(version) = parse_release_tag(tag) else {
                    debug!("Skipping tag {} since it is not a production release tag", tag);
                    return None;
                };
                Release::from_release_data(version, platform, data)
            })
            .max_by(|a, b| a.version.cmp(&b.version));

        if latest.is_none() {
            debug!("No launcher releases compatible with {} were found", platform);
        }
        Ok(latest)
    }
}
