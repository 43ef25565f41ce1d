//! Version resolution for the build tool.
//!
//! The resolver turns a [`VersionSpec`] into a [`ResolveInfo`]: the concrete version, the
//! interpreter to provision, and where to install it from. There are two install
//! schemes:
//!
//! - **Artifacts** (versions ≥ `2.0.0.dev0`): a self-contained executable per version,
//!   runtime and platform, found by the [`ArtifactLocator`](crate::artifact::ArtifactLocator)
//! - **Legacy package indexes** (older versions and any source ref): a per-commit index
//!   in the binaries bucket, which requires mapping a tag to its commit
//!
//! # Tag → commit fallback chain
//!
//! Tags are resolved through three tiers, cheapest first, stopping at the first one that
//! yields a commit id:
//!
//! 1. The embedded [`ReleaseTagIndex`] (no network)
//! 2. A text fetch from the tag mapping endpoint (one cheap request)
//! 3. The GitHub API: the tag ref, then the tag object for annotated tags (two
//!    rate-limited requests)
//!
//! A failure in one tier is logged and the next tier is tried; only when all three come
//! up empty does resolution fail with [`LauncherError::CommitNotFound`].
//!
//! Every `ResolveInfo` returned has had its install location confirmed reachable.

pub mod runtime;
pub mod tag_index;

#[cfg(test)]
mod tests;

pub use runtime::{RuntimeCandidates, RuntimeTable, RuntimeThreshold};
pub use tag_index::{ReleaseTagIndex, is_commit_id};

use crate::artifact::ArtifactLocator;
use crate::constants::{
    ABBREVIATED_SHA_LEN, PANTS_API_BASE_URL, PANTS_LATEST_RELEASE_URL, PANTS_LEGACY_INDEX_URL,
    PANTS_RAW_CONTENT_URL, PANTS_TAG_MAPPING_URL, PANTS_VERSION_FILE, RELEASE_TAG_PREFIX,
};
use crate::core::LauncherError;
use crate::fetch::{FetchError, Fetcher, Headers, fetch_typed};
use crate::utils::PlatformTag;
use crate::version::PantsVersion;
use serde::Deserialize;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info};

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// A version string such as `2.18.0`
    Explicit(String),
    /// A commit id or tag in the upstream repository
    SourceRef(String),
    /// Whatever upstream currently marks as the latest stable release
    Latest,
}

/// A resolved version, ready for the installer.
///
/// Exactly one of `artifact_url` and `legacy_index_url` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    /// The stable version
    pub version: PantsVersion,
    /// `<version>+git<sha>` when resolved from a source ref
    pub sha_version: Option<PantsVersion>,
    /// Interpreter id, e.g. `cpython39`
    pub runtime_id: String,
    /// Direct artifact URL (artifact scheme)
    pub artifact_url: Option<String>,
    /// Package index URL (legacy scheme)
    pub legacy_index_url: Option<String>,
}

impl ResolveInfo {
    /// The version that will actually be installed.
    #[must_use]
    pub fn selected_version(&self) -> &PantsVersion {
        self.sha_version.as_ref().unwrap_or(&self.version)
    }

    /// Whether this uses the legacy package index scheme.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.legacy_index_url.is_some()
    }

    /// The option telling the build tool about the legacy package index.
    ///
    /// Adds the index (`+`) only when a source-ref build was selected, otherwise passes a
    /// no-op removal (`-`). Versions before 2.14.0 call the option `repos`; 2.14.0
    /// pre-releases already use `find-links`.
    #[must_use]
    pub fn find_links_option(&self, selected: &PantsVersion) -> String {
        let operator = if *selected == self.version { "-" } else { "+" };
        let option_name =
            if self.version < PantsVersion::dev0(2, 14, 0) { "repos" } else { "find-links" };
        let value = self.legacy_index_url.as_ref().map(|url| format!("'{url}'")).unwrap_or_default();
        format!("--python-repos-{option_name}={operator}[{value}]")
    }

    /// Write the installer environment as `KEY=value` lines.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_env<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(index) = &self.legacy_index_url {
            writeln!(writer, "FIND_LINKS={index}")?;
            writeln!(
                writer,
                "PANTS_SHA_FIND_LINKS={}",
                self.find_links_option(self.selected_version())
            )?;
        }
        if let Some(url) = &self.artifact_url {
            writeln!(writer, "PANTS_PEX_URL={url}")?;
        }
        writeln!(writer, "PANTS_VERSION={}", self.selected_version())?;
        writeln!(writer, "PYTHON={}", self.runtime_id)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Resolves [`VersionSpec`]s. Tables are fixed at construction.
pub struct VersionResolver {
    fetcher: Arc<dyn Fetcher>,
    locator: ArtifactLocator,
    tag_index: ReleaseTagIndex,
    runtimes: RuntimeTable,
    artifact_threshold: PantsVersion,
    github_token: Option<String>,
}

impl VersionResolver {
    /// Resolver with the embedded tag index and the default runtime table.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, locator: ArtifactLocator) -> Self {
        Self {
            fetcher,
            locator,
            tag_index: ReleaseTagIndex::embedded(),
            runtimes: RuntimeTable::default(),
            artifact_threshold: PantsVersion::dev0(2, 0, 0),
            github_token: None,
        }
    }

    /// Replace the tag index.
    #[must_use]
    pub fn with_tag_index(mut self, tag_index: ReleaseTagIndex) -> Self {
        self.tag_index = tag_index;
        self
    }

    /// Replace the runtime table.
    #[must_use]
    pub fn with_runtime_table(mut self, runtimes: RuntimeTable) -> Self {
        self.runtimes = runtimes;
        self
    }

    /// Bearer token for the GitHub API tier.
    #[must_use]
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }

    /// Resolve any spec.
    ///
    /// # Errors
    ///
    /// See [`resolve_explicit`](Self::resolve_explicit),
    /// [`resolve_source_ref`](Self::resolve_source_ref) and
    /// [`resolve_latest_stable`](Self::resolve_latest_stable).
    pub async fn resolve(
        &self,
        spec: &VersionSpec,
        platform: &PlatformTag,
    ) -> Result<ResolveInfo, LauncherError> {
        match spec {
            VersionSpec::Explicit(version) => self.resolve_explicit(version, platform).await,
            VersionSpec::SourceRef(reference) => self.resolve_source_ref(reference, platform).await,
            VersionSpec::Latest => self.resolve_latest_stable(platform).await,
        }
    }

    /// Resolve an explicit `major.minor.patch` version.
    ///
    /// Malformed and two-component versions are rejected before any network access.
    ///
    /// # Errors
    ///
    /// [`LauncherError::InvalidVersion`], [`LauncherError::VersionPrecision`], or any
    /// error from locating the install.
    pub async fn resolve_explicit(
        &self,
        version: &str,
        platform: &PlatformTag,
    ) -> Result<ResolveInfo, LauncherError> {
        let parsed = PantsVersion::parse(version)?;
        if parsed.precision() < 3 {
            return Err(LauncherError::VersionPrecision {
                version: version.trim().to_string(),
            });
        }
        self.resolve_version(parsed, platform).await
    }

    /// Resolve the release upstream marks as latest.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::LatestReleaseUnavailable`] if the release cannot be fetched
    /// - [`LauncherError::UnexpectedReleaseTag`] if its tag is not `release_<version>`
    pub async fn resolve_latest_stable(
        &self,
        platform: &PlatformTag,
    ) -> Result<ResolveInfo, LauncherError> {
        info!("Fetching latest stable Pants version since none is configured");
        let latest: LatestRelease =
            fetch_typed(self.fetcher.as_ref(), PANTS_LATEST_RELEASE_URL, &Headers::accept_json())
                .await
                .map_err(|e| LauncherError::LatestReleaseUnavailable {
                    url: PANTS_LATEST_RELEASE_URL.to_string(),
                    reason: e.to_string(),
                })?;

        let version = latest
            .tag_name
            .strip_prefix(RELEASE_TAG_PREFIX)
            .filter(|rest| !rest.is_empty())
            .and_then(|rest| PantsVersion::parse(rest).ok())
            .ok_or_else(|| LauncherError::UnexpectedReleaseTag {
                tag: latest.tag_name.clone(),
            })?;
        debug!("Latest stable release is {}", version);
        self.resolve_version(version, platform).await
    }

    /// Resolve a commit id or tag to a legacy index install.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::CommitNotFound`] if a tag cannot be mapped to a commit
    /// - [`LauncherError::CommitVersionUnavailable`] if the commit's version file cannot
    ///   be read
    pub async fn resolve_source_ref(
        &self,
        reference: &str,
        platform: &PlatformTag,
    ) -> Result<ResolveInfo, LauncherError> {
        let reference = reference.trim();
        let commit = if is_commit_id(reference) {
            reference.to_ascii_lowercase()
        } else {
            self.resolve_commit(reference).await?
        };

        let url = format!("{PANTS_RAW_CONTENT_URL}/{commit}/{PANTS_VERSION_FILE}");
        let unavailable = |reason: String| LauncherError::CommitVersionUnavailable {
            commit: commit.clone(),
            reason,
        };
        let text =
            self.fetcher.fetch_text(&url, &Headers::new()).await.map_err(|e| unavailable(e.to_string()))?;
        let version = PantsVersion::parse(&text).map_err(|e| unavailable(e.to_string()))?;

        let abbreviated = commit.get(..ABBREVIATED_SHA_LEN).unwrap_or(&commit);
        let sha_version = version.with_local(format!("git{abbreviated}"));
        let mut info = self.legacy_info(version, &commit, &sha_version, platform).await?;
        info.sha_version = Some(sha_version);
        Ok(info)
    }

    async fn resolve_version(
        &self,
        version: PantsVersion,
        platform: &PlatformTag,
    ) -> Result<ResolveInfo, LauncherError> {
        if version >= self.artifact_threshold {
            let candidates = self.runtimes.candidates(&version);
            let artifact = self.locator.locate(&version, platform, &candidates).await?;
            return Ok(ResolveInfo {
                runtime_id: RuntimeTable::interpreter_id(&artifact.runtime)?,
                version,
                sha_version: None,
                artifact_url: Some(artifact.url),
                legacy_index_url: None,
            });
        }

        let commit = self.resolve_commit(&version.release_tag()).await?;
        let abbreviated = commit.get(..ABBREVIATED_SHA_LEN).unwrap_or(&commit);
        let sha_version = version.with_local(format!("git{abbreviated}"));
        self.legacy_info(version, &commit, &sha_version, platform).await
    }

    async fn legacy_info(
        &self,
        version: PantsVersion,
        commit: &str,
        sha_version: &PantsVersion,
        platform: &PlatformTag,
    ) -> Result<ResolveInfo, LauncherError> {
        let encoded = sha_version.to_string().replace('+', "%2B");
        let index_url = format!("{PANTS_LEGACY_INDEX_URL}/{commit}/{encoded}/index.html");
        self.locator.confirm_index(&index_url, &version, platform).await?;

        let runtime = self.runtimes.preferred(&version).ok_or_else(|| LauncherError::UnsupportedRuntime {
            runtime: format!("none configured for {version}"),
        })?;
        Ok(ResolveInfo {
            runtime_id: RuntimeTable::interpreter_id(runtime)?,
            version,
            sha_version: None,
            artifact_url: None,
            legacy_index_url: Some(index_url),
        })
    }

    /// Map a tag to its commit through the fallback tiers.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::CommitNotFound`] listing what each tier reported when
    /// none yields a commit.
    pub async fn resolve_commit(&self, tag: &str) -> Result<String, LauncherError> {
        if let Some(commit) = self.tag_index.lookup(tag) {
            debug!("Tag {} found in the embedded index: {}", tag, commit);
            return Ok(commit.to_string());
        }
        let mut attempts = vec![format!("embedded index: no entry for {tag}")];

        match self.commit_from_mapping(tag).await {
            Ok(commit) => return Ok(commit),
            Err(e) => {
                debug!("Tag mapping lookup for {} failed: {}", tag, e);
                attempts.push(format!("tag mapping: {e}"));
            }
        }

        match self.commit_from_api(tag).await {
            Ok(commit) => return Ok(commit),
            Err(e) => {
                debug!("GitHub API lookup for {} failed: {}", tag, e);
                attempts.push(format!("GitHub API: {e}"));
            }
        }

        Err(LauncherError::CommitNotFound {
            reference: tag.to_string(),
            attempts,
        })
    }

    async fn commit_from_mapping(&self, tag: &str) -> Result<String, FetchError> {
        let url = format!("{PANTS_TAG_MAPPING_URL}/{tag}");
        let text = self.fetcher.fetch_text(&url, &Headers::new()).await?;
        expect_commit(&url, text.trim())
    }

    async fn commit_from_api(&self, tag: &str) -> Result<String, FetchError> {
        let headers = Headers::github_api(self.github_token.as_deref());
        let url = format!("{PANTS_API_BASE_URL}/git/refs/tags/{tag}");
        let reference: GitRef = fetch_typed(self.fetcher.as_ref(), &url, &headers).await?;

        // Annotated tags point at a tag object, which in turn points at the commit.
        if reference.object.kind == "tag" {
            let url = format!("{PANTS_API_BASE_URL}/git/tags/{}", reference.object.sha);
            let tag_object: GitRef = fetch_typed(self.fetcher.as_ref(), &url, &headers).await?;
            return expect_commit(&url, &tag_object.object.sha);
        }
        expect_commit(&url, &reference.object.sha)
    }
}

fn expect_commit(url: &str, candidate: &str) -> Result<String, FetchError> {
    if is_commit_id(candidate) {
        Ok(candidate.to_ascii_lowercase())
    } else {
        Err(FetchError::InvalidBody {
            url: url.to_string(),
            reason: format!("expected a commit id, got {candidate:?}"),
        })
    }
}
