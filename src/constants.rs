//! Global constants used throughout the launcher.
//!
//! This module contains the well-known URLs, environment variable names and
//! timeouts shared by the resolver, the artifact locator and the self-updater.
//! Defining them centrally keeps the remote contracts discoverable in one place.

use std::time::Duration;

/// Base name of the launcher binary, used to build self-update asset names.
pub const LAUNCHER_BINARY_NAME: &str = "pants-launcher";

/// GitHub API base for the launcher's own releases.
pub const LAUNCHER_API_BASE_URL: &str = "https://api.github.com/repos/pantsbuild/pants-launcher";

/// GitHub API base for the build tool repository.
pub const PANTS_API_BASE_URL: &str = "https://api.github.com/repos/pantsbuild/pants";

/// Release page that answers with the release tagged "latest" when asked for JSON.
pub const PANTS_LATEST_RELEASE_URL: &str = "https://github.com/pantsbuild/pants/releases/latest";

/// Prefix under which release assets are downloadable.
pub const PANTS_RELEASE_DOWNLOAD_URL: &str = "https://github.com/pantsbuild/pants/releases/download";

/// Raw content host used to read the `VERSION` file at a given commit.
pub const PANTS_RAW_CONTENT_URL: &str = "https://raw.githubusercontent.com/pantsbuild/pants";

/// Path of the version file inside the build tool repository.
pub const PANTS_VERSION_FILE: &str = "src/python/pants/VERSION";

/// Cheap tag → commit mapping endpoint, consulted before the rate-limited API.
pub const PANTS_TAG_MAPPING_URL: &str = "https://binaries.pantsbuild.org/tags/pantsbuild.pants";

/// Bucket holding legacy per-commit package indexes.
pub const PANTS_LEGACY_INDEX_URL: &str = "https://binaries.pantsbuild.org/wheels/pantsbuild.pants";

/// Where users are pointed when something fails that they cannot fix themselves.
pub const HELP_URL: &str = "https://www.pantsbuild.org/docs/getting-help";

/// Where users are pointed to report upstream contract changes.
pub const ISSUES_URL: &str = "https://github.com/pantsbuild/pants/issues/new/choose";

/// Prefix every build tool release tag carries (`release_2.18.0`).
pub const RELEASE_TAG_PREFIX: &str = "release_";

/// Top-level key of an artifact override document.
pub const OVERRIDES_TOP_LEVEL_KEY: &str = "ptex";

/// Env var: request timeout override in seconds.
pub const FETCH_TIMEOUT_ENV: &str = "PANTS_BOOTSTRAP_FETCH_TIMEOUT";

/// Env var: path list of artifact override documents.
pub const ARTIFACT_OVERRIDES_ENV: &str = "PANTS_BOOTSTRAP_URLS";

/// Env var: bearer token attached to GitHub API requests.
pub const GITHUB_TOKEN_ENV: &str = "PANTS_BOOTSTRAP_GITHUB_API_BEARER_TOKEN";

/// Env var: explicit path of the launcher config file.
pub const CONFIG_PATH_ENV: &str = "PANTS_LAUNCHER_CONFIG";

/// Env var which, when set to [`REPORT_VERSION_VALUE`], makes the launcher print its
/// version and exit. Used to verify a freshly installed binary.
pub const REPORT_VERSION_ENV: &str = "PANTS_LAUNCHER_BOOT";

/// Value of [`REPORT_VERSION_ENV`] requesting a version report.
pub const REPORT_VERSION_VALUE: &str = "version";

/// Default timeout for a single fetch (60 seconds).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Number of commit id characters kept in `+git<sha>` local versions.
pub const ABBREVIATED_SHA_LEN: usize = 8;
