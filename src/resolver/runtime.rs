//! Version → runtime mapping.
//!
//! Each build tool release is published for one or more Python runtimes. The
//! [`RuntimeTable`] knows which runtime a version *prefers* and which others are worth
//! probing when the preferred one has no artifact for the host.
//!
//! Runtime identifiers come in two spellings: the artifact spelling (`cp311`), used in
//! artifact names, and the interpreter spelling (`cpython311`), handed to the installer.

use crate::core::LauncherError;
use crate::version::PantsVersion;

/// Runtimes this launcher can provision, in artifact spelling.
const SUPPORTED_RUNTIMES: &[&str] = &["cp38", "cp39", "cp310", "cp311"];

/// One row of the table: versions at or above `minimum` prefer `runtime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeThreshold {
    /// Lowest version this row applies to
    pub minimum: PantsVersion,
    /// Runtime in artifact spelling, e.g. `cp311`
    pub runtime: String,
}

/// Ordered runtime identifiers to probe, preferred first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCandidates(Vec<String>);

impl RuntimeCandidates {
    /// Candidates in the given order.
    #[must_use]
    pub fn new(runtimes: Vec<String>) -> Self {
        Self(runtimes)
    }

    /// The preferred runtime, if any.
    #[must_use]
    pub fn preferred(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Iterate in probe order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is nothing to probe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable version → runtime table plus the full fallback enumeration.
///
/// Rows must be sorted by `minimum`, highest first: [`preferred`](Self::preferred)
/// returns the first row whose threshold is ≤ the version. An unsorted table silently
/// yields wrong runtimes; it is not checked at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeTable {
    thresholds: Vec<RuntimeThreshold>,
    fallback: Vec<String>,
}

impl Default for RuntimeTable {
    /// `2.25.0.dev0 → cp311`, `2.5.0.dev0 → cp39`, anything older → `cp38`; fallback
    /// order `cp38, cp39, cp310, cp311`.
    fn default() -> Self {
        Self::new(
            vec![
                RuntimeThreshold {
                    minimum: PantsVersion::dev0(2, 25, 0),
                    runtime: "cp311".to_string(),
                },
                RuntimeThreshold {
                    minimum: PantsVersion::dev0(2, 5, 0),
                    runtime: "cp39".to_string(),
                },
                RuntimeThreshold {
                    minimum: PantsVersion::from_parts(&[0], None),
                    runtime: "cp38".to_string(),
                },
            ],
            SUPPORTED_RUNTIMES.iter().map(|r| (*r).to_string()).collect(),
        )
    }
}

impl RuntimeTable {
    /// Build a table. `thresholds` must be sorted descending by `minimum`.
    #[must_use]
    pub fn new(thresholds: Vec<RuntimeThreshold>, fallback: Vec<String>) -> Self {
        Self {
            thresholds,
            fallback,
        }
    }

    /// Runtimes tried after the preferred one, in order.
    #[must_use]
    pub fn fallback(&self) -> &[String] {
        &self.fallback
    }

    /// The runtime preferred for `version`: the first row whose minimum is ≤ `version`.
    #[must_use]
    pub fn preferred(&self, version: &PantsVersion) -> Option<&str> {
        self.thresholds
            .iter()
            .find(|row| row.minimum <= *version)
            .map(|row| row.runtime.as_str())
    }

    /// Probe order for `version`: the preferred runtime, then every fallback runtime
    /// not already listed, in fallback order.
    #[must_use]
    pub fn candidates(&self, version: &PantsVersion) -> RuntimeCandidates {
        let mut runtimes: Vec<String> = Vec::with_capacity(self.fallback.len() + 1);
        if let Some(preferred) = self.preferred(version) {
            runtimes.push(preferred.to_string());
        }
        for runtime in &self.fallback {
            if !runtimes.contains(runtime) {
                runtimes.push(runtime.clone());
            }
        }
        RuntimeCandidates::new(runtimes)
    }

    /// Interpreter spelling of a runtime (`cp310` → `cpython310`).
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::UnsupportedRuntime`] for runtimes this launcher cannot
    /// provision.
    pub fn interpreter_id(runtime: &str) -> Result<String, LauncherError> {
        if !SUPPORTED_RUNTIMES.contains(&runtime) {
            return Err(LauncherError::UnsupportedRuntime {
                runtime: runtime.to_string(),
            });
        }
        Ok(format!("cpython{}", &runtime[2..]))
    }
}
