//! Test utilities for the launcher.
//!
//! - [`StubFetcher`]: an in-memory [`Fetcher`](crate::fetch::Fetcher) returning canned
//!   responses per URL and recording every call, so tests can assert which fallback
//!   tiers were consulted and that nothing touched the network
//! - [`init_test_logging`]: one-time tracing setup for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use pants_launcher::test_utils::StubFetcher;
//!
//! let fetcher = StubFetcher::new()
//!     .with_text("https://example.com/VERSION", "2.18.0\n")
//!     .with_probe("https://example.com/pants.pex");
//! assert!(fetcher.calls().is_empty());
//! ```

pub mod stub_fetcher;

pub use stub_fetcher::{FetchCall, FetchKind, StubFetcher};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise `RUST_LOG`; with
/// neither, logging stays off.
///
/// ```bash
/// RUST_LOG=pants_launcher=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
