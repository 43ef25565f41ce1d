//! Core types shared by every launcher module.
//!
//! The launcher separates two kinds of failure:
//! - **Recoverable** failures inside a fallback chain (a tier that yields nothing, a probe
//!   that misses). These are plain [`Result`]s or [`Option`]s consumed by the chain itself.
//! - **Fatal** failures, represented by [`LauncherError`] and rendered for users through
//!   [`ErrorContext`] and [`user_friendly_error`].
//!
//! The library never prints or exits; presentation is left to the binary.

pub mod error;

pub use error::{ErrorContext, LauncherError, user_friendly_error};
