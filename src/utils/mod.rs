//! Cross-platform utilities.
//!
//! - [`platform`] - Host platform tag detection and executable naming

pub mod platform;

pub use platform::PlatformTag;
