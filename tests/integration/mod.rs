//! Integration test suite for the Pants launcher
//!
//! End-to-end tests that run the compiled `pants-launcher` binary, plus tests of the
//! library API. None of them reach the internet: resolution is driven through artifact
//! override documents or the `test-utils` stub fetcher, and `self-update` talks to a
//! local mock server.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: Help, version reporting, platform, configuration errors and self-update
//! - **library**: Resolution through the public API with a stub fetcher
//! - **resolve**: Version resolution through override documents and env files
//! - **rollback**: Restoring the binary saved by a self-update

mod cli;
mod common;
mod library;
mod resolve;
mod rollback;
