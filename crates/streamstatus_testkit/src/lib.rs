//! # StreamStatus Testkit
//!
//! Test utilities for StreamStatus.
//!
//! This crate provides:
//! - Sample status documents
//! - A local bare git remote (`TestRemote`) so repository tests need no network
//! - Signed webhook deliveries built independently of the server's verifier
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use streamstatus_testkit::prelude::*;
//!
//! #[test]
//! fn clone_and_read() {
//!     let remote = TestRemote::with_document("index.md", SAMPLE_DOCUMENT);
//!     // point a working copy at remote.url(), clone into remote.workdir()
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod signing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::signing::*;
}

pub use fixtures::*;
pub use generators::*;
pub use signing::*;
