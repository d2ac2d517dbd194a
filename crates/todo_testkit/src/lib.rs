//! # Todo Testkit
//!
//! Test utilities shared by the workspace crates.
//!
//! This crate provides:
//! - Fixtures: sample items and temporary file-backed stores
//! - Property-based generators for [`todo_codec::Item`] using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use todo_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn roundtrip(item in item_strategy()) {
//!         // ...
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::{sample_items, ts, TempStore};
    pub use crate::generators::{csv_safe_item_strategy, item_strategy, timestamp_strategy};
}
