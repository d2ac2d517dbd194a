//! # Todo Storage
//!
//! Backing media for persisted item snapshots.
//!
//! A backend stores exactly one opaque byte snapshot. It does not know
//! whether the bytes are JSON, CSV or anything else; the item store pairs a
//! backend with a codec and owns all format interpretation.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - A single named file, replaced atomically on write
//!
//! ## Example
//!
//! ```rust
//! use todo_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! assert!(!backend.exists().unwrap());
//!
//! backend.write_all(b"[]").unwrap();
//! assert_eq!(backend.read_all().unwrap(), b"[]");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
