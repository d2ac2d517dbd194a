//! # Todo Core
//!
//! The authoritative in-memory collection of items for one client.
//!
//! An [`ItemStore`] pairs a [`StorageBackend`](todo_storage::StorageBackend)
//! with an [`ItemCodec`](todo_codec::ItemCodec). It never talks to the
//! network; synchronization is layered on top by the sync engine, which only
//! reaches persistence through [`ItemStore::load`] and [`ItemStore::save`].
//!
//! ## Example
//!
//! ```rust
//! use todo_codec::{Item, JsonCodec, Timestamp};
//! use todo_core::ItemStore;
//! use todo_storage::InMemoryBackend;
//!
//! let mut store = ItemStore::new(InMemoryBackend::new(), JsonCodec::new());
//! let item = Item::new("1", "Buy milk", Timestamp::from_secs(10).unwrap());
//!
//! assert!(store.add(item.clone()).is_none());
//! store.save().unwrap();
//!
//! store.clear();
//! assert_eq!(store.load().unwrap(), 1);
//! assert_eq!(store.get("1"), Some(&item));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod store;

pub use config::StoreConfig;
pub use error::{CoreError, CoreResult};
pub use store::ItemStore;
