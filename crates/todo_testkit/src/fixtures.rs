//! Test fixtures and store helpers.
//!
//! Provides sample items and temporary file-backed stores that clean up
//! after themselves.

use std::path::PathBuf;
use tempfile::TempDir;
use todo_codec::{Format, Importance, Item, Timestamp};
use todo_core::ItemStore;
use todo_storage::FileBackend;

/// Shorthand for a timestamp from milliseconds.
///
/// # Panics
///
/// Panics if `millis` is out of range.
pub fn ts(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).expect("timestamp in range")
}

/// A small, varied set of items, including awkward CSV text.
pub fn sample_items() -> Vec<Item> {
    vec![
        Item::new("123", "Text1, Text2: \", ,, .; \"\"\" \"\" \"\"", ts(1_000))
            .with_done(true),
        Item::new("456", "Text", ts(2_000))
            .with_importance(Importance::Important)
            .with_deadline(Some(ts(86_400_000)))
            .with_changed_at(Some(ts(3_000))),
        Item::new("789", "Low priority", ts(1_500))
            .with_importance(Importance::Low)
            .with_color(Some("#FF8800".into())),
    ]
}

/// A file-backed store in a temporary directory.
pub struct TempStore {
    /// The store instance.
    pub store: ItemStore<FileBackend, Format>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TempStore {
    /// Creates an empty store persisting to `items.<format>`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new(format: Format) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(format!("items.{}", format.extension()));
        let store = ItemStore::new(FileBackend::new(&path), format);
        Self {
            store,
            _temp_dir: temp_dir,
            path,
        }
    }

    /// Path of the persisted snapshot.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// A second store reading the same file, as a fresh process would.
    pub fn reopen(&self) -> ItemStore<FileBackend, Format> {
        ItemStore::new(FileBackend::new(&self.path), *self.store.codec())
    }
}

impl std::ops::Deref for TempStore {
    type Target = ItemStore<FileBackend, Format>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TempStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}
