//! The keyed item collection and its persistence hooks.

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use std::collections::hash_map::{self, HashMap};
use todo_codec::{Format, Item, ItemCodec};
use todo_storage::{FileBackend, StorageBackend};

/// An in-memory collection of items keyed by id.
///
/// The store owns no file or network handle of its own; it reaches its
/// persisted snapshot only through the backend and codec it was built with.
///
/// # Concurrency
///
/// The store is not internally synchronized. Callers own it from a single
/// context; mutation methods take `&mut self`.
#[derive(Debug)]
pub struct ItemStore<B, C> {
    items: HashMap<String, Item>,
    backend: B,
    codec: C,
}

impl<B: StorageBackend, C: ItemCodec> ItemStore<B, C> {
    /// Creates an empty store over `backend`, encoding with `codec`.
    pub fn new(backend: B, codec: C) -> Self {
        Self {
            items: HashMap::new(),
            backend,
            codec,
        }
    }

    /// Inserts or replaces the item at `item.id()`.
    ///
    /// Returns the previous value, which lets callers tell a create from an
    /// update.
    pub fn add(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.id().to_string(), item)
    }

    /// Removes the item with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Item> {
        self.items.remove(id)
    }

    /// Removes every item. Nothing is persisted until [`save`](Self::save).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the item with `id`.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Returns true if an item with `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the items in unspecified order.
    pub fn iter(&self) -> hash_map::Values<'_, String, Item> {
        self.items.values()
    }

    /// All items ordered by creation time, ties broken by id.
    pub fn items_by_creation(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        items
    }

    /// Reads the persisted snapshot and merges it into the collection.
    ///
    /// Entries are merged with [`add`](Self::add); the collection is not
    /// cleared first. The whole document is decoded before anything is
    /// merged, so a document-level error leaves the store unchanged.
    /// Malformed records inside a valid document are skipped by the codec.
    ///
    /// Returns the number of items merged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the snapshot cannot be read, or
    /// [`CoreError::Codec`] if it is not a valid document.
    pub fn load(&mut self) -> CoreResult<usize> {
        let bytes = self.backend.read_all()?;
        let decoded = self.codec.decode(&bytes)?;
        let count = decoded.len();
        for item in decoded {
            self.add(item);
        }
        tracing::debug!(
            codec = self.codec.name(),
            backend = %self.backend.describe(),
            count,
            total = self.items.len(),
            "loaded items"
        );
        Ok(count)
    }

    /// Like [`load`](Self::load), but a missing snapshot is not an error.
    ///
    /// Returns `Ok(false)` when there was nothing to load.
    ///
    /// # Errors
    ///
    /// Returns any error other than "not found" from [`load`](Self::load).
    pub fn load_if_present(&mut self) -> CoreResult<bool> {
        match self.load() {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => {
                tracing::debug!(backend = %self.backend.describe(), "no snapshot to load");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Writes the full collection, replacing the previous snapshot.
    ///
    /// Items are written in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Codec`] if an item cannot be represented in the
    /// codec's format, or [`CoreError::Storage`] if the write fails. The
    /// previous snapshot is left intact in both cases.
    pub fn save(&mut self) -> CoreResult<()> {
        let items = self.items_by_creation();
        let bytes = self.codec.encode(&items)?;
        self.backend.write_all(&bytes)?;
        tracing::debug!(
            codec = self.codec.name(),
            backend = %self.backend.describe(),
            count = items.len(),
            bytes = bytes.len(),
            "saved items"
        );
        Ok(())
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl ItemStore<FileBackend, Format> {
    /// Builds an empty store backed by the file named in `config`.
    ///
    /// Missing parent directories are created. Nothing is read until
    /// [`load`](Self::load) is called.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] for an empty file name, or a
    /// storage error if the directory cannot be created.
    pub fn open_file(config: &StoreConfig) -> CoreResult<Self> {
        if config.file_name.trim().is_empty() {
            return Err(CoreError::invalid_operation("store file name is empty"));
        }
        let backend = FileBackend::with_create_dirs(&config.path())?;
        Ok(Self::new(backend, config.resolved_format()))
    }
}

impl<'a, B, C> IntoIterator for &'a ItemStore<B, C> {
    type Item = &'a Item;
    type IntoIter = hash_map::Values<'a, String, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
