//! Import and export between the store and JSON/CSV files.

use super::{format_for, open_store};
use std::path::Path;
use todo_core::{ItemStore, StoreConfig};
use todo_storage::FileBackend;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Replaces the store contents with the items in `path`.
///
/// The source is decoded before the store is touched, so a malformed file
/// leaves the store as it was.
pub fn import(config: &StoreConfig, path: &Path) -> CommandResult<usize> {
    let mut source = ItemStore::new(FileBackend::new(path), format_for(path)?);
    source.load()?;

    let mut store = open_store(config)?;
    store.clear();
    for item in source.items_by_creation() {
        store.add(item);
    }
    store.save()?;
    tracing::info!(count = store.len(), from = %path.display(), "imported items");
    Ok(store.len())
}

/// Writes the store contents to `path`, replacing the file.
pub fn export(config: &StoreConfig, path: &Path) -> CommandResult<usize> {
    let store = open_store(config)?;
    let mut target = ItemStore::new(FileBackend::new(path), format_for(path)?);
    for item in store.iter() {
        target.add(item.clone());
    }
    target.save()?;
    tracing::info!(count = target.len(), to = %path.display(), "exported items");
    Ok(target.len())
}
