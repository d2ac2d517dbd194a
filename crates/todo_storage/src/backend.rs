//! Storage backend trait definition.

use crate::error::StorageResult;

/// A backing medium holding a single persisted snapshot.
///
/// Backends are **opaque byte stores**. The item store serializes its full
/// collection through a codec and hands the bytes to [`write_all`], which
/// replaces whatever was stored before.
///
/// # Invariants
///
/// - `read_all` returns exactly the bytes of the last successful `write_all`
/// - a failed `write_all` leaves the previous snapshot intact
/// - Backends must be `Send + Sync` so a store can move between tasks
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
///
/// [`write_all`]: StorageBackend::write_all
pub trait StorageBackend: Send + Sync {
    /// Reads the whole stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been stored yet or an I/O error occurs.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the stored snapshot with `data`.
    ///
    /// After this returns successfully the new snapshot is durable.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write_all(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns true if a snapshot has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the check itself fails.
    fn exists(&self) -> StorageResult<bool>;

    /// Short human-readable description of the location, used in logs.
    fn describe(&self) -> String;
}
