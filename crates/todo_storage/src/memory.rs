//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend keeps the snapshot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Example
///
/// ```rust
/// use todo_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.write_all(b"test data").unwrap();
/// assert_eq!(backend.data(), Some(b"test data".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
    fail_writes: bool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing snapshot.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            fail_writes: false,
        }
    }

    /// Creates a backend whose writes always fail.
    ///
    /// Useful for exercising "could not save" paths.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            data: RwLock::new(None),
            fail_writes: true,
        }
    }

    /// Returns a copy of the stored snapshot, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Forgets the stored snapshot.
    pub fn clear(&mut self) {
        *self.data.write() = None;
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.data.read().clone().ok_or(StorageError::Empty)
    }

    fn write_all(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "in-memory backend configured to fail writes",
            )));
        }
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn exists(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_some())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
