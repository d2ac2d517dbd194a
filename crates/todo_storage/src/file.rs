//! File-based storage backend for persistent snapshots.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A file-based storage backend.
///
/// The snapshot lives in a single named file. Writes go to a uniquely named
/// sibling temporary file first, are synced to disk, and then renamed over
/// the target, so a crash mid-write never leaves a half-written snapshot and
/// concurrent writers never share a temporary file.
///
/// # Example
///
/// ```no_run
/// use todo_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("items.json"));
/// backend.write_all(b"[]").unwrap();
/// assert_eq!(backend.read_all().unwrap(), b"[]");
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// The file is not touched until the first read or write.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Creates a backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(path))
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_file(&self) -> StorageResult<NamedTempFile> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::Corrupted(format!("{:?} has no file name", self.path)))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut prefix = OsString::from(".");
        prefix.push(name);
        prefix.push(".");
        Ok(tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)?)
    }
}

impl StorageBackend for FileBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    fn write_all(&mut self, data: &[u8]) -> StorageResult<()> {
        // The temporary file is removed on drop if any step fails.
        let mut temp = self.temp_file()?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;

        tracing::debug!(path = ?self.path, bytes = data.len(), "snapshot written");
        Ok(())
    }

    fn exists(&self) -> StorageResult<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_missing_is_io_not_found() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("missing.json"));

        assert!(!backend.exists().unwrap());
        let err = backend.read_all().unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");

        let mut backend = FileBackend::new(&path);
        backend.write_all(b"hello").unwrap();

        assert!(backend.exists().unwrap());
        assert_eq!(backend.read_all().unwrap(), b"hello");
    }

    #[test]
    fn file_write_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.csv");

        let mut backend = FileBackend::new(&path);
        backend.write_all(b"a much longer first snapshot").unwrap();
        backend.write_all(b"short").unwrap();

        assert_eq!(backend.read_all().unwrap(), b"short");
    }

    #[test]
    fn file_persistence_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");

        {
            let mut backend = FileBackend::new(&path);
            backend.write_all(b"persistent data").unwrap();
        }

        let backend = FileBackend::new(&path);
        assert_eq!(backend.read_all().unwrap(), b"persistent data");
    }

    #[test]
    fn file_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");

        let mut backend = FileBackend::new(&path);
        backend.write_all(b"[]").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("items.json")]);
    }

    #[test]
    fn concurrent_writers_do_not_share_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");

        let writers: Vec<_> = (0..8u8)
            .map(|n| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut backend = FileBackend::new(&path);
                    let data = vec![b'a' + n; 64 * 1024];
                    for _ in 0..10 {
                        backend.write_all(&data).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let contents = FileBackend::new(&path).read_all().unwrap();
        assert_eq!(contents.len(), 64 * 1024);
        assert!(contents.iter().all(|b| *b == contents[0]));

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("items.json");

        let mut backend = FileBackend::with_create_dirs(&path).unwrap();
        backend.write_all(b"[]").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent").join("items.json");

        let mut backend = FileBackend::new(&path);
        assert!(matches!(backend.write_all(b"[]"), Err(StorageError::Io(_))));
    }

    #[test]
    fn file_path_and_describe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");

        let backend = FileBackend::new(&path);
        assert_eq!(backend.path(), path);
        assert!(backend.describe().ends_with("items.json"));
    }
}
