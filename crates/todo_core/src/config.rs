//! Store configuration.

use std::path::{Path, PathBuf};
use todo_codec::Format;

/// Default snapshot file name.
pub const DEFAULT_FILE_NAME: &str = "todo_items.json";

/// Where and how a file-backed store persists its snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the snapshot file.
    pub directory: PathBuf,

    /// Snapshot file name inside `directory`.
    pub file_name: String,

    /// Explicit format; when `None` it is inferred from the file extension.
    pub format: Option<Format>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: DEFAULT_FILE_NAME.to_string(),
            format: None,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory.
    #[must_use]
    pub fn directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    /// Sets the file name.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Forces a format regardless of the file extension.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Full path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// The format in effect: explicit, else by extension, else JSON.
    #[must_use]
    pub fn resolved_format(&self) -> Format {
        self.format
            .or_else(|| Format::from_path(Path::new(&self.file_name)))
            .unwrap_or_default()
    }
}
