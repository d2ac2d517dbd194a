//! CLI command implementations.

pub mod items;
pub mod sync;
pub mod transfer;

use std::path::{Path, PathBuf};
use thiserror::Error;
use todo_codec::Format;
use todo_core::{CoreResult, ItemStore, StoreConfig};
use todo_storage::FileBackend;

/// Errors specific to command handling.
#[derive(Debug, Error)]
pub enum CliError {
    /// The file extension names no supported format.
    #[error("cannot tell the format of {0:?}; use a .json or .csv file")]
    UnknownFormat(PathBuf),

    /// No item with the given id.
    #[error("no item with id {0}")]
    NotFound(String),

    /// A deadline outside the supported range.
    #[error("deadline {0} is out of range")]
    InvalidDeadline(i64),

    /// An output format other than text or json.
    #[error("unknown output format {0:?}; expected text or json")]
    UnknownOutput(String),
}

/// Opens the configured store and loads its snapshot, if any.
pub fn open_store(config: &StoreConfig) -> CoreResult<ItemStore<FileBackend, Format>> {
    let mut store = ItemStore::open_file(config)?;
    store.load_if_present()?;
    Ok(store)
}

/// Picks the file format for `path` from its extension.
pub fn format_for(path: &Path) -> Result<Format, CliError> {
    Format::from_path(path).ok_or_else(|| CliError::UnknownFormat(path.to_path_buf()))
}

/// Output style of commands that support `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Human-readable lines.
    Text,
    /// JSON.
    Json,
}

impl Output {
    /// Parses the `--format` argument.
    pub fn parse(raw: &str) -> Result<Self, CliError> {
        match raw.to_ascii_lowercase().as_str() {
            "text" => Ok(Output::Text),
            "json" => Ok(Output::Json),
            _ => Err(CliError::UnknownOutput(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_outputs() {
        assert_eq!(format_for(Path::new("a/b.csv")).unwrap(), Format::Csv);
        assert!(matches!(
            format_for(Path::new("notes.txt")),
            Err(CliError::UnknownFormat(_))
        ));
        assert_eq!(Output::parse("JSON").unwrap(), Output::Json);
        assert!(Output::parse("yaml").is_err());
    }
}
