//! Runtime choice between the file formats.

use crate::csv::CsvCodec;
use crate::error::{CodecError, CodecResult};
use crate::item::Item;
use crate::json::JsonCodec;
use crate::ItemCodec;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One of the supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// JSON array of objects.
    #[default]
    Json,
    /// CSV with a header row.
    Csv,
}

impl Format {
    /// Picks a format from a file extension (`.json` or `.csv`, any case).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// The conventional file extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            _ => Err(CodecError::invalid_field("format", s)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl ItemCodec for Format {
    fn name(&self) -> &'static str {
        self.extension()
    }

    fn encode(&self, items: &[Item]) -> CodecResult<Vec<u8>> {
        match self {
            Format::Json => JsonCodec::new().encode(items),
            Format::Csv => CsvCodec::new().encode(items),
        }
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<Item>> {
        match self {
            Format::Json => JsonCodec::new().decode(bytes),
            Format::Csv => CsvCodec::new().decode(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(Format::from_path(Path::new("a/items.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("items.CSV")), Some(Format::Csv));
        assert_eq!(Format::from_path(Path::new("items.txt")), None);
        assert_eq!(Format::from_path(Path::new("items")), None);
    }

    #[test]
    fn delegates_to_codecs() {
        let items = vec![Item::new("1", "t", Timestamp::from_millis(1).unwrap())];
        for format in [Format::Json, Format::Csv] {
            let bytes = format.encode(&items).unwrap();
            assert_eq!(format.decode(&bytes).unwrap(), items);
            assert_eq!(format.name(), format.to_string());
        }
    }

    #[test]
    fn formats_are_not_interchangeable_on_decode() {
        let csv = Format::Csv.encode(&[]).unwrap();
        assert!(Format::Json.decode(&csv).is_err());
        let json = Format::Json.encode(&[]).unwrap();
        assert!(Format::Csv.decode(&json).is_err());
    }
}
