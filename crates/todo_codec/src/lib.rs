//! # Todo Codec
//!
//! The [`Item`] value type and the two interchangeable file formats used to
//! persist a collection of items.
//!
//! ## Formats
//!
//! - [`JsonCodec`] - a JSON array of per-item objects, no envelope
//! - [`CsvCodec`] - a header row followed by one line per item
//!
//! Both formats share the same decoding policy: a malformed *document* is an
//! error, a malformed *record* inside a valid document is skipped.
//!
//! ## Timestamps
//!
//! Time fields are written as seconds since the Unix epoch with up to
//! millisecond precision (`123.123`, or `1700000000` for whole seconds).
//! Decoders accept both integer and fractional values.
//!
//! ## Usage
//!
//! ```
//! use todo_codec::{Item, ItemCodec, JsonCodec, CsvCodec, Timestamp};
//!
//! let created = Timestamp::from_millis(123_123).unwrap();
//! let item = Item::new("123", "Text", created);
//!
//! let json = JsonCodec::new().encode(&[item.clone()]).unwrap();
//! assert_eq!(JsonCodec::new().decode(&json).unwrap(), vec![item.clone()]);
//!
//! let csv = CsvCodec::new().encode(&[item.clone()]).unwrap();
//! assert_eq!(CsvCodec::new().decode(&csv).unwrap(), vec![item]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod csv;
mod error;
mod format;
mod item;
mod json;
mod timestamp;

pub use crate::csv::{CsvCodec, CSV_DELIMITER, CSV_HEADER};
pub use error::{CodecError, CodecResult};
pub use format::Format;
pub use item::{Importance, Item};
pub use json::JsonCodec;
pub use timestamp::Timestamp;

/// Field names shared by both file formats, in CSV column order.
pub const FIELD_NAMES: [&str; 8] = [
    "id",
    "text",
    "importance",
    "deadline",
    "done",
    "created_at",
    "changed_at",
    "color",
];

/// A paired encoder/decoder between a collection of items and bytes.
///
/// Implementations hold no mutable state and can be shared freely.
pub trait ItemCodec: Send + Sync {
    /// Short name of the format, used in logs.
    fn name(&self) -> &'static str;

    /// Encodes `items` in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error if an item cannot be represented in this format.
    fn encode(&self, items: &[Item]) -> CodecResult<Vec<u8>>;

    /// Decodes a whole document.
    ///
    /// Records that fail validation are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Document`] if the document itself is malformed.
    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<Item>>;
}
