//! JSON file codec.
//!
//! A document is a bare array of objects, one per item. Optional fields are
//! omitted rather than written as `null`, and `importance` is omitted when it
//! is `basic`.

use crate::error::{CodecError, CodecResult};
use crate::item::{Importance, Item};
use crate::timestamp::Timestamp;
use crate::ItemCodec;
use serde_json::{Map, Value};

const ID: &str = "id";
const TEXT: &str = "text";
const IMPORTANCE: &str = "importance";
const DEADLINE: &str = "deadline";
const DONE: &str = "done";
const CREATED_AT: &str = "created_at";
const CHANGED_AT: &str = "changed_at";
const COLOR: &str = "color";
/// Key used by older snapshots for the color tag; read but never written.
const LEGACY_COLOR: &str = "hex_color";

/// Codec for the JSON array-of-objects format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Creates a codec producing compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec producing indented output.
    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Encodes one item into its field map.
    #[must_use]
    pub fn encode_item(item: &Item) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(ID.into(), Value::from(item.id()));
        map.insert(TEXT.into(), Value::from(item.text()));
        if !item.importance().is_basic() {
            map.insert(IMPORTANCE.into(), Value::from(item.importance().as_str()));
        }
        if let Some(deadline) = item.deadline() {
            map.insert(DEADLINE.into(), Value::from(deadline.as_secs_f64()));
        }
        map.insert(DONE.into(), Value::from(item.done()));
        map.insert(CREATED_AT.into(), Value::from(item.created_at().as_secs_f64()));
        if let Some(changed_at) = item.changed_at() {
            map.insert(CHANGED_AT.into(), Value::from(changed_at.as_secs_f64()));
        }
        if let Some(color) = item.color() {
            map.insert(COLOR.into(), Value::from(color));
        }
        map
    }

    /// Decodes one field map.
    ///
    /// Returns `None` when `id`, `text` or `created_at` is missing or has the
    /// wrong type. Every other field falls back to its default.
    #[must_use]
    pub fn decode_item(value: &Value) -> Option<Item> {
        let map = value.as_object()?;

        let id = map.get(ID)?.as_str()?;
        let text = map.get(TEXT)?.as_str()?;
        let created_at = time_field(map, CREATED_AT)?;

        let importance = map
            .get(IMPORTANCE)
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Importance>().ok())
            .unwrap_or_default();
        let done = map.get(DONE).and_then(Value::as_bool).unwrap_or(false);
        let color = map
            .get(COLOR)
            .or_else(|| map.get(LEGACY_COLOR))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Some(
            Item::new(id, text, created_at)
                .with_importance(importance)
                .with_deadline(time_field(map, DEADLINE))
                .with_done(done)
                .with_changed_at(time_field(map, CHANGED_AT))
                .with_color(color),
        )
    }
}

fn time_field(map: &Map<String, Value>, key: &str) -> Option<Timestamp> {
    map.get(key)
        .and_then(Value::as_f64)
        .and_then(Timestamp::from_secs_f64)
}

impl ItemCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, items: &[Item]) -> CodecResult<Vec<u8>> {
        let document = Value::Array(
            items
                .iter()
                .map(|item| Value::Object(Self::encode_item(item)))
                .collect(),
        );

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        };
        bytes.map_err(|e| CodecError::encoding_failed(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<Item>> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::document(format!("invalid JSON: {e}")))?;

        let Value::Array(records) = document else {
            return Err(CodecError::document("expected a JSON array of items"));
        };

        let total = records.len();
        let items: Vec<Item> = records.iter().filter_map(Self::decode_item).collect();
        if items.len() < total {
            tracing::debug!(
                skipped = total - items.len(),
                "dropped malformed JSON records"
            );
        }
        Ok(items)
    }
}
