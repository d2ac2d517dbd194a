//! CSV file codec.
//!
//! A document is a header row followed by one line per item. Fields are
//! separated by a comma; the encoder always writes `", "` and the decoder
//! accepts any amount of whitespace after the comma.
//!
//! Only `text` is quoted. It may contain the delimiter, and embedded double
//! quotes are doubled. A `text` containing a line break cannot be framed in
//! this format and is rejected by the encoder.

use crate::error::{CodecError, CodecResult};
use crate::item::{Importance, Item};
use crate::timestamp::Timestamp;
use crate::{ItemCodec, FIELD_NAMES};

/// Field delimiter.
pub const CSV_DELIMITER: char = ',';

/// The header row written at the top of every document.
pub const CSV_HEADER: &str = "id, text, importance, deadline, done, created_at, changed_at, color";

const QUOTE: char = '"';

/// Codec for the CSV format.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl CsvCodec {
    /// Creates a CSV codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encodes one item as a single line (without line terminator).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unrepresentable`] if a field would break the
    /// line framing or the field grammar.
    pub fn encode_item(item: &Item) -> CodecResult<String> {
        let id = item.id();
        if id.is_empty() || id.contains([CSV_DELIMITER, QUOTE, '\n', '\r']) {
            return Err(CodecError::unrepresentable(
                id,
                "id must be non-empty and free of delimiters, quotes and line breaks",
            ));
        }
        if item.text().contains(['\n', '\r']) {
            return Err(CodecError::unrepresentable(id, "text contains a line break"));
        }
        if let Some(color) = item.color() {
            if color.contains([CSV_DELIMITER, QUOTE, '\n', '\r']) {
                return Err(CodecError::unrepresentable(
                    id,
                    "color contains a delimiter, quote or line break",
                ));
            }
            if color.is_empty() || color.starts_with(char::is_whitespace) {
                return Err(CodecError::unrepresentable(
                    id,
                    "color is empty or starts with whitespace",
                ));
            }
        }

        let escaped = item.text().replace(QUOTE, "\"\"");
        let importance = if item.importance().is_basic() {
            ""
        } else {
            item.importance().as_str()
        };
        let optional_time = |ts: Option<Timestamp>| ts.map(|t| t.to_wire()).unwrap_or_default();

        let fields = [
            id.to_string(),
            format!("{QUOTE}{escaped}{QUOTE}"),
            importance.to_string(),
            optional_time(item.deadline()),
            item.done().to_string(),
            item.created_at().to_wire(),
            optional_time(item.changed_at()),
            item.color().unwrap_or_default().to_string(),
        ];
        Ok(fields.join(", "))
    }

    /// Decodes a single record line.
    ///
    /// Returns `None` if the line does not match the record grammar.
    #[must_use]
    pub fn decode_line(line: &str) -> Option<Item> {
        let mut reader = FieldReader::new(line);

        let id = reader.bare()?;
        if id.is_empty() {
            return None;
        }
        reader.delimiter()?;
        let text = reader.quoted()?;
        reader.delimiter()?;
        let importance = parse_importance(reader.bare()?)?;
        reader.delimiter()?;
        let deadline = parse_optional_time(reader.bare()?)?;
        reader.delimiter()?;
        let done = parse_bool(reader.bare()?)?;
        reader.delimiter()?;
        let created_at = Timestamp::parse_wire(reader.bare()?)?;
        reader.delimiter()?;
        let changed_at = parse_optional_time(reader.bare()?)?;
        reader.delimiter()?;
        let color = reader.bare()?;
        if !reader.is_exhausted() {
            return None;
        }

        Some(
            Item::new(id, text, created_at)
                .with_importance(importance)
                .with_deadline(deadline)
                .with_done(done)
                .with_changed_at(changed_at)
                .with_color((!color.is_empty()).then(|| color.to_string())),
        )
    }

    fn check_header(line: &str) -> CodecResult<()> {
        let matches = line
            .split(CSV_DELIMITER)
            .map(str::trim)
            .eq(FIELD_NAMES.iter().copied());
        if matches {
            Ok(())
        } else {
            Err(CodecError::document(format!("unexpected CSV header {line:?}")))
        }
    }
}

impl ItemCodec for CsvCodec {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn encode(&self, items: &[Item]) -> CodecResult<Vec<u8>> {
        let mut out = String::from(CSV_HEADER);
        for item in items {
            out.push('\n');
            out.push_str(&Self::encode_item(item)?);
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<Item>> {
        let document = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::document(format!("invalid UTF-8: {e}")))?;

        let mut lines = document
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line));

        let header = lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .ok_or_else(|| CodecError::document("missing CSV header"))?;
        Self::check_header(header)?;

        let mut skipped = 0usize;
        let items: Vec<Item> = lines
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let item = Self::decode_line(line);
                if item.is_none() {
                    skipped += 1;
                }
                item
            })
            .collect();

        if skipped > 0 {
            tracing::debug!(skipped, "dropped malformed CSV records");
        }
        Ok(items)
    }
}

fn parse_importance(raw: &str) -> Option<Importance> {
    if raw.is_empty() {
        Some(Importance::Basic)
    } else {
        raw.parse().ok()
    }
}

fn parse_optional_time(raw: &str) -> Option<Option<Timestamp>> {
    if raw.is_empty() {
        Some(None)
    } else {
        Timestamp::parse_wire(raw).map(Some)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Cursor over one record line.
///
/// Each method consumes one grammar element and returns `None` when the input
/// does not match, leaving the caller to discard the line.
struct FieldReader<'a> {
    rest: &'a str,
}

impl<'a> FieldReader<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// An unquoted field: everything up to the next delimiter or line end.
    fn bare(&mut self) -> Option<&'a str> {
        let input: &'a str = self.rest;
        let end = input.find([CSV_DELIMITER, QUOTE]).unwrap_or(input.len());
        if input[end..].starts_with(QUOTE) {
            return None;
        }
        let (field, rest) = input.split_at(end);
        self.rest = rest;
        Some(field)
    }

    /// A quoted field with doubled inner quotes.
    fn quoted(&mut self) -> Option<String> {
        let input: &'a str = self.rest;
        let body = input.strip_prefix(QUOTE)?;
        let mut chars = body.char_indices();
        let mut value = String::new();

        while let Some((idx, ch)) = chars.next() {
            if ch != QUOTE {
                value.push(ch);
                continue;
            }
            if body[idx + 1..].starts_with(QUOTE) {
                chars.next();
                value.push(QUOTE);
                continue;
            }
            self.rest = &body[idx + 1..];
            return Some(value);
        }
        None
    }

    /// A comma followed by optional whitespace.
    fn delimiter(&mut self) -> Option<()> {
        self.rest = self.rest.strip_prefix(CSV_DELIMITER)?.trim_start();
        Some(())
    }

    fn is_exhausted(&self) -> bool {
        self.rest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis).unwrap()
    }

    #[test]
    fn encode_minimal_item() {
        let item = Item::new("123", "Text", ts(123_123));
        assert_eq!(
            CsvCodec::encode_item(&item).unwrap(),
            "123, \"Text\", , , false, 123.123, , "
        );
    }

    #[test]
    fn encode_full_item() {
        let item = Item::new("A-1", "say \"hi\", then go", ts(1_000))
            .with_importance(Importance::Low)
            .with_deadline(Some(ts(2_500)))
            .with_done(true)
            .with_changed_at(Some(ts(1_500)))
            .with_color(Some("#00FF00".into()));
        assert_eq!(
            CsvCodec::encode_item(&item).unwrap(),
            "A-1, \"say \"\"hi\"\", then go\", low, 2.5, true, 1, 1.5, #00FF00"
        );
    }

    #[test]
    fn decode_scenario_line() {
        let item = CsvCodec::decode_line("123, \"Text\", , , false, 123.123, , ").unwrap();
        assert_eq!(item, Item::new("123", "Text", ts(123_123)));
    }

    #[test]
    fn decode_accepts_any_whitespace_after_comma() {
        let tight = CsvCodec::decode_line("1,\"a, b\",important,,true,10,,").unwrap();
        let loose = CsvCodec::decode_line("1,   \"a, b\",\timportant, ,  true,10, ,").unwrap();
        assert_eq!(tight, loose);
        assert_eq!(tight.text(), "a, b");
        assert_eq!(tight.importance(), Importance::Important);
        assert!(tight.done());
    }

    #[test]
    fn decode_unescapes_quotes() {
        let text = "Text1, Text2: \", ,, .; \"\"\" \"\" \"\"";
        let item = Item::new("123", text, ts(1)).with_done(true);
        let line = CsvCodec::encode_item(&item).unwrap();
        assert_eq!(CsvCodec::decode_line(&line).unwrap(), item);
    }

    #[test]
    fn decode_text_edge_cases() {
        for text in ["", "\"", "\"\"", "ends with quote\"", ",", "\", \""] {
            let item = Item::new("x", text, ts(0));
            let line = CsvCodec::encode_item(&item).unwrap();
            assert_eq!(CsvCodec::decode_line(&line), Some(item), "text {text:?}");
        }
    }

    #[test]
    fn decode_rejects_malformed_lines() {
        let bad = [
            "",
            ", \"Text\", , , false, 1, , ",
            "1, Text, , , false, 1, , ",
            "1, \"Text, , , false, 1, , ",
            "1, \"Te\"xt\", , , false, 1, , ",
            "1, \"Text\", urgent, , false, 1, , ",
            "1, \"Text\", , soon, false, 1, , ",
            "1, \"Text\", , , maybe, 1, , ",
            "1, \"Text\", , , false, , , ",
            "1, \"Text\", , , false, 1e3, , ",
            "1, \"Text\", , , false, 1, , , extra",
            "1, \"Text\", , , false, 1",
            "1 \"Text\", , , false, 1, , ",
        ];
        for line in bad {
            assert!(CsvCodec::decode_line(line).is_none(), "accepted {line:?}");
        }
    }

    #[test]
    fn decode_accepts_explicit_basic_and_integer_times() {
        let item = CsvCodec::decode_line("1, \"t\", basic, 5, false, 3, 4, ").unwrap();
        assert_eq!(item.importance(), Importance::Basic);
        assert_eq!(item.deadline(), Some(ts(5_000)));
        assert_eq!(item.created_at(), ts(3_000));
        assert_eq!(item.changed_at(), Some(ts(4_000)));
    }

    #[test]
    fn encode_rejects_line_breaks() {
        let item = Item::new("1", "two\nlines", ts(0));
        assert!(matches!(
            CsvCodec::encode_item(&item),
            Err(CodecError::Unrepresentable { .. })
        ));

        let item = Item::new("1,2", "text", ts(0));
        assert!(CsvCodec::encode_item(&item).is_err());

        let item = Item::new("1", "text", ts(0)).with_color(Some("#1,2".into()));
        assert!(CsvCodec::encode_item(&item).is_err());
    }

    #[test]
    fn encode_rejects_colors_that_would_not_read_back() {
        for color in ["", " #FFFFFF", "\t#FFFFFF"] {
            let item = Item::new("1", "t", ts(1_000)).with_color(Some(color.into()));
            assert!(
                matches!(
                    CsvCodec::encode_item(&item),
                    Err(CodecError::Unrepresentable { .. })
                ),
                "{color:?}"
            );
        }

        let item = Item::new("1", "t", ts(1_000)).with_color(Some("#FFFFFF ".into()));
        let line = CsvCodec::encode_item(&item).unwrap();
        assert_eq!(CsvCodec::decode_line(&line), Some(item));
    }

    #[test]
    fn document_scenario() {
        let doc = "id, text, importance, deadline, done, created_at, changed_at, color\n\
                   123, \"Text\", , , false, 123.123, , ";
        let items = CsvCodec::new().decode(doc.as_bytes()).unwrap();
        assert_eq!(items, vec![Item::new("123", "Text", ts(123_123))]);
    }

    #[test]
    fn document_skips_bad_lines_and_blank_lines() {
        let doc = "id,text,importance,deadline,done,created_at,changed_at,color\r\n\
                   1, \"ok\", , , false, 1, , \r\n\
                   \r\n\
                   garbage\r\n\
                   2, \"also ok\", low, , true, 2, , #FFFFFF\r\n";
        let items = CsvCodec::new().decode(doc.as_bytes()).unwrap();
        let ids: Vec<_> = items.iter().map(Item::id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(items[1].color(), Some("#FFFFFF"));
    }

    #[test]
    fn document_errors() {
        let codec = CsvCodec::new();
        assert!(codec.decode(b"").unwrap_err().is_document_error());
        assert!(codec
            .decode(b"id, text, done\n1, \"t\", false")
            .unwrap_err()
            .is_document_error());
        assert!(codec.decode(&[0xc3, 0x28]).unwrap_err().is_document_error());
    }

    #[test]
    fn document_roundtrip() {
        let items = vec![
            Item::new("1", "first, with comma", ts(1_000)),
            Item::new("2", "second \"quoted\"", ts(2_000))
                .with_importance(Importance::Important)
                .with_deadline(Some(ts(9_999)))
                .with_changed_at(Some(ts(3_000))),
        ];
        let codec = CsvCodec::new();
        let bytes = codec.encode(&items).unwrap();
        assert!(bytes.starts_with(CSV_HEADER.as_bytes()));
        assert_eq!(codec.decode(&bytes).unwrap(), items);
    }

    #[test]
    fn empty_collection_is_header_only() {
        let codec = CsvCodec::new();
        let bytes = codec.encode(&[]).unwrap();
        assert_eq!(bytes, CSV_HEADER.as_bytes());
        assert!(codec.decode(&bytes).unwrap().is_empty());
    }
}
