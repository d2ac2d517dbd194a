//! Property-based test generators using proptest.
//!
//! Provides strategies for generating items that respect the invariants of
//! each file format.

use proptest::prelude::*;
use todo_codec::{Importance, Item, Timestamp};

/// Latest generated instant: 2100-01-01T00:00:00Z.
const MAX_MILLIS: i64 = 4_102_444_800_000;

/// Strategy for millisecond-precision timestamps between 1970 and 2100.
pub fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
    (0..MAX_MILLIS).prop_map(|millis| {
        Timestamp::from_millis(millis).expect("generated millis are in range")
    })
}

/// Strategy for importance values.
pub fn importance_strategy() -> impl Strategy<Value = Importance> {
    prop_oneof![
        Just(Importance::Low),
        Just(Importance::Basic),
        Just(Importance::Important),
    ]
}

/// Strategy for item ids: no delimiters, quotes or whitespace.
pub fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9-]{1,36}").expect("Invalid regex")
}

/// Strategy for `#RRGGBB` color tags.
pub fn color_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("#[0-9A-F]{6}").expect("Invalid regex"))
}

fn item_with_text(text: impl Strategy<Value = String>) -> impl Strategy<Value = Item> {
    (
        id_strategy(),
        text,
        importance_strategy(),
        prop::option::of(timestamp_strategy()),
        any::<bool>(),
        timestamp_strategy(),
        prop::option::of(timestamp_strategy()),
        color_strategy(),
    )
        .prop_map(
            |(id, text, importance, deadline, done, created_at, changed_at, color)| {
                Item::new(id, text, created_at)
                    .with_importance(importance)
                    .with_deadline(deadline)
                    .with_done(done)
                    .with_changed_at(changed_at)
                    .with_color(color)
            },
        )
}

/// Strategy for arbitrary valid items; `text` may contain any character.
pub fn item_strategy() -> impl Strategy<Value = Item> {
    item_with_text(any::<String>())
}

/// Strategy for items whose `text` fits on one CSV line.
pub fn csv_safe_item_strategy() -> impl Strategy<Value = Item> {
    item_with_text(prop::string::string_regex("[^\r\n]{0,64}").expect("Invalid regex"))
}
