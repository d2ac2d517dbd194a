//! The wire form of an item.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use todo_codec::{Importance, Item, Timestamp};

/// An item as the remote service sends and receives it.
///
/// Time fields are whole seconds since the Unix epoch; sub-second
/// precision is dropped on this leg. `importance` is always present,
/// including `basic`, and `changed_at` is never absent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemNetworkModel {
    /// Item id.
    pub id: String,
    /// Item text.
    pub text: String,
    /// `low`, `basic` or `important`.
    pub importance: String,
    /// Optional deadline, epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    /// Completion flag.
    pub done: bool,
    /// Optional color tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Creation time, epoch seconds.
    pub created_at: i64,
    /// Last change time, epoch seconds.
    pub changed_at: i64,
    /// Identifier of the device that made the last change.
    pub last_updated_by: String,
}

impl ItemNetworkModel {
    /// Builds the wire form of `item`, attributed to `device_id`.
    ///
    /// A missing `changed_at` is sent as `created_at`.
    pub fn from_item(item: &Item, device_id: &str) -> Self {
        let created_at = item.created_at().as_secs();
        Self {
            id: item.id().to_string(),
            text: item.text().to_string(),
            importance: item.importance().as_str().to_string(),
            deadline: item.deadline().map(|t| t.as_secs()),
            done: item.done(),
            color: item.color().map(str::to_string),
            created_at,
            changed_at: item.changed_at().map_or(created_at, |t| t.as_secs()),
            last_updated_by: device_id.to_string(),
        }
    }

    /// Converts back to a domain item.
    ///
    /// `changed_at == created_at` maps back to an absent `changed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownImportance`] for an importance the
    /// client does not know, or [`ProtocolError::TimestampOutOfRange`].
    pub fn into_item(self) -> ProtocolResult<Item> {
        let importance: Importance =
            self.importance
                .parse()
                .map_err(|_| ProtocolError::UnknownImportance {
                    id: self.id.clone(),
                    value: self.importance.clone(),
                })?;

        let secs = |field: &'static str, value: i64| {
            Timestamp::from_secs(value).ok_or_else(|| ProtocolError::TimestampOutOfRange {
                id: self.id.clone(),
                field,
                value,
            })
        };

        let created_at = secs("created_at", self.created_at)?;
        let deadline = self.deadline.map(|d| secs("deadline", d)).transpose()?;
        let changed_at = if self.changed_at == self.created_at {
            None
        } else {
            Some(secs("changed_at", self.changed_at)?)
        };

        Ok(Item::new(self.id, self.text, created_at)
            .with_importance(importance)
            .with_deadline(deadline)
            .with_done(self.done)
            .with_changed_at(changed_at)
            .with_color(self.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs).unwrap()
    }

    #[test]
    fn changed_at_falls_back_to_created_at() {
        let item = Item::new("a", "x", ts(100));
        let wire = ItemNetworkModel::from_item(&item, "device-1");
        assert_eq!(wire.created_at, 100);
        assert_eq!(wire.changed_at, 100);
        assert_eq!(wire.importance, "basic");
        assert_eq!(wire.last_updated_by, "device-1");

        assert_eq!(wire.into_item().unwrap(), item);
    }

    #[test]
    fn full_item_survives_wire() {
        let item = Item::new("a", "x", ts(100))
            .with_importance(Importance::Important)
            .with_deadline(Some(ts(500)))
            .with_done(true)
            .with_changed_at(Some(ts(200)))
            .with_color(Some("#00FF00".into()));
        let wire = ItemNetworkModel::from_item(&item, "d");
        assert_eq!(wire.into_item().unwrap(), item);
    }

    #[test]
    fn sub_second_precision_is_dropped() {
        let item = Item::new("a", "x", Timestamp::from_millis(1_999).unwrap());
        let wire = ItemNetworkModel::from_item(&item, "d");
        assert_eq!(wire.created_at, 1);
    }

    #[test]
    fn unknown_importance_is_rejected() {
        let mut wire = ItemNetworkModel::from_item(&Item::new("a", "x", ts(1)), "d");
        wire.importance = "urgent".into();
        assert!(matches!(
            wire.into_item(),
            Err(ProtocolError::UnknownImportance { .. })
        ));
    }

    #[test]
    fn json_field_names() {
        let item = Item::new("a", "x", ts(1)).with_deadline(Some(ts(2)));
        let value = serde_json::to_value(ItemNetworkModel::from_item(&item, "d")).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "id",
            "text",
            "importance",
            "deadline",
            "done",
            "created_at",
            "changed_at",
            "last_updated_by",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("color"));
    }

    #[test]
    fn null_optionals_are_accepted() {
        let raw = r#"{"id":"a","text":"x","importance":"low","deadline":null,"done":false,
                      "color":null,"created_at":5,"changed_at":7,"last_updated_by":"web"}"#;
        let wire: ItemNetworkModel = serde_json::from_str(raw).unwrap();
        let item = wire.into_item().unwrap();
        assert_eq!(item.importance(), Importance::Low);
        assert_eq!(item.changed_at(), Some(ts(7)));
        assert!(item.deadline().is_none());
    }
}
