//! Request and response envelopes.

use crate::model::ItemNetworkModel;
use serde::{Deserialize, Serialize};

/// The `status` value of a successful response.
pub const STATUS_OK: &str = "ok";

/// Body of single-item writes (add, edit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRequest {
    /// The item being written.
    pub element: ItemNetworkModel,
}

/// Body of the bulk update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    /// The complete list that replaces the remote one.
    pub list: Vec<ItemNetworkModel>,
}

/// Response of single-item operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementResponse {
    /// Service status string.
    pub status: String,
    /// The affected item.
    pub element: ItemNetworkModel,
    /// Remote revision after the operation.
    pub revision: i64,
}

/// Response of list-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Service status string.
    pub status: String,
    /// The full remote list.
    pub list: Vec<ItemNetworkModel>,
    /// Remote revision after the operation.
    pub revision: i64,
}

impl ElementResponse {
    /// Builds a successful response.
    pub fn ok(element: ItemNetworkModel, revision: i64) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            element,
            revision,
        }
    }
}

impl ListResponse {
    /// Builds a successful response.
    pub fn ok(list: Vec<ItemNetworkModel>, revision: i64) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            list,
            revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_response() {
        let raw = r#"{"status":"ok","revision":4,"list":[
            {"id":"a","text":"x","importance":"basic","done":true,
             "created_at":1,"changed_at":1,"last_updated_by":"web"}]}"#;
        let response: ListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.revision, 4);
        assert_eq!(response.list.len(), 1);
        assert!(response.list[0].done);
    }

    #[test]
    fn element_request_shape() {
        let raw = r#"{"element":{"id":"a","text":"x","importance":"low","done":false,
                     "created_at":1,"changed_at":2,"last_updated_by":"d"}}"#;
        let request: ElementRequest = serde_json::from_str(raw).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["element"]["importance"], "low");
        assert_eq!(value["element"]["changed_at"], 2);
    }
}
