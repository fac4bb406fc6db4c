use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One source page flattened to Markdown, alive for a single pipeline pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRecord {
    pub title: String,
    pub body: String,
    pub meta_description: Option<String>,
    pub short_description: Option<String>,
    pub featured_sentence: Option<String>,
}

impl PageRecord {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }
}

/// Outbound create-item payload for the destination collection.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItemRequest {
    pub is_archived: bool,
    pub is_draft: bool,
    /// Field slug -> value; always holds `name` and the body field.
    pub field_data: Map<String, Value>,
}

/// Created item as returned by the destination. Only the id is interpreted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CollectionItem {
    #[serde(default)]
    pub id: Option<String>,
    /// Older API versions key the id as `_id`; some responses carry both.
    #[serde(default, rename = "_id")]
    pub legacy_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionItem {
    /// The assigned id under either key, preferring `id`.
    pub fn item_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.legacy_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_request_uses_camel_case_flags() {
        let mut field_data = Map::new();
        field_data.insert("name".into(), json!("Hello"));
        let req = CollectionItemRequest {
            is_archived: false,
            is_draft: true,
            field_data,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({ "isArchived": false, "isDraft": true, "fieldData": { "name": "Hello" } })
        );
    }

    #[test]
    fn collection_item_accepts_legacy_id_key() {
        let item: CollectionItem =
            serde_json::from_value(json!({ "_id": "abc", "slug": "hello" })).unwrap();
        assert_eq!(item.item_id(), Some("abc"));
        assert_eq!(item.extra["slug"], "hello");

        let item: CollectionItem = serde_json::from_value(json!({ "id": "v2" })).unwrap();
        assert_eq!(item.item_id(), Some("v2"));

        let item: CollectionItem = serde_json::from_value(json!({})).unwrap();
        assert_eq!(item.item_id(), None);
    }

    #[test]
    fn collection_item_with_both_id_keys_decodes() {
        let item: CollectionItem =
            serde_json::from_value(json!({ "id": "new", "_id": "old", "isDraft": true })).unwrap();
        assert_eq!(item.item_id(), Some("new"));
        assert_eq!(item.legacy_id.as_deref(), Some("old"));
        assert!(!item.extra.contains_key("_id"));
    }
}
