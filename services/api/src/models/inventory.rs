//! Inventory items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::character::CharacterData;

/// How an item ended up in an inventory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Purchase,
    Gift,
    Returned,
    #[default]
    Default,
}

fn default_item_type() -> String {
    "item".to_string()
}

/// One acquired character or object
///
/// Fields the server does not interpret are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default)]
    pub source: ItemSource,
    pub acquired_date: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryItem {
    /// Inventory entry for a purchased character
    pub fn purchased_character(character_id: &str, data: &CharacterData) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_type: "character".to_string(),
            character_id: Some(character_id.to_string()),
            name: data.name.clone(),
            icon: data.icon.clone(),
            description: data.description.clone(),
            price: Some(data.price),
            source: ItemSource::Purchase,
            acquired_date: Utc::now(),
            extra: Map::new(),
        }
    }

    /// Build an item from a client-supplied object
    ///
    /// `id` and `acquiredDate` are always assigned by the server; `source`
    /// and `type` fall back to their defaults when absent.
    pub fn from_client(mut item: Map<String, Value>) -> Result<Self, serde_json::Error> {
        item.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        item.insert(
            "acquiredDate".to_string(),
            serde_json::to_value(Utc::now())?,
        );
        serde_json::from_value(Value::Object(item))
    }
}

/// Request to append an arbitrary item to an inventory
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub user_id: Uuid,
    pub item: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_client_keeps_unknown_fields() {
        let item = json!({"name": "Hat", "color": "red", "id": "client-chosen"});
        let Value::Object(map) = item else {
            unreachable!()
        };

        let item = InventoryItem::from_client(map).unwrap();
        assert_eq!(item.name.as_deref(), Some("Hat"));
        assert_eq!(item.item_type, "item");
        assert_eq!(item.source, ItemSource::Default);
        assert_eq!(item.extra["color"], "red");

        let json = serde_json::to_value(&item).unwrap();
        assert_ne!(json["id"], "client-chosen");
        assert_eq!(json["color"], "red");
        assert_eq!(json["source"], "default");
    }

    #[test]
    fn test_from_client_rejects_bad_source() {
        let Value::Object(map) = json!({"source": "stolen"}) else {
            unreachable!()
        };
        assert!(InventoryItem::from_client(map).is_err());
    }
}
