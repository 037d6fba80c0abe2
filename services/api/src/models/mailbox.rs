//! Gifts and mailboxes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::inventory::{InventoryItem, ItemSource};

/// Kind of payload a gift carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftType {
    Character,
    Credits,
}

/// What the recipient decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimAction {
    Accept,
    Reject,
}

impl ClaimAction {
    pub fn past_tense(self) -> &'static str {
        match self {
            ClaimAction::Accept => "accepted",
            ClaimAction::Reject => "rejected",
        }
    }
}

/// Gift payload: a character description or a credit amount
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftData {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inventory keys only the server assigns; sender-supplied copies are dropped
const SERVER_ASSIGNED: [&str; 4] = ["id", "type", "source", "acquiredDate"];

impl GiftData {
    /// Inventory entry for a character carried by this gift
    pub fn to_inventory_item(&self, source: ItemSource) -> InventoryItem {
        let mut extra = self.extra.clone();
        for key in SERVER_ASSIGNED {
            extra.remove(key);
        }

        InventoryItem {
            id: Uuid::new_v4(),
            item_type: "character".to_string(),
            character_id: self.character_id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            description: self.description.clone(),
            price: self.price,
            source,
            acquired_date: Utc::now(),
            extra,
        }
    }
}

/// A gift waiting in (or already handled from) a mailbox
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub recipient_id: Uuid,
    pub gift_type: GiftType,
    pub gift_data: GiftData,
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub claimed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ClaimAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
}

/// Request to send a gift
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendGiftRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub gift_type: GiftType,
    #[serde(default)]
    pub gift_data: GiftData,
    #[serde(default)]
    pub message: Option<String>,
}

/// Request to accept or reject a gift
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimGiftRequest {
    pub user_id: Uuid,
    pub gift_id: Uuid,
    pub action: ClaimAction,
}
