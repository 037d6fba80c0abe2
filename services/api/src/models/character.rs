//! Character purchase and selection payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalogue entry sent along with a purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterData {
    pub price: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to buy a character
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub character_id: String,
    pub character_data: CharacterData,
}

/// Request to switch the active character
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub character_id: String,
}

/// Result of a successful purchase
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOutcome {
    pub new_balance: i64,
    pub owned_characters: Vec<String>,
}
