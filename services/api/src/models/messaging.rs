//! Conversations between two users

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// The one stored copy of a conversation between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub participants: [Uuid; 2],
    pub messages: Vec<Message>,
    pub last_activity: DateTime<Utc>,
}

impl Conversation {
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }
}

/// Key for the unordered pair `{a, b}`; identical for either argument order
pub fn pair_key(a: Uuid, b: Uuid) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{low}:{high}")
}

/// The `conversations` collection, keyed by [`pair_key`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationBook(BTreeMap<String, Conversation>);

impl ConversationBook {
    /// Conversation between `a` and `b`, created with `id` if it does not exist
    pub fn open(&mut self, a: Uuid, b: Uuid, id: Option<String>) -> &mut Conversation {
        let key = pair_key(a, b);
        self.0.entry(key.clone()).or_insert_with(|| Conversation {
            id: id.unwrap_or(key),
            participants: [a, b],
            messages: Vec::new(),
            last_activity: Utc::now(),
        })
    }

    /// Conversations `user_id` takes part in, most recently active first
    pub fn view_for(&self, user_id: Uuid) -> Vec<Conversation> {
        let mut conversations: Vec<Conversation> = self
            .0
            .values()
            .filter(|conversation| conversation.includes(user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        conversations
    }
}

/// Request to send a message
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}
