//! Game session log

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One finished game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: Uuid,
    pub game_type: String,
    pub earned_credits: i64,
    pub played_at: DateTime<Utc>,
    /// Seconds
    pub duration: u32,
}

/// The `game_sessions` collection: per-user sessions in play order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLog(BTreeMap<Uuid, Vec<GameSession>>);

impl SessionLog {
    pub fn append(&mut self, user_id: Uuid, session: GameSession) {
        self.0.entry(user_id).or_default().push(session);
    }

    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Request to record a played game
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayGameRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub game_type: String,
    pub earned_credits: i64,
}

/// Result of recording a game
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOutcome {
    pub earned_credits: i64,
    pub new_balance: i64,
    pub session: GameSession,
}
