//! Admin statistics and backups

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregate counters over every collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: usize,
    /// Users who logged in during the last seven days
    pub active_users: usize,
    pub activated_users: usize,
    pub total_transactions: usize,
    pub total_game_sessions: usize,
    pub total_credits_in_circulation: i64,
}

/// Request to overwrite collections from a backup
#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub backup: Map<String, Value>,
}
