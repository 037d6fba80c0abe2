//! Aggregate statistics, backup and restore

use chrono::{Duration, Utc};
use common::store::{Storage, validate_collection_name};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::models::{
    admin::Stats, collections, economy::TransactionLog, game::SessionLog, user::UserBook,
};

/// A user counts as active if they logged in within this window
const ACTIVE_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AdminService {
    storage: Storage,
}

impl AdminService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Counters computed by scanning the users, transactions and sessions
    ///
    /// The circulating credit total saturates at `i64::MAX`.
    pub async fn stats(&self) -> ServiceResult<Stats> {
        let users: UserBook = self.storage.load(collections::USERS).await?;
        let log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;
        let sessions: SessionLog = self.storage.load(collections::GAME_SESSIONS).await?;

        let active_since = Utc::now() - Duration::days(ACTIVE_WINDOW_DAYS);

        Ok(Stats {
            total_users: users.len(),
            active_users: users
                .iter()
                .filter(|user| user.last_login >= active_since)
                .count(),
            activated_users: users.iter().filter(|user| user.activated).count(),
            total_transactions: log.total(),
            total_game_sessions: sessions.total(),
            total_credits_in_circulation: users
                .iter()
                .fold(0i64, |total, user| total.saturating_add(user.game_credits)),
        })
    }

    /// Every stored collection, keyed by name
    pub async fn backup(&self) -> ServiceResult<Map<String, Value>> {
        let mut backup = Map::new();
        for name in self.storage.collection_names().await? {
            if let Some(data) = self.storage.read_raw(&name).await? {
                backup.insert(name, data);
            }
        }

        info!("Backup taken of {} collections", backup.len());
        Ok(backup)
    }

    /// Overwrite each named collection with the given document
    ///
    /// Documents are written verbatim. Returns the number of collections
    /// restored.
    pub async fn restore(&self, backup: Map<String, Value>) -> ServiceResult<usize> {
        for name in backup.keys() {
            if validate_collection_name(name).is_err() {
                warn!("Restore rejected: invalid collection name {:?}", name);
                return Err(ServiceError::Validation(format!(
                    "Invalid collection name: {name}"
                )));
            }
        }

        let _lock = self.storage.lock(backup.keys().cloned()).await;
        for (name, data) in &backup {
            self.storage.write_raw(name, data).await?;
        }

        info!("Restored {} collections", backup.len());
        Ok(backup.len())
    }
}
