//! Game session recording

use chrono::Utc;
use common::store::Storage;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use super::{
    ServiceResult,
    economy::{apply_credit_change, require_non_negative},
    require, user_not_found,
};
use crate::models::{
    collections,
    economy::{TransactionKind, TransactionLog},
    game::{GameSession, PlayOutcome, SessionLog},
    user::UserBook,
};

/// Recorded sessions last between 5 and 35 minutes
const DURATION_SECS: std::ops::Range<u32> = 300..2100;

#[derive(Clone)]
pub struct GameService {
    storage: Storage,
}

impl GameService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Credit the winnings and log the session
    ///
    /// Session duration is not reported by the client and is generated at
    /// random.
    pub async fn play(
        &self,
        user_id: Uuid,
        game_type: &str,
        earned_credits: i64,
    ) -> ServiceResult<PlayOutcome> {
        require(game_type, "Game type is required")?;
        require_non_negative(earned_credits, "Earned credits")?;

        let _lock = self
            .storage
            .lock([
                collections::USERS,
                collections::TRANSACTIONS,
                collections::GAME_SESSIONS,
            ])
            .await;

        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let mut log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;
        let user = users.find_by_id_mut(user_id).ok_or_else(user_not_found)?;
        let new_balance =
            apply_credit_change(user, &mut log, earned_credits, TransactionKind::GameReward)?;

        self.storage.save(collections::USERS, &users).await?;
        self.storage.save(collections::TRANSACTIONS, &log).await?;

        let session = GameSession {
            id: Uuid::new_v4(),
            game_type: game_type.to_string(),
            earned_credits,
            played_at: Utc::now(),
            duration: rand::thread_rng().gen_range(DURATION_SECS),
        };
        let mut sessions: SessionLog = self.storage.load(collections::GAME_SESSIONS).await?;
        sessions.append(user_id, session.clone());
        self.storage.save(collections::GAME_SESSIONS, &sessions).await?;

        info!(
            "User {} played {} and earned {} credits",
            user_id, game_type, earned_credits
        );
        Ok(PlayOutcome {
            earned_credits,
            new_balance,
            session,
        })
    }
}
