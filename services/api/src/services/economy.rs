//! Credit balances and the transaction ledger

use chrono::Utc;
use common::store::Storage;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult, user_not_found};
use crate::models::{
    collections,
    economy::{CreditOperation, Transaction, TransactionKind, TransactionLog},
    user::{User, UserBook},
};

/// Apply a signed balance change to an already loaded user and record it
///
/// Fails without touching anything if the balance would go negative or
/// overflow. Returns the new balance.
pub(crate) fn apply_credit_change(
    user: &mut User,
    log: &mut TransactionLog,
    delta: i64,
    kind: TransactionKind,
) -> ServiceResult<i64> {
    let new_balance = user
        .game_credits
        .checked_add(delta)
        .ok_or_else(|| ServiceError::Validation("Credit amount is too large".to_string()))?;

    if new_balance < 0 {
        warn!(
            "Insufficient credits for user {}: balance {}, change {}",
            user.id, user.game_credits, delta
        );
        return Err(ServiceError::InsufficientFunds {
            required: -delta,
            available: user.game_credits,
        });
    }

    user.game_credits = new_balance;
    log.append(
        user.id,
        Transaction {
            id: Uuid::new_v4(),
            amount: delta,
            kind,
            timestamp: Utc::now(),
            balance: new_balance,
        },
    );

    Ok(new_balance)
}

pub(crate) fn require_non_negative(amount: i64, field: &str) -> ServiceResult<()> {
    if amount < 0 {
        return Err(ServiceError::Validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

/// Manual credit updates
#[derive(Clone)]
pub struct EconomyService {
    storage: Storage,
}

impl EconomyService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Add or subtract `amount` credits and log the transaction
    ///
    /// Returns the new balance.
    pub async fn update_credits(
        &self,
        user_id: Uuid,
        amount: i64,
        operation: CreditOperation,
    ) -> ServiceResult<i64> {
        require_non_negative(amount, "Amount")?;

        let _lock = self
            .storage
            .lock([collections::USERS, collections::TRANSACTIONS])
            .await;

        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let mut log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;

        let user = users.find_by_id_mut(user_id).ok_or_else(user_not_found)?;
        let delta = match operation {
            CreditOperation::Add => amount,
            CreditOperation::Subtract => -amount,
        };
        let new_balance = apply_credit_change(user, &mut log, delta, operation.into())?;

        self.storage.save(collections::USERS, &users).await?;
        self.storage.save(collections::TRANSACTIONS, &log).await?;

        info!(
            "Credits updated for user {}: {:?} {} -> balance {}",
            user_id, operation, amount, new_balance
        );
        Ok(new_balance)
    }

    /// Ledger entries for one user, oldest first
    pub async fn transactions(&self, user_id: Uuid) -> ServiceResult<Vec<Transaction>> {
        let log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;
        Ok(log.for_user(user_id).to_vec())
    }
}
