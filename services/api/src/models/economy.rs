//! Credit ledger

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a manual credit update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditOperation {
    Add,
    Subtract,
}

/// What caused a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Add,
    Subtract,
    Purchase,
    GiftSent,
    GiftReceived,
    GiftRefund,
    GameReward,
}

impl From<CreditOperation> for TransactionKind {
    fn from(operation: CreditOperation) -> Self {
        match operation {
            CreditOperation::Add => TransactionKind::Add,
            CreditOperation::Subtract => TransactionKind::Subtract,
        }
    }
}

/// One ledger entry: a signed delta and the balance it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub balance: i64,
}

/// The `transactions` collection: per-user entries in the order they happened
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLog(BTreeMap<Uuid, Vec<Transaction>>);

impl TransactionLog {
    pub fn append(&mut self, user_id: Uuid, transaction: Transaction) {
        self.0.entry(user_id).or_default().push(transaction);
    }

    pub fn for_user(&self, user_id: Uuid) -> &[Transaction] {
        self.0.get(&user_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of entries across every user
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Request for a manual credit update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreditsRequest {
    pub user_id: Uuid,
    pub amount: i64,
    pub operation: CreditOperation,
}
