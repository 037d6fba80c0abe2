//! Gift sending and claiming
//!
//! A claim touches up to five collections: the recipient's mailbox, both
//! inventories, the users and the transaction log. All of them are locked for
//! the whole claim, so a gift can be claimed at most once.

use chrono::Utc;
use common::store::Storage;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    economy::apply_credit_change,
    user_not_found,
};
use crate::models::{
    collections,
    economy::{TransactionKind, TransactionLog},
    inventory::{InventoryItem, ItemSource},
    mailbox::{ClaimAction, Gift, GiftData, GiftType},
    user::UserBook,
};

/// Payload validated for its gift type
enum Payload<'a> {
    Character(&'a str),
    Credits(i64),
}

fn payload(gift_type: GiftType, data: &GiftData) -> ServiceResult<Payload<'_>> {
    match gift_type {
        GiftType::Character => data
            .character_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(Payload::Character)
            .ok_or_else(|| {
                ServiceError::Validation("Character gifts need a characterId".to_string())
            }),
        GiftType::Credits => match data.amount {
            Some(amount) if amount > 0 => Ok(Payload::Credits(amount)),
            _ => Err(ServiceError::Validation(
                "Credit gifts need a positive amount".to_string(),
            )),
        },
    }
}

#[derive(Clone)]
pub struct MailboxService {
    storage: Storage,
}

impl MailboxService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Gifts in a user's mailbox, newest first
    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<Gift>> {
        Ok(self.storage.load(&collections::mailbox(user_id)).await?)
    }

    /// Put a gift at the front of the recipient's mailbox
    ///
    /// Credit gifts are paid for by the sender when sent.
    pub async fn send_gift(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        gift_type: GiftType,
        gift_data: GiftData,
        message: Option<String>,
    ) -> ServiceResult<Gift> {
        let payload = payload(gift_type, &gift_data)?;

        let mailbox_name = collections::mailbox(recipient_id);
        let _lock = self
            .storage
            .lock([
                collections::USERS.to_string(),
                collections::TRANSACTIONS.to_string(),
                mailbox_name.clone(),
            ])
            .await;

        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        if users.find_by_id(recipient_id).is_none() {
            return Err(ServiceError::NotFound(
                "Sender or recipient not found".to_string(),
            ));
        }
        let sender = users.find_by_id_mut(sender_id).ok_or_else(|| {
            ServiceError::NotFound("Sender or recipient not found".to_string())
        })?;
        let sender_username = sender.username.clone();

        if let Payload::Credits(amount) = payload {
            let mut log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;
            apply_credit_change(sender, &mut log, -amount, TransactionKind::GiftSent)?;
            self.storage.save(collections::USERS, &users).await?;
            self.storage.save(collections::TRANSACTIONS, &log).await?;
        }

        let gift = Gift {
            id: Uuid::new_v4(),
            sender_id,
            sender_username,
            recipient_id,
            gift_type,
            gift_data,
            message: message.unwrap_or_default(),
            timestamp: Utc::now(),
            read: false,
            claimed: false,
            resolution: None,
            claimed_at: None,
        };

        let mut mailbox: Vec<Gift> = self.storage.load(&mailbox_name).await?;
        mailbox.insert(0, gift.clone());
        self.storage.save(&mailbox_name, &mailbox).await?;

        info!(
            "User {} sent {:?} gift {} to user {}",
            sender_id, gift_type, gift.id, recipient_id
        );
        Ok(gift)
    }

    /// Accept or reject a gift and apply its effects
    ///
    /// Accepting a character adds it to the recipient's inventory and owned
    /// set; accepting credits pays the recipient. Rejecting returns a character
    /// to the sender's inventory or refunds credits to the sender.
    pub async fn claim_gift(
        &self,
        user_id: Uuid,
        gift_id: Uuid,
        action: ClaimAction,
    ) -> ServiceResult<Gift> {
        let mailbox_name = collections::mailbox(user_id);

        // The sender's inventory is only known once the gift has been read.
        let preview: Vec<Gift> = self.storage.load(&mailbox_name).await?;
        let sender_id = preview
            .iter()
            .find(|gift| gift.id == gift_id)
            .map(|gift| gift.sender_id)
            .ok_or_else(gift_not_found)?;

        let _lock = self
            .storage
            .lock([
                mailbox_name.clone(),
                collections::USERS.to_string(),
                collections::TRANSACTIONS.to_string(),
                collections::inventory(user_id),
                collections::inventory(sender_id),
            ])
            .await;

        let mut mailbox: Vec<Gift> = self.storage.load(&mailbox_name).await?;
        let index = mailbox
            .iter()
            .position(|gift| gift.id == gift_id)
            .ok_or_else(gift_not_found)?;
        let mut gift = mailbox[index].clone();

        if gift.claimed {
            warn!("User {} tried to claim gift {} twice", user_id, gift_id);
            return Err(ServiceError::AlreadyClaimed);
        }

        match (action, payload(gift.gift_type, &gift.gift_data)?) {
            (ClaimAction::Accept, Payload::Character(character_id)) => {
                let mut users: UserBook = self.storage.load(collections::USERS).await?;
                let user = users.find_by_id_mut(user_id).ok_or_else(user_not_found)?;
                let granted = user.grant_character(character_id);

                self.append_inventory(user_id, gift.gift_data.to_inventory_item(ItemSource::Gift))
                    .await?;
                if granted {
                    self.storage.save(collections::USERS, &users).await?;
                }
            }
            (ClaimAction::Accept, Payload::Credits(amount)) => {
                self.credit(user_id, amount, TransactionKind::GiftReceived)
                    .await?
                    .ok_or_else(user_not_found)?;
            }
            (ClaimAction::Reject, Payload::Character(_)) => {
                self.append_inventory(
                    gift.sender_id,
                    gift.gift_data.to_inventory_item(ItemSource::Returned),
                )
                .await?;
            }
            (ClaimAction::Reject, Payload::Credits(amount)) => {
                let refunded = self
                    .credit(gift.sender_id, amount, TransactionKind::GiftRefund)
                    .await?;
                if refunded.is_none() {
                    warn!(
                        "Sender {} of gift {} no longer exists, refund dropped",
                        gift.sender_id, gift_id
                    );
                }
            }
        }

        gift.claimed = true;
        gift.read = true;
        gift.resolution = Some(action);
        gift.claimed_at = Some(Utc::now());
        mailbox[index] = gift.clone();
        self.storage.save(&mailbox_name, &mailbox).await?;

        info!(
            "User {} {} gift {} from user {}",
            user_id,
            action.past_tense(),
            gift_id,
            gift.sender_id
        );
        Ok(gift)
    }

    async fn append_inventory(&self, user_id: Uuid, item: InventoryItem) -> ServiceResult<()> {
        let name = collections::inventory(user_id);
        let mut inventory: Vec<InventoryItem> = self.storage.load(&name).await?;
        inventory.push(item);
        self.storage.save(&name, &inventory).await?;
        Ok(())
    }

    /// Credit a user inside an already locked claim; `None` if the user is gone
    async fn credit(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
    ) -> ServiceResult<Option<i64>> {
        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let Some(user) = users.find_by_id_mut(user_id) else {
            return Ok(None);
        };

        let mut log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;
        let new_balance = apply_credit_change(user, &mut log, amount, kind)?;
        self.storage.save(collections::USERS, &users).await?;
        self.storage.save(collections::TRANSACTIONS, &log).await?;

        Ok(Some(new_balance))
    }
}

fn gift_not_found() -> ServiceError {
    ServiceError::NotFound("Gift not found".to_string())
}
