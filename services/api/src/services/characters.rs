//! Character purchase and selection

use common::store::Storage;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    economy::{apply_credit_change, require_non_negative},
    require, user_not_found,
};
use crate::models::{
    character::{CharacterData, PurchaseOutcome},
    collections,
    economy::{TransactionKind, TransactionLog},
    inventory::InventoryItem,
    user::UserBook,
};

#[derive(Clone)]
pub struct CharacterService {
    storage: Storage,
}

impl CharacterService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Spend credits on a character and record it in the inventory
    ///
    /// Buying a character that is already owned still charges the price and
    /// adds another inventory entry; the owned set is unchanged.
    pub async fn purchase(
        &self,
        user_id: Uuid,
        character_id: &str,
        character: &CharacterData,
    ) -> ServiceResult<PurchaseOutcome> {
        require(character_id, "Character id is required")?;
        require_non_negative(character.price, "Price")?;

        let inventory_name = collections::inventory(user_id);
        let _lock = self
            .storage
            .lock([
                collections::USERS.to_string(),
                collections::TRANSACTIONS.to_string(),
                inventory_name.clone(),
            ])
            .await;

        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let mut log: TransactionLog = self.storage.load(collections::TRANSACTIONS).await?;

        let user = users.find_by_id_mut(user_id).ok_or_else(user_not_found)?;
        let new_balance =
            apply_credit_change(user, &mut log, -character.price, TransactionKind::Purchase)?;
        user.grant_character(character_id);
        let owned_characters = user.owned_characters.clone();

        self.storage.save(collections::USERS, &users).await?;
        self.storage.save(collections::TRANSACTIONS, &log).await?;

        let mut inventory: Vec<InventoryItem> = self.storage.load(&inventory_name).await?;
        inventory.push(InventoryItem::purchased_character(character_id, character));
        self.storage.save(&inventory_name, &inventory).await?;

        info!(
            "User {} purchased {} for {} credits",
            user_id, character_id, character.price
        );
        Ok(PurchaseOutcome {
            new_balance,
            owned_characters,
        })
    }

    /// Make an owned character the active one
    pub async fn select(&self, user_id: Uuid, character_id: &str) -> ServiceResult<String> {
        let _lock = self.storage.lock([collections::USERS]).await;
        let mut users: UserBook = self.storage.load(collections::USERS).await?;
        let user = users.find_by_id_mut(user_id).ok_or_else(user_not_found)?;

        if !user.owns(character_id) {
            warn!("User {} tried to select unowned {}", user_id, character_id);
            return Err(ServiceError::Validation("Character not owned".to_string()));
        }

        user.current_character = character_id.to_string();
        self.storage.save(collections::USERS, &users).await?;

        info!("User {} selected {}", user_id, character_id);
        Ok(character_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::inventory::ItemSource,
        services::{
            UserService,
            test_support::{passwords, storage},
        },
    };

    fn panda(price: i64) -> CharacterData {
        CharacterData {
            price,
            name: Some("Panda".to_string()),
            icon: Some("🐼".to_string()),
            description: None,
        }
    }

    async fn setup() -> (CharacterService, Storage, Uuid) {
        let storage = storage();
        let user = UserService::new(storage.clone(), passwords())
            .register("ana", "ana@example.com", "pw")
            .await
            .unwrap();
        (CharacterService::new(storage.clone()), storage, user.id)
    }

    #[tokio::test]
    async fn test_purchase_deducts_and_grants() {
        let (characters, storage, user_id) = setup().await;

        let outcome = characters
            .purchase(user_id, "panda", &panda(50))
            .await
            .unwrap();
        assert_eq!(outcome.new_balance, 100);
        assert_eq!(outcome.owned_characters, vec!["kitty", "panda"]);

        let inventory: Vec<InventoryItem> = storage
            .load(&collections::inventory(user_id))
            .await
            .unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].source, ItemSource::Purchase);
        assert_eq!(inventory[0].character_id.as_deref(), Some("panda"));

        let log: TransactionLog = storage.load(collections::TRANSACTIONS).await.unwrap();
        assert_eq!(log.for_user(user_id)[0].amount, -50);
    }

    #[tokio::test]
    async fn test_purchase_is_idempotent_on_ownership() {
        let (characters, _, user_id) = setup().await;
        characters
            .purchase(user_id, "panda", &panda(10))
            .await
            .unwrap();
        let outcome = characters
            .purchase(user_id, "panda", &panda(10))
            .await
            .unwrap();
        assert_eq!(outcome.owned_characters, vec!["kitty", "panda"]);
        assert_eq!(outcome.new_balance, 130);
    }

    #[tokio::test]
    async fn test_purchase_with_insufficient_credits_changes_nothing() {
        let (characters, storage, user_id) = setup().await;

        let result = characters.purchase(user_id, "dragon", &panda(151)).await;
        assert!(matches!(
            result,
            Err(ServiceError::InsufficientFunds { .. })
        ));

        let users: UserBook = storage.load(collections::USERS).await.unwrap();
        let user = users.find_by_id(user_id).unwrap();
        assert_eq!(user.game_credits, 150);
        assert!(!user.owns("dragon"));
    }

    #[tokio::test]
    async fn test_select_requires_ownership() {
        let (characters, _, user_id) = setup().await;

        let unowned = characters.select(user_id, "panda").await;
        assert!(matches!(unowned, Err(ServiceError::Validation(_))));

        characters
            .purchase(user_id, "panda", &panda(50))
            .await
            .unwrap();
        assert_eq!(characters.select(user_id, "panda").await.unwrap(), "panda");

        let missing = characters.select(Uuid::new_v4(), "kitty").await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }
}
