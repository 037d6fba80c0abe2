//! Inventory listing and free-form additions

use common::store::Storage;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, user_not_found};
use crate::models::{collections, inventory::InventoryItem, user::UserBook};

#[derive(Clone)]
pub struct InventoryService {
    storage: Storage,
}

impl InventoryService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Items a user has acquired, oldest first; empty for unknown users
    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<InventoryItem>> {
        Ok(self.storage.load(&collections::inventory(user_id)).await?)
    }

    /// Append a client-described item
    pub async fn add(&self, user_id: Uuid, item: Map<String, Value>) -> ServiceResult<InventoryItem> {
        let users: UserBook = self.storage.load(collections::USERS).await?;
        if users.find_by_id(user_id).is_none() {
            return Err(user_not_found());
        }

        let item = InventoryItem::from_client(item)
            .map_err(|e| ServiceError::Validation(format!("Invalid item: {e}")))?;

        let name = collections::inventory(user_id);
        let _lock = self.storage.lock([name.clone()]).await;
        let mut inventory: Vec<InventoryItem> = self.storage.load(&name).await?;
        inventory.push(item.clone());
        self.storage.save(&name, &inventory).await?;

        info!("Added item {} to inventory of user {}", item.id, user_id);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        UserService,
        test_support::{passwords, storage},
    };
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_add_appends_in_order() {
        let storage = storage();
        let user = UserService::new(storage.clone(), passwords())
            .register("ana", "ana@example.com", "pw")
            .await
            .unwrap();
        let inventory = InventoryService::new(storage);

        assert!(inventory.list(user.id).await.unwrap().is_empty());

        inventory
            .add(user.id, object(json!({"name": "Hat", "type": "object"})))
            .await
            .unwrap();
        inventory
            .add(user.id, object(json!({"name": "Scarf"})))
            .await
            .unwrap();

        let items = inventory.list(user.id).await.unwrap();
        let names: Vec<_> = items.iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec!["Hat", "Scarf"]);
        assert_eq!(items[0].item_type, "object");
    }

    #[tokio::test]
    async fn test_add_for_unknown_user() {
        let inventory = InventoryService::new(storage());
        let result = inventory.add(Uuid::new_v4(), Map::new()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_inventory() {
        let inventory = InventoryService::new(storage());
        assert!(inventory.list(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
