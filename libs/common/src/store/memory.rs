//! In-memory collection store, used by tests and throwaway deployments

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::CollectionStore;
use crate::error::StorageResult;

/// Collection store that keeps every document in a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn read(&self, name: &str) -> StorageResult<Option<Value>> {
        Ok(self.collections.read().await.get(name).cloned())
    }

    async fn write(&self, name: &str, data: &Value) -> StorageResult<()> {
        self.collections
            .write()
            .await
            .insert(name.to_string(), data.clone());
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
