//! Collection storage for the SkyParty backend
//!
//! Every logical entity set (users, transactions, per-user inventories and
//! mailboxes, ...) is persisted as one named JSON document. A
//! [`CollectionStore`] reads and writes whole documents; [`Storage`] wraps a
//! store with per-collection locks and typed helpers so services can run a
//! read-modify-write sequence without another request interleaving.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{StorageError, StorageResult},
    locks::{CollectionLocks, LockSet},
};

pub mod file;
pub mod memory;
pub mod postgres;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Backend contract for named collections
///
/// A write replaces the whole document. Nothing spans collections: two writes
/// are two independent operations.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Read a collection, or `None` if it has never been written
    async fn read(&self, name: &str) -> StorageResult<Option<Value>>;

    /// Replace a collection with `data`
    async fn write(&self, name: &str, data: &Value) -> StorageResult<()>;

    /// Names of every stored collection
    async fn list(&self) -> StorageResult<Vec<String>>;
}

/// Check that a collection name is safe to use as a file stem or key
pub fn validate_collection_name(name: &str) -> StorageResult<()> {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("Failed to compile name regex"));

    if regex.is_match(name) {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

/// Shared handle to a collection store plus its write locks
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn CollectionStore>,
    locks: CollectionLocks,
}

impl Storage {
    /// Wrap a backend
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            store,
            locks: CollectionLocks::default(),
        }
    }

    /// Take exclusive access to the named collections until the returned
    /// [`LockSet`] is dropped
    ///
    /// A task must not request a second lock set while it still holds one.
    pub async fn lock<I, S>(&self, names: I) -> LockSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locks.acquire(names).await
    }

    /// Load a collection as `T`, yielding `T::default()` when it is absent
    pub async fn load<T>(&self, name: &str) -> StorageResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.read_raw(name).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    /// Persist `value` as the whole collection
    pub async fn save<T>(&self, name: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.write_raw(name, &value).await
    }

    /// Read a collection without interpreting its shape
    pub async fn read_raw(&self, name: &str) -> StorageResult<Option<Value>> {
        validate_collection_name(name)?;
        self.store.read(name).await
    }

    /// Write a collection without checking its shape
    pub async fn write_raw(&self, name: &str, value: &Value) -> StorageResult<()> {
        validate_collection_name(name)?;
        self.store.write(name, value).await
    }

    /// Names of every stored collection
    pub async fn collection_names(&self) -> StorageResult<Vec<String>> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("users").is_ok());
        assert!(validate_collection_name("inventory_6f1c0c4e-9a8b-4c52-9f0e-3d8f4b0a1e22").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("../etc/passwd").is_err());
        assert!(validate_collection_name("users.json").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_collection_yields_default() {
        let storage = storage();

        let counter: Counter = storage.load("counter").await.unwrap();
        assert_eq!(counter, Counter::default());

        let map: BTreeMap<String, u32> = storage.load("nothing_here").await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = storage();
        storage.save("counter", &Counter { hits: 3 }).await.unwrap();

        let counter: Counter = storage.load("counter").await.unwrap();
        assert_eq!(counter.hits, 3);
    }

    #[tokio::test]
    async fn test_invalid_names_are_rejected() {
        let storage = storage();
        let result = storage.save("../escape", &Counter::default()).await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_locked_read_modify_write_does_not_lose_updates() {
        let storage = storage();
        storage.save("counter", &Counter::default()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                let _guard = storage.lock(["counter"]).await;
                let mut counter: Counter = storage.load("counter").await.unwrap();
                tokio::task::yield_now().await;
                counter.hits += 1;
                storage.save("counter", &counter).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counter: Counter = storage.load("counter").await.unwrap();
        assert_eq!(counter.hits, 16);
    }
}
