//! Common library for the SkyParty backend
//!
//! This crate provides the storage layer shared by the services: the
//! collection store contract and its file, PostgreSQL and in-memory backends,
//! per-collection locking, PostgreSQL pool helpers and the storage error type.

pub mod database;
pub mod error;
pub mod locks;
pub mod store;

/// Example usage of the storage layer
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use common::store::{FileStore, Storage};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let storage = Storage::new(Arc::new(FileStore::open("data").await?));
///     let _guard = storage.lock(["users"]).await;
///     let users: serde_json::Map<String, serde_json::Value> = storage.load("users").await?;
///     println!("{} users", users.len());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
