//! Per-collection async locks
//!
//! Collections are read, modified and written back as a whole, so two
//! requests touching the same collection must not interleave. Each collection
//! name maps to its own mutex; a [`LockSet`] holds several of them at once.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Registry of one async mutex per collection name
#[derive(Clone, Default)]
pub struct CollectionLocks {
    entries: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// Guards for a set of collections, released on drop
#[must_use = "the collections are unlocked as soon as the LockSet is dropped"]
pub struct LockSet {
    names: Vec<String>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LockSet {
    /// Collection names held by this set, sorted
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl CollectionLocks {
    /// Acquire every named lock
    ///
    /// Names are sorted and deduplicated first so that two overlapping sets
    /// always lock in the same order.
    pub async fn acquire<I, S>(&self, names: I) -> LockSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        let mutexes: Vec<Arc<AsyncMutex<()>>> = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            names
                .iter()
                .map(|name| entries.entry(name.clone()).or_default().clone())
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }

        trace!("Locked collections: {:?}", names);
        LockSet {
            names,
            _guards: guards,
        }
    }
}
