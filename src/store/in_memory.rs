//! InMemoryStore - HashMap-backed storage area for tests and single-process hosts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::{KeyValueStore, StorageChange, StoreError};

const CHANGE_BUFFER: usize = 64;

/// In-memory storage area backed by a HashMap.
///
/// Clone-friendly via Arc: every clone is the same storage area, the way all
/// extension environments see one `storage.local`.
#[derive(Clone)]
pub struct InMemoryStore {
    storage: Arc<RwLock<HashMap<String, Value>>>,
    available: Arc<AtomicBool>,
    changes: broadcast::Sender<StorageChange>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            changes,
        }
    }

    /// Create a store pre-populated with raw entries. No notifications fire.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let store = Self::new();
        if let Ok(mut storage) = store.storage.write() {
            storage.extend(entries);
        }
        store
    }

    /// Toggle availability. While unavailable every get/set fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Raw stored value for a key, bypassing availability.
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.storage.read().ok()?.get(key).cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("storage area is not reachable".into()))
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        self.check_available()?;
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        Ok(keys
            .iter()
            .filter_map(|key| storage.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError> {
        self.check_available()?;
        let mut notifications = Vec::with_capacity(items.len());
        {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

            for (key, value) in items {
                let old_value = storage.insert(key.clone(), value.clone());
                notifications.push(StorageChange {
                    key,
                    old_value,
                    new_value: Some(value),
                });
            }
        }

        for change in notifications {
            // No receivers is fine: nobody is listening yet.
            let _ = self.changes.send(change);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
