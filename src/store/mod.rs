//! Store - persisted collections shared by every extension environment.
//!
//! The extension storage area is a flat async key-value store. Each entity
//! kind lives under one top-level key as a JSON array, and every mutation
//! rewrites the whole array.
//!
//! ## Example
//!
//! ```ignore
//! use context_manager::store::{InMemoryStore, StoreAdapter};
//! use context_manager::Context;
//!
//! let store = InMemoryStore::new();
//! let adapter = StoreAdapter::new(store.clone());
//! let contexts = adapter.collection::<Context>().load().await?;
//! ```

mod adapter;
mod collection;
mod in_memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Storage key holding the schema version of the persisted collections.
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Trait for record types persisted as a whole-array collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Top-level storage key for this record type (e.g. "contexts").
    const COLLECTION: &'static str;

    /// Schema version recorded under `SCHEMA_VERSION_KEY` whenever `migrate`
    /// upgrades this collection. `None` for unversioned records.
    const SCHEMA_VERSION: Option<u32> = None;

    /// Returns the unique identifier for this record.
    fn id(&self) -> &str;

    /// Upgrade raw stored records in place before they are deserialized.
    ///
    /// Returns true when anything changed, in which case the upgraded
    /// collection is written back. Must be idempotent.
    fn migrate(_records: &mut Vec<Value>, _now_millis: i64) -> bool {
        false
    }
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The underlying storage area could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be (de)serialized.
    #[error("storage serialization error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// A change notification for one storage key.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Async key-value storage scoped to one extension installation.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the given keys. Keys with no stored value are absent from the map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError>;

    /// Write all entries in one call.
    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError>;

    /// Receive a `StorageChange` for every key written from any environment.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

pub use adapter::StoreAdapter;
pub use collection::{decode, Change, Collection};
pub use in_memory::InMemoryStore;
