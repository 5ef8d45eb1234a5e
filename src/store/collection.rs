//! Collection - typed accessor for one whole-array record collection.

use std::collections::HashMap;
use std::marker::PhantomData;

use serde_json::Value;

use super::{KeyValueStore, Record, StoreAdapter, StoreError, SCHEMA_VERSION_KEY};

/// Outcome of a `Collection::modify` closure.
///
/// `Write` persists the mutated collection, `Keep` leaves storage untouched
/// (not-found, nothing to change).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    Write(T),
    Keep(T),
}

/// Typed accessor for the records stored under `R::COLLECTION`.
pub struct Collection<'a, S, R> {
    adapter: &'a StoreAdapter<S>,
    _marker: PhantomData<R>,
}

impl<'a, S: KeyValueStore, R: Record> Collection<'a, S, R> {
    pub(crate) fn new(adapter: &'a StoreAdapter<S>) -> Self {
        Self {
            adapter,
            _marker: PhantomData,
        }
    }

    /// Raw stored array. A missing or non-array value reads as empty.
    pub async fn load_raw(&self) -> Result<Vec<Value>, StoreError> {
        let mut values = self.adapter.store().get(&[R::COLLECTION]).await?;
        Ok(match values.remove(R::COLLECTION) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        })
    }

    /// Whether the collection key holds an array at all.
    pub async fn is_initialized(&self) -> Result<bool, StoreError> {
        let values = self.adapter.store().get(&[R::COLLECTION]).await?;
        Ok(matches!(values.get(R::COLLECTION), Some(Value::Array(_))))
    }

    /// Read and upgrade the collection in memory without writing anything back.
    pub async fn read(&self) -> Result<Vec<R>, StoreError> {
        let (records, _) = self.fetch().await?;
        Ok(records)
    }

    /// Read the collection, persisting the upgraded form if migration changed it.
    pub async fn load(&self) -> Result<Vec<R>, StoreError> {
        let _guard = self.adapter.lock().await;
        let (records, migrated) = self.fetch().await?;
        if migrated {
            tracing::info!(
                collection = R::COLLECTION,
                count = records.len(),
                "writing back migrated records"
            );
            self.write(&records, true).await?;
        }
        Ok(records)
    }

    /// Overwrite the whole collection.
    pub async fn save(&self, records: &[R]) -> Result<(), StoreError> {
        self.write(records, false).await
    }

    /// Read → mutate in memory → write the entire collection, under the
    /// adapter's write gate.
    ///
    /// The collection is written when the closure returns `Change::Write`, or
    /// when loading migrated legacy records.
    pub async fn modify<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<R>) -> Result<Change<T>, E>,
        E: From<StoreError>,
    {
        let _guard = self.adapter.lock().await;
        let (mut records, migrated) = self.fetch().await?;

        let (value, write) = match f(&mut records)? {
            Change::Write(value) => (value, true),
            Change::Keep(value) => (value, false),
        };

        if write || migrated {
            self.write(&records, migrated).await?;
        }
        Ok(value)
    }

    /// One `set` call, so a migrated collection and its version land together.
    async fn write(&self, records: &[R], migrated: bool) -> Result<(), StoreError> {
        let mut items = HashMap::from([(R::COLLECTION.to_string(), serde_json::to_value(records)?)]);
        if let (true, Some(version)) = (migrated, R::SCHEMA_VERSION) {
            items.insert(SCHEMA_VERSION_KEY.to_string(), Value::from(version));
        }
        self.adapter.store().set(items).await
    }

    async fn fetch(&self) -> Result<(Vec<R>, bool), StoreError> {
        let raw = self.load_raw().await?;
        decode(raw, self.adapter.now_millis())
    }
}

/// Upgrade and deserialize a raw stored array. Also reports whether the
/// migration changed anything.
pub fn decode<R: Record>(mut raw: Vec<Value>, now_millis: i64) -> Result<(Vec<R>, bool), StoreError> {
    let migrated = R::migrate(&mut raw, now_millis);
    let records = raw
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<R>, _>>()?;
    Ok((records, migrated))
}
