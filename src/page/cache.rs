//! Page-side copy of the context collection.
//!
//! Owned by the page adapter. Refreshed on every menu open and on every
//! storage change for the contexts key; otherwise it is never trusted.

use serde_json::Value;

use crate::contexts::{matches_term, sort_recent_first, Context};
use crate::store::{decode, Record, StorageChange};

#[derive(Debug, Default)]
pub struct ContextCache {
    contexts: Option<Vec<Context>>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, mut contexts: Vec<Context>) {
        sort_recent_first(&mut contexts);
        self.contexts = Some(contexts);
    }

    /// Apply a storage change notification. Returns true when the cache
    /// changed. Changes to other keys are ignored.
    ///
    /// Legacy records in the new value are upgraded in memory only.
    pub fn apply_change(&mut self, change: &StorageChange, now_millis: i64) -> bool {
        if change.key != Context::COLLECTION {
            return false;
        }
        let raw = match &change.new_value {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        match decode::<Context>(raw, now_millis) {
            Ok((contexts, _)) => self.replace(contexts),
            Err(err) => {
                tracing::warn!(error = %err, "undecodable contexts change, dropping cache");
                self.invalidate();
            }
        }
        true
    }

    pub fn invalidate(&mut self) {
        self.contexts = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.contexts.is_some()
    }

    pub fn contexts(&self) -> &[Context] {
        self.contexts.as_deref().unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&Context> {
        self.contexts().iter().find(|c| c.id == id)
    }

    pub fn search(&self, term: &str) -> Vec<&Context> {
        self.contexts()
            .iter()
            .filter(|c| matches_term(c, term))
            .collect()
    }
}
