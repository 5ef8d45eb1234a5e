//! Context passed to message handlers.
//!
//! Built fresh for every message: the repositories inside re-read the store,
//! so nothing survives between requests.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::HandlerError;
use crate::categories::CategoryRepository;
use crate::contexts::ContextRepository;
use crate::store::{KeyValueStore, StoreAdapter};

pub struct HandlerContext<S> {
    message_type: String,
    input: Value,
    contexts: ContextRepository<S>,
    categories: CategoryRepository<S>,
}

impl<S: KeyValueStore + Clone> HandlerContext<S> {
    pub(crate) fn new(message_type: String, input: Value, adapter: &StoreAdapter<S>) -> Self {
        Self {
            message_type,
            input,
            contexts: ContextRepository::new(adapter.clone()),
            categories: CategoryRepository::new(adapter.clone()),
        }
    }
}

impl<S> HandlerContext<S> {
    /// Deserialize the message into a typed struct.
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.input.clone())
            .map_err(|e| HandlerError::DecodeFailed(e.to_string()))
    }

    pub fn raw_input(&self) -> &Value {
        &self.input
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn contexts(&self) -> &ContextRepository<S> {
        &self.contexts
    }

    pub fn categories(&self) -> &CategoryRepository<S> {
        &self.categories
    }

    /// Check that the message carries a string field.
    pub fn has_string(&self, field: &str) -> bool {
        self.input.get(field).is_some_and(Value::is_string)
    }

    pub fn has_fields(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.input.get(*f).is_some())
    }
}
