//! Coordinator: the background environment's message handler registry.
//!
//! `Coordinator<S>` owns a store adapter and a set of named message handlers.
//! Each handler receives a fresh `HandlerContext<S>` and returns
//! `Result<Value, HandlerError>`; `dispatch` turns every failure into a
//! structured error reply so no request is ever left without an answer.
//!
//! ## Example
//!
//! ```ignore
//! use context_manager::protocol::Coordinator;
//! use context_manager::store::{InMemoryStore, StoreAdapter};
//! use serde_json::json;
//!
//! let coordinator = Coordinator::with_default_handlers(StoreAdapter::new(InMemoryStore::new()));
//! let reply = coordinator.dispatch(json!({ "type": "REQUEST_CONTEXTS" })).await;
//! ```

use std::collections::HashMap;
use std::future::Future;

use futures::future::BoxFuture;
use serde_json::Value;

use super::context::HandlerContext;
use super::error::HandlerError;
use super::handlers;
use super::message::ErrorPayload;
use crate::contexts::{Context, NewContext, SCHEMA_VERSION};
use crate::error::RepositoryError;
use crate::store::{KeyValueStore, StoreAdapter, SCHEMA_VERSION_KEY};

type Guard<S> = Box<dyn Fn(&HandlerContext<S>) -> bool + Send + Sync>;
type Handle<S> =
    Box<dyn Fn(HandlerContext<S>) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

/// A registered message handler with optional guard.
struct MessageHandler<S> {
    guard: Option<Guard<S>>,
    handle: Handle<S>,
}

fn boxed<S, F, Fut>(handler: F) -> Handle<S>
where
    F: Fn(HandlerContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    Box::new(
        move |ctx: HandlerContext<S>| -> BoxFuture<'static, Result<Value, HandlerError>> {
            Box::pin(handler(ctx))
        },
    )
}

/// Why the extension's install hook fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    BrowserUpdate,
}

pub const SAMPLE_TITLE: &str = "Sample Context";
pub const SAMPLE_BODY: &str = "Welcome! This is a sample context. Edit or delete it, then add \
    your own frequently used prompts or instructions.";

/// Routes protocol messages to handler functions.
pub struct Coordinator<S> {
    adapter: StoreAdapter<S>,
    handlers: HashMap<String, MessageHandler<S>>,
}

impl<S: KeyValueStore + Clone + 'static> Coordinator<S> {
    /// Create a coordinator with no handlers registered.
    pub fn new(adapter: StoreAdapter<S>) -> Self {
        Self {
            adapter,
            handlers: HashMap::new(),
        }
    }

    /// Coordinator answering `REQUEST_CONTEXTS`, `REQUEST_CATEGORIES` and
    /// `TOUCH_CONTEXT`.
    pub fn with_default_handlers(adapter: StoreAdapter<S>) -> Self {
        crate::register_handlers!(
            Self::new(adapter),
            handlers::request_contexts,
            handlers::request_categories,
            handlers::touch_context,
        )
    }

    /// Register a message handler. Builder style.
    pub fn handler<F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(HandlerContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.handlers.insert(
            name.to_string(),
            MessageHandler {
                guard: None,
                handle: boxed(handler),
            },
        );
        self
    }

    /// Register a message handler behind a guard.
    ///
    /// If the guard returns `false` the message is rejected with
    /// `HandlerError::GuardRejected` and the handler never runs.
    pub fn handler_guarded<G, F, Fut>(mut self, name: &str, guard: G, handler: F) -> Self
    where
        G: Fn(&HandlerContext<S>) -> bool + Send + Sync + 'static,
        F: Fn(HandlerContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.handlers.insert(
            name.to_string(),
            MessageHandler {
                guard: Some(Box::new(guard)),
                handle: boxed(handler),
            },
        );
        self
    }

    /// Dispatch a message, surfacing handler errors to the caller.
    pub async fn try_dispatch(&self, message: Value) -> Result<Value, HandlerError> {
        let message_type = message
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::DecodeFailed("message has no type".into()))?
            .to_string();

        let handler = self
            .handlers
            .get(&message_type)
            .ok_or_else(|| HandlerError::UnknownMessage(message_type.clone()))?;

        let ctx = HandlerContext::new(message_type.clone(), message, &self.adapter);

        if let Some(guard) = &handler.guard {
            if !guard(&ctx) {
                return Err(HandlerError::GuardRejected(message_type));
            }
        }

        (handler.handle)(ctx).await
    }

    /// Dispatch a message and always produce exactly one reply.
    ///
    /// Failures become `{ "error": true, "message": ... }`.
    pub async fn dispatch(&self, message: Value) -> Value {
        let message_type = message
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<untyped>")
            .to_string();

        match self.try_dispatch(message).await {
            Ok(reply) => {
                tracing::debug!(message_type = %message_type, "message handled");
                reply
            }
            Err(err) => {
                tracing::warn!(message_type = %message_type, error = %err, "message failed");
                ErrorPayload::new(err.to_string()).into_value()
            }
        }
    }

    /// Install hook: seed a sample context on first install and record the
    /// schema version.
    pub async fn on_installed(&self, reason: InstallReason) -> Result<(), RepositoryError> {
        tracing::info!(?reason, "extension installed");
        if reason != InstallReason::Install {
            return Ok(());
        }

        let values = self.adapter.store().get(&[SCHEMA_VERSION_KEY]).await?;
        if !values.contains_key(SCHEMA_VERSION_KEY) {
            self.adapter
                .store()
                .set(HashMap::from([(
                    SCHEMA_VERSION_KEY.to_string(),
                    Value::from(SCHEMA_VERSION),
                )]))
                .await?;
        }

        if !self.adapter.collection::<Context>().is_initialized().await? {
            let repo = crate::contexts::ContextRepository::new(self.adapter.clone());
            repo.add(NewContext::new(SAMPLE_TITLE, SAMPLE_BODY)).await?;
            tracing::info!("initialized storage with a sample context");
        }
        Ok(())
    }

    /// Registered message types.
    pub fn messages(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }

    pub fn adapter(&self) -> &StoreAdapter<S> {
        &self.adapter
    }
}
