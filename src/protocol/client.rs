//! Caller side of the protocol, used by the page adapter and the popup.
//!
//! Each listing request goes through the same chain: ask the background with a
//! timeout, retry once after a short delay, then read the store directly
//! without migrating or writing anything.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ChannelError, ClientError};
use super::message::{ErrorPayload, Request};
use super::transport::Channel;
use crate::categories::{Category, CategoryRepository};
use crate::config::Config;
use crate::contexts::{Context, ContextRepository};
use crate::error::RepositoryError;
use crate::store::{KeyValueStore, StoreAdapter};

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Background,
    DirectRead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub source: Source,
}

#[derive(Clone)]
pub struct ProtocolClient<C, S> {
    channel: C,
    fallback: StoreAdapter<S>,
    timeout: Duration,
    retry_delay: Duration,
}

impl<C: Channel, S: KeyValueStore + Clone> ProtocolClient<C, S> {
    /// `fallback` is this environment's own adapter, used for direct reads.
    pub fn new(channel: C, fallback: StoreAdapter<S>, config: &Config) -> Self {
        Self {
            channel,
            fallback,
            timeout: config.request_timeout(),
            retry_delay: config.retry_delay(),
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// This environment's own store adapter.
    pub fn fallback(&self) -> &StoreAdapter<S> {
        &self.fallback
    }

    /// All contexts, most recently updated first.
    pub async fn request_contexts(&self) -> Result<Listing<Context>, ClientError> {
        let repo = ContextRepository::new(self.fallback.clone());
        self.listing(Request::RequestContexts, || repo.read_only_list())
            .await
    }

    /// All categories, sorted by name.
    pub async fn request_categories(&self) -> Result<Listing<Category>, ClientError> {
        let repo = CategoryRepository::new(self.fallback.clone());
        self.listing(Request::RequestCategories, || repo.read_only_list())
            .await
    }

    /// Record one use of a context. Single attempt; callers usually ignore
    /// the result.
    pub async fn touch(&self, id: &str) -> Result<(), ClientError> {
        let request = Request::TouchContext { id: id.to_string() };
        self.call(&request).await?;
        Ok(())
    }

    async fn listing<T, F, Fut>(&self, request: Request, direct: F) -> Result<Listing<T>, ClientError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>, RepositoryError>>,
    {
        let channel_err = match self.call_with_retry(&request).await {
            Ok(reply) => match serde_json::from_value::<Vec<T>>(reply) {
                Ok(items) => {
                    return Ok(Listing {
                        items,
                        source: Source::Background,
                    })
                }
                Err(e) => ChannelError::Decode(e.to_string()),
            },
            Err(e) => e,
        };

        tracing::warn!(
            message_type = request.message_type(),
            error = %channel_err,
            "background request failed, reading store directly"
        );

        match direct().await {
            Ok(items) => Ok(Listing {
                items,
                source: Source::DirectRead,
            }),
            Err(fallback) => Err(ClientError::Unavailable {
                channel: channel_err,
                fallback,
            }),
        }
    }

    async fn call_with_retry(&self, request: &Request) -> Result<Value, ChannelError> {
        match self.call(request).await {
            Ok(reply) => Ok(reply),
            Err(first) => {
                tracing::debug!(
                    message_type = request.message_type(),
                    error = %first,
                    "retrying background request"
                );
                tokio::time::sleep(self.retry_delay).await;
                self.call(request).await
            }
        }
    }

    async fn call(&self, request: &Request) -> Result<Value, ChannelError> {
        let reply = tokio::time::timeout(self.timeout, self.channel.send(request.to_value()))
            .await
            .map_err(|_| ChannelError::Timeout(self.timeout))??;

        match ErrorPayload::from_value(&reply) {
            Some(payload) => Err(ChannelError::Remote(payload.message)),
            None => Ok(reply),
        }
    }
}
