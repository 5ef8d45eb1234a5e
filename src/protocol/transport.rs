//! In-process transport between the foreground environments and the
//! background coordinator.
//!
//! The background runs as a tokio task fed by an mpsc queue of
//! `(message, reply)` pairs. Every message gets exactly one reply through its
//! own `oneshot` sender. Stopping the background unbinds the port, so later
//! sends fail fast with `ChannelError::Unavailable`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::coordinator::Coordinator;
use super::error::ChannelError;
use super::message::ErrorPayload;
use crate::store::KeyValueStore;

const PORT_CAPACITY: usize = 32;

type Envelope = (Value, oneshot::Sender<Value>);

/// One request/response exchange with the background.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, message: Value) -> Result<Value, ChannelError>;
}

struct Port {
    generation: u64,
    sender: mpsc::Sender<Envelope>,
}

/// Caller-side handle on the background port. Cheap to clone; all clones see
/// the same background, including one started after a restart.
#[derive(Clone, Default)]
pub struct RuntimeChannel {
    port: Arc<RwLock<Option<Port>>>,
    generations: Arc<AtomicU64>,
}

impl RuntimeChannel {
    /// A channel with nothing listening yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a background is currently bound.
    pub fn is_bound(&self) -> bool {
        self.port.read().map(|port| port.is_some()).unwrap_or(false)
    }

    /// Start a background on this channel, replacing any previous one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn serve<S>(&self, coordinator: Arc<Coordinator<S>>) -> BackgroundHandle
    where
        S: KeyValueStore + Clone + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(PORT_CAPACITY);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;

        if let Ok(mut port) = self.port.write() {
            *port = Some(Port { generation, sender });
        }

        let task = tokio::spawn(async move {
            let mut stats = TransportStats::default();
            tracing::info!(generation, "background started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    envelope = receiver.recv() => {
                        let Some((message, reply)) = envelope else { break };
                        let response = coordinator.dispatch(message).await;
                        if ErrorPayload::from_value(&response).is_some() {
                            stats.failed += 1;
                        } else {
                            stats.handled += 1;
                        }
                        // The caller may have timed out and gone away.
                        let _ = reply.send(response);
                    }
                }
            }

            tracing::info!(generation, handled = stats.handled, failed = stats.failed, "background stopped");
            stats
        });

        BackgroundHandle {
            channel: self.clone(),
            generation,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    fn unbind(&self, generation: u64) {
        if let Ok(mut port) = self.port.write() {
            if port.as_ref().is_some_and(|p| p.generation == generation) {
                *port = None;
            }
        }
    }

    fn sender(&self) -> Result<mpsc::Sender<Envelope>, ChannelError> {
        let port = self
            .port
            .read()
            .map_err(|_| ChannelError::Unavailable("port lock poisoned".into()))?;
        port.as_ref()
            .map(|p| p.sender.clone())
            .ok_or_else(|| ChannelError::Unavailable("no background listening".into()))
    }
}

#[async_trait]
impl Channel for RuntimeChannel {
    async fn send(&self, message: Value) -> Result<Value, ChannelError> {
        let sender = self.sender()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send((message, reply_tx))
            .await
            .map_err(|_| ChannelError::Unavailable("background stopped".into()))?;
        reply_rx.await.map_err(|_| ChannelError::Closed)
    }
}

/// Start a background coordinator on a fresh channel.
///
/// ## Example
///
/// ```ignore
/// let coordinator = Arc::new(Coordinator::with_default_handlers(adapter));
/// let background = spawn_background(coordinator);
/// let reply = background.channel().send(json!({ "type": "REQUEST_CONTEXTS" })).await?;
/// let stats = background.stop().await;
/// ```
pub fn spawn_background<S>(coordinator: Arc<Coordinator<S>>) -> BackgroundHandle
where
    S: KeyValueStore + Clone + 'static,
{
    RuntimeChannel::new().serve(coordinator)
}

/// Statistics from a background task.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransportStats {
    /// Messages answered with a success payload.
    pub handled: usize,
    /// Messages answered with an error payload.
    pub failed: usize,
}

/// Handle to a running background. Drop or call `stop()` to unload it.
pub struct BackgroundHandle {
    channel: RuntimeChannel,
    generation: u64,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<TransportStats>>,
}

impl BackgroundHandle {
    pub fn channel(&self) -> RuntimeChannel {
        self.channel.clone()
    }

    /// Unload the background and wait for its task to finish.
    ///
    /// Requests still queued are dropped; their callers see
    /// `ChannelError::Closed`.
    pub async fn stop(mut self) -> TransportStats {
        self.channel.unbind(self.generation);
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        match self.task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => TransportStats::default(),
        }
    }
}

impl Drop for BackgroundHandle {
    fn drop(&mut self) {
        self.channel.unbind(self.generation);
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
