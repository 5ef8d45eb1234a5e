//! StoreAdapter - one environment's handle on the shared storage area.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, MutexGuard};

use super::{Collection, KeyValueStore, Record, StorageChange};
use crate::clock::{self, Clock};

/// Per-environment handle on a shared `KeyValueStore`.
///
/// Read-modify-write sequences issued through one adapter (and its clones) are
/// serialized by an async write gate. Adapters built separately over the same
/// store, e.g. the popup's and the background's, are not serialized against
/// each other: concurrent writers there are last-write-wins per collection.
#[derive(Clone)]
pub struct StoreAdapter<S> {
    store: S,
    clock: Arc<dyn Clock>,
    gate: Arc<Mutex<()>>,
}

impl<S: KeyValueStore> StoreAdapter<S> {
    /// Wrap a store using the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, clock::system())
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Typed accessor for one record collection.
    pub fn collection<R: Record>(&self) -> Collection<'_, S, R> {
        Collection::new(self)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Subscribe to storage change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.store.subscribe()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}
