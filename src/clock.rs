//! Clock and id generation.
//!
//! Timestamps are epoch milliseconds, matching what the extension storage
//! already holds. Repositories take an `Arc<dyn Clock>` so tests can pin time.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of "now" for timestamp bookkeeping.
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic tests and simulations.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Move the clock forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Shared handle to the system clock.
pub fn system() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Fresh opaque record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
