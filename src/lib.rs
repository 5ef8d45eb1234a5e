//! # context_manager
//!
//! Core of the AI Context Manager browser extension: reusable text snippets
//! ("contexts") kept in one persisted collection, shared by a background
//! coordinator, page adapters injected into AI chat sites, and a popup.
//!
//! - [`store`]: whole-array collections over an async key-value store, with
//!   load-time migration
//! - [`contexts`] / [`categories`]: repositories over those collections
//! - [`protocol`]: the background coordinator and the caller-side client with
//!   its timeout, retry and direct-read fallback
//! - [`page`]: trigger injection, menu and text insertion on supported pages
//! - [`popup`] and [`transfer`]: management surface and JSON export/import

pub mod categories;
pub mod clock;
pub mod config;
pub mod contexts;
pub mod error;
#[cfg(feature = "subscriber")]
pub mod logging;
pub mod page;
pub mod popup;
pub mod protocol;
pub mod store;
pub mod transfer;

pub use categories::{Category, CategoryPatch, CategoryRepository};
pub use config::{Config, ConfigError};
pub use contexts::{CategoryFilter, Context, ContextPatch, ContextRepository, NewContext};
pub use error::{RepositoryError, ValidationError};
pub use page::{InsertOutcome, PageAdapter};
pub use popup::{ContextForm, Popup};
pub use protocol::{Coordinator, ProtocolClient};
pub use store::{InMemoryStore, KeyValueStore, StoreAdapter, StoreError};
