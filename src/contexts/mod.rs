//! Contexts - stored snippets, their load-time migration and repository.

mod context;
pub mod migration;
mod repository;

pub use context::{matches_term, CategoryFilter, Context, ContextPatch, NewContext, DEFAULT_TITLE};
pub use migration::SCHEMA_VERSION;
pub(crate) use context::sort_recent_first;
pub use repository::ContextRepository;
