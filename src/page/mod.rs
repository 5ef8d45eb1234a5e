//! Page insertion adapter.
//!
//! Offers the context menu on supported AI chat pages and inserts the chosen
//! context into whatever input is focused. The host binds [`HostPage`] and the
//! element traits to the real DOM; everything else lives here.

mod adapter;
mod cache;
mod dom;
mod insert;
mod menu;
mod site;

pub use adapter::{AdapterState, PageAdapter};
pub use cache::ContextCache;
pub use dom::{Focused, HostPage, Notice, NoticeKind, PageError, PlainField, RichEditable};
pub use insert::{insert_text, splice, InsertOutcome, TargetKind, COPIED_NOTICE};
pub use menu::{truncate, MenuItem, MenuView, EMPTY_MESSAGE};
pub use site::SiteMatcher;
