//! Built-in background handlers.
//!
//! Each module follows the same convention:
//! - `MESSAGE`: the message type it answers
//! - `guard`: cheap input validation run before the handler
//! - `handle`: the async handler itself

pub mod request_categories;
pub mod request_contexts;
pub mod touch_context;
