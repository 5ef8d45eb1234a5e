//! Handler: REQUEST_CONTEXTS

use serde_json::Value;

use crate::protocol::message;
use crate::protocol::{HandlerContext, HandlerError};
use crate::store::KeyValueStore;

pub const MESSAGE: &str = message::REQUEST_CONTEXTS;

pub fn guard<S>(_ctx: &HandlerContext<S>) -> bool {
    true
}

/// Reply with every context, most recently updated first.
pub async fn handle<S: KeyValueStore + Clone + 'static>(
    ctx: HandlerContext<S>,
) -> Result<Value, HandlerError> {
    let contexts = ctx.contexts().list().await?;
    Ok(serde_json::to_value(contexts)?)
}
