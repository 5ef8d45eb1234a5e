//! Handler: REQUEST_CATEGORIES

use serde_json::Value;

use crate::protocol::message;
use crate::protocol::{HandlerContext, HandlerError};
use crate::store::KeyValueStore;

pub const MESSAGE: &str = message::REQUEST_CATEGORIES;

pub fn guard<S>(_ctx: &HandlerContext<S>) -> bool {
    true
}

pub async fn handle<S: KeyValueStore + Clone + 'static>(
    ctx: HandlerContext<S>,
) -> Result<Value, HandlerError> {
    let categories = ctx.categories().list().await?;
    Ok(serde_json::to_value(categories)?)
}
