//! Handler: TOUCH_CONTEXT
//!
//! Bumps the usage counter of a context after the user picked it from the
//! menu.

use serde::Deserialize;
use serde_json::Value;

use crate::protocol::message::{self, Ack};
use crate::protocol::{HandlerContext, HandlerError};
use crate::store::KeyValueStore;

pub const MESSAGE: &str = message::TOUCH_CONTEXT;

#[derive(Deserialize)]
pub struct Input {
    pub id: String,
}

pub fn guard<S>(ctx: &HandlerContext<S>) -> bool {
    ctx.has_string("id")
}

pub async fn handle<S: KeyValueStore + Clone + 'static>(
    ctx: HandlerContext<S>,
) -> Result<Value, HandlerError> {
    let input = ctx.input::<Input>()?;

    match ctx.contexts().touch(&input.id).await? {
        Some(_) => Ok(Ack::value()),
        None => Err(HandlerError::NotFound {
            kind: "context",
            id: input.id,
        }),
    }
}
