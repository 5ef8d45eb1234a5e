//! Error types for both sides of the message protocol.

use std::time::Duration;

use crate::error::RepositoryError;

/// Background-side failure while handling one message.
///
/// Never crosses the channel as-is: `Coordinator::dispatch` turns it into an
/// `{ "error": true, "message": ... }` reply.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// No handler registered for this message type.
    #[error("unknown message type: {0}")]
    UnknownMessage(String),
    /// Payload decode / deserialization failed.
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    /// Guard rejected the message (missing or malformed fields).
    #[error("guard rejected message: {0}")]
    GuardRejected(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

/// Caller-side failure of one request over a channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Nothing is listening (background unloaded or never started).
    #[error("background unavailable: {0}")]
    Unavailable(String),
    /// The background accepted the message but dropped it without replying.
    #[error("background closed the request without replying")]
    Closed,
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    /// The background replied with a structured error.
    #[error("background error: {0}")]
    Remote(String),
    /// The reply did not have the expected shape.
    #[error("unexpected reply: {0}")]
    Decode(String),
}

/// Failure surfaced to the page or popup after the whole fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Background unreachable and the direct store read failed too.
    #[error("contexts unavailable ({channel}); direct read failed ({fallback})")]
    Unavailable {
        channel: ChannelError,
        fallback: RepositoryError,
    },
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
