//! Wire messages exchanged between the page adapter, the popup and the
//! background coordinator.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const REQUEST_CONTEXTS: &str = "REQUEST_CONTEXTS";
pub const REQUEST_CATEGORIES: &str = "REQUEST_CATEGORIES";
pub const TOUCH_CONTEXT: &str = "TOUCH_CONTEXT";

/// A request sent to the background coordinator.
///
/// ```json
/// { "type": "TOUCH_CONTEXT", "id": "6f1c..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    RequestContexts,
    RequestCategories,
    TouchContext { id: String },
}

impl Request {
    pub fn message_type(&self) -> &'static str {
        match self {
            Request::RequestContexts => REQUEST_CONTEXTS,
            Request::RequestCategories => REQUEST_CATEGORIES,
            Request::TouchContext { .. } => TOUCH_CONTEXT,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Request::RequestContexts | Request::RequestCategories => {
                json!({ "type": self.message_type() })
            }
            Request::TouchContext { id } => json!({ "type": self.message_type(), "id": id }),
        }
    }
}

/// Acknowledgement for requests that carry no data back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn value() -> Value {
        json!({ "ok": true })
    }
}

/// Structured failure reply: `{ "error": true, "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: bool,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }

    pub fn into_value(self) -> Value {
        json!({ "error": self.error, "message": self.message })
    }

    /// Recognize an error reply. Anything else is a success payload.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("error").and_then(Value::as_bool) != Some(true) {
            return None;
        }
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        Some(Self::new(message))
    }
}
