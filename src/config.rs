//! Runtime configuration for the page adapter and the protocol client.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```json
//! {
//!   "supportedSites": ["claude.ai"],
//!   "requestTimeoutMs": 1500,
//!   "retryDelayMs": 300,
//!   "previewChars": 60,
//!   "tooltipChars": 200
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SITES: &[&str] = &[
    "chat.openai.com",
    "chatgpt.com",
    "claude.ai",
    "gemini.google.com",
    "perplexity.ai",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Host substrings on which the insertion button is offered.
    pub supported_sites: Vec<String>,
    /// How long a caller waits for one background reply.
    pub request_timeout_ms: u64,
    /// Pause before the single retry.
    pub retry_delay_ms: u64,
    /// Characters of body shown in a menu entry.
    pub preview_chars: usize,
    /// Characters of body shown in a menu entry's tooltip.
    pub tooltip_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supported_sites: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
            request_timeout_ms: 1500,
            retry_delay_ms: 300,
            preview_chars: 60,
            tooltip_chars: 200,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
