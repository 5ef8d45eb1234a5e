use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::store::Record;

/// Title used when a context is created or renamed with a blank title.
pub const DEFAULT_TITLE: &str = "Untitled";

/// A stored snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub uses: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Context {
    const COLLECTION: &'static str = "contexts";
    const SCHEMA_VERSION: Option<u32> = Some(super::migration::SCHEMA_VERSION);

    fn id(&self) -> &str {
        &self.id
    }

    fn migrate(records: &mut Vec<Value>, now_millis: i64) -> bool {
        super::migration::migrate_all(records, now_millis)
    }
}

/// Input for `ContextRepository::add`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContext {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category_id: Option<String>,
}

impl NewContext {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// Partial update for an existing context.
///
/// Only `title`, `body` and `categoryId` can change. Any `id` or `createdAt`
/// present in a deserialized patch is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// `None` leaves the category alone, `Some(None)` clears it.
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<String>>,
}

impl ContextPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn category(mut self, category_id: Option<String>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.category_id.is_none()
    }

    pub(crate) fn apply(self, context: &mut Context) {
        if let Some(title) = self.title {
            context.title = normalize_title(&title);
        }
        if let Some(body) = self.body {
            context.body = body;
        }
        if let Some(category_id) = self.category_id {
            context.category_id = category_id;
        }
    }
}

// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Which contexts a listing should include.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Uncategorized,
    Category(String),
}

impl CategoryFilter {
    pub fn matches(&self, context: &Context) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Uncategorized => context.category_id.is_none(),
            CategoryFilter::Category(id) => context.category_id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Case-insensitive substring match on title or body. An empty term matches.
pub fn matches_term(context: &Context, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || context.title.to_lowercase().contains(&term)
        || context.body.to_lowercase().contains(&term)
}

pub(crate) fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Most recently updated first; ties by creation time, then id.
pub(crate) fn sort_recent_first(contexts: &mut [Context]) {
    contexts.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
