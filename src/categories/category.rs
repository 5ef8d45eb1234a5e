use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::store::Record;

/// A named grouping for contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
}

impl CategoryPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Case-folded comparison, raw name as tie-break.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
