//! Popup controller: the management surface for contexts and categories.
//!
//! Runs in its own environment with its own `StoreAdapter`, so its writes are
//! serialized among themselves but race the background's last-write-wins.

use serde::{Deserialize, Serialize};

use crate::categories::{Category, CategoryPatch, CategoryRepository};
use crate::contexts::{CategoryFilter, Context, ContextPatch, ContextRepository, NewContext};
use crate::error::{RepositoryError, ValidationError};
use crate::store::{KeyValueStore, StoreAdapter};
use crate::transfer::{self, ExportFile, TransferError};

/// Add/edit form contents. `id` is `None` when adding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextForm {
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub category_id: Option<String>,
}

impl ContextForm {
    /// Trimmed title and body, or the first missing field.
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let body = self.body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        Ok((title.to_string(), body.to_string()))
    }
}

#[derive(Clone)]
pub struct Popup<S> {
    contexts: ContextRepository<S>,
    categories: CategoryRepository<S>,
}

impl<S: KeyValueStore + Clone> Popup<S> {
    pub fn new(adapter: StoreAdapter<S>) -> Self {
        Self {
            contexts: ContextRepository::new(adapter.clone()),
            categories: CategoryRepository::new(adapter),
        }
    }

    pub fn context_repository(&self) -> &ContextRepository<S> {
        &self.contexts
    }

    pub async fn contexts(
        &self,
        term: &str,
        filter: &CategoryFilter,
    ) -> Result<Vec<Context>, RepositoryError> {
        self.contexts.search(term, filter).await
    }

    /// Create or update from the form. `Ok(None)` when editing a context that
    /// no longer exists.
    pub async fn save(&self, form: ContextForm) -> Result<Option<Context>, RepositoryError> {
        let (title, body) = form.validate()?;

        match form.id {
            None => {
                let mut new = NewContext::new(title, body);
                new.category_id = form.category_id;
                Ok(Some(self.contexts.add(new).await?))
            }
            Some(id) => {
                let patch = ContextPatch::default()
                    .title(title)
                    .body(body)
                    .category(form.category_id);
                self.contexts.update(&id, patch).await
            }
        }
    }

    pub async fn delete_context(&self, id: &str) -> Result<bool, RepositoryError> {
        self.contexts.delete(id).await
    }

    /// Record an insertion requested from the popup.
    pub async fn touch(&self, id: &str) -> Result<Option<Context>, RepositoryError> {
        self.contexts.touch(id).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.categories.list().await
    }

    pub async fn add_category(&self, name: &str) -> Result<Category, RepositoryError> {
        self.categories.add(name).await
    }

    pub async fn rename_category(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        self.categories.update(id, CategoryPatch::name(name)).await
    }

    /// Delete a category and clear it from every context that used it.
    /// Returns how many contexts were uncategorized, or `None` if no such
    /// category existed.
    pub async fn delete_category(&self, id: &str) -> Result<Option<usize>, RepositoryError> {
        if !self.categories.delete(id).await? {
            return Ok(None);
        }
        let stripped = self.contexts.strip_category(id).await?;
        tracing::info!(id, stripped, "category deleted");
        Ok(Some(stripped))
    }

    pub async fn export(&self) -> Result<ExportFile, TransferError> {
        transfer::export(&self.contexts).await
    }

    pub fn export_file_name(&self) -> String {
        transfer::file_name(self.contexts.adapter().now_millis())
    }

    pub async fn import(&self, json: &str) -> Result<usize, TransferError> {
        transfer::import(&self.contexts, json).await
    }
}
