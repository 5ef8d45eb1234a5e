//! ContextRepository - CRUD, usage counting and category stripping over the
//! "contexts" collection.

use std::collections::HashSet;

use super::context::{
    matches_term, normalize_title, sort_recent_first, CategoryFilter, Context, ContextPatch,
    NewContext,
};
use crate::clock;
use crate::error::RepositoryError;
use crate::store::{Change, Collection, KeyValueStore, StoreAdapter};

/// Repository over the persisted context collection.
///
/// Holds no cached state: every call re-reads the store, so a repository built
/// in a background that was just restarted is immediately correct.
#[derive(Clone)]
pub struct ContextRepository<S> {
    adapter: StoreAdapter<S>,
}

impl<S: KeyValueStore> ContextRepository<S> {
    pub fn new(adapter: StoreAdapter<S>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &StoreAdapter<S> {
        &self.adapter
    }

    fn collection(&self) -> Collection<'_, S, Context> {
        self.adapter.collection::<Context>()
    }

    /// All contexts, most recently updated first. Migrated legacy records are
    /// written back before returning.
    pub async fn list(&self) -> Result<Vec<Context>, RepositoryError> {
        let mut contexts = self.collection().load().await?;
        sort_recent_first(&mut contexts);
        Ok(contexts)
    }

    /// Same as `list` but never writes, not even migration results.
    pub async fn read_only_list(&self) -> Result<Vec<Context>, RepositoryError> {
        let mut contexts = self.collection().read().await?;
        sort_recent_first(&mut contexts);
        Ok(contexts)
    }

    pub async fn list_by_category(&self, category_id: &str) -> Result<Vec<Context>, RepositoryError> {
        self.search("", &CategoryFilter::Category(category_id.to_string()))
            .await
    }

    /// Contexts matching a search term (title or body) and a category filter.
    pub async fn search(
        &self,
        term: &str,
        filter: &CategoryFilter,
    ) -> Result<Vec<Context>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|c| filter.matches(c) && matches_term(c, term))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Context>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Create and persist a new context.
    pub async fn add(&self, new: NewContext) -> Result<Context, RepositoryError> {
        let now = self.adapter.now_millis();
        let context = Context {
            id: clock::new_id(),
            title: normalize_title(&new.title),
            body: new.body,
            category_id: new.category_id,
            uses: 0,
            created_at: now,
            updated_at: now,
        };

        let created = context.clone();
        self.collection()
            .modify(|contexts| {
                contexts.push(context);
                Ok::<_, RepositoryError>(Change::Write(()))
            })
            .await?;

        tracing::debug!(id = %created.id, "context added");
        Ok(created)
    }

    /// Merge `patch` into the context with `id`. `None` if no such context.
    pub async fn update(
        &self,
        id: &str,
        patch: ContextPatch,
    ) -> Result<Option<Context>, RepositoryError> {
        let now = self.adapter.now_millis();
        self.collection()
            .modify(|contexts| {
                let Some(context) = contexts.iter_mut().find(|c| c.id == id) else {
                    return Ok::<_, RepositoryError>(Change::Keep(None));
                };
                patch.apply(context);
                context.updated_at = now.max(context.created_at);
                Ok(Change::Write(Some(context.clone())))
            })
            .await
    }

    /// Remove the context with `id`. Returns whether one was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.collection()
            .modify(|contexts| {
                let before = contexts.len();
                contexts.retain(|c| c.id != id);
                Ok::<_, RepositoryError>(if contexts.len() != before {
                    Change::Write(true)
                } else {
                    Change::Keep(false)
                })
            })
            .await
    }

    /// Record one insertion: `uses + 1` and a fresh `updatedAt`.
    pub async fn touch(&self, id: &str) -> Result<Option<Context>, RepositoryError> {
        let now = self.adapter.now_millis();
        let touched = self
            .collection()
            .modify(|contexts| {
                let Some(context) = contexts.iter_mut().find(|c| c.id == id) else {
                    return Ok::<_, RepositoryError>(Change::Keep(None));
                };
                context.uses += 1;
                context.updated_at = now.max(context.created_at);
                Ok(Change::Write(Some(context.clone())))
            })
            .await?;

        match &touched {
            Some(context) => tracing::debug!(id, uses = context.uses, "context touched"),
            None => tracing::debug!(id, "touch ignored, context not found"),
        }
        Ok(touched)
    }

    /// Clear `categoryId` on every context referencing `category_id`.
    /// Returns how many contexts changed.
    pub async fn strip_category(&self, category_id: &str) -> Result<usize, RepositoryError> {
        let now = self.adapter.now_millis();
        self.collection()
            .modify(|contexts| {
                let mut stripped = 0;
                for context in contexts
                    .iter_mut()
                    .filter(|c| c.category_id.as_deref() == Some(category_id))
                {
                    context.category_id = None;
                    context.updated_at = now.max(context.created_at);
                    stripped += 1;
                }
                Ok::<_, RepositoryError>(if stripped > 0 {
                    Change::Write(stripped)
                } else {
                    Change::Keep(0)
                })
            })
            .await
    }

    /// Append every record whose id is not stored yet. Returns how many were added.
    pub async fn import(&self, records: Vec<Context>) -> Result<usize, RepositoryError> {
        self.collection()
            .modify(|contexts| {
                let mut known: HashSet<String> = contexts.iter().map(|c| c.id.clone()).collect();
                let mut added = 0;
                for record in records {
                    if known.insert(record.id.clone()) {
                        contexts.push(record);
                        added += 1;
                    }
                }
                Ok::<_, RepositoryError>(if added > 0 {
                    Change::Write(added)
                } else {
                    Change::Keep(0)
                })
            })
            .await
    }
}
