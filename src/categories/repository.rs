//! CategoryRepository - CRUD over the "categories" collection with
//! case-insensitive name uniqueness.

use super::category::{compare_names, same_name, Category, CategoryPatch};
use crate::clock;
use crate::error::{RepositoryError, ValidationError};
use crate::store::{Change, Collection, KeyValueStore, StoreAdapter};

#[derive(Clone)]
pub struct CategoryRepository<S> {
    adapter: StoreAdapter<S>,
}

impl<S: KeyValueStore> CategoryRepository<S> {
    pub fn new(adapter: StoreAdapter<S>) -> Self {
        Self { adapter }
    }

    fn collection(&self) -> Collection<'_, S, Category> {
        self.adapter.collection::<Category>()
    }

    /// All categories sorted by name.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.collection().load().await?;
        categories.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(categories)
    }

    /// Same as `list` but strictly read-only.
    pub async fn read_only_list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.collection().read().await?;
        categories.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(categories)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Create a category. Rejects blank names and names already taken
    /// (ignoring case).
    pub async fn add(&self, name: &str) -> Result<Category, RepositoryError> {
        let name = validate_name(name)?;
        let now = self.adapter.now_millis();

        self.collection()
            .modify(|categories| {
                if categories.iter().any(|c| same_name(&c.name, &name)) {
                    return Err(RepositoryError::DuplicateName(name));
                }
                let category = Category {
                    id: clock::new_id(),
                    name,
                    created_at: now,
                    updated_at: now,
                };
                categories.push(category.clone());
                Ok(Change::Write(category))
            })
            .await
    }

    /// Rename a category. `None` if no such category.
    pub async fn update(
        &self,
        id: &str,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, RepositoryError> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let now = self.adapter.now_millis();

        self.collection()
            .modify(|categories| {
                if !categories.iter().any(|c| c.id == id) {
                    return Ok(Change::Keep(None));
                }
                if let Some(name) = &name {
                    if categories
                        .iter()
                        .any(|c| c.id != id && same_name(&c.name, name))
                    {
                        return Err(RepositoryError::DuplicateName(name.clone()));
                    }
                }

                let Some(category) = categories.iter_mut().find(|c| c.id == id) else {
                    return Ok(Change::Keep(None));
                };
                if let Some(name) = name {
                    category.name = name;
                }
                category.updated_at = now.max(category.created_at);
                Ok(Change::Write(Some(category.clone())))
            })
            .await
    }

    /// Remove a category. Referencing contexts are not touched here; callers
    /// follow up with `ContextRepository::strip_category`.
    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.collection()
            .modify(|categories| {
                let before = categories.len();
                categories.retain(|c| c.id != id);
                Ok::<_, RepositoryError>(if categories.len() != before {
                    Change::Write(true)
                } else {
                    Change::Keep(false)
                })
            })
            .await
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    Ok(trimmed.to_string())
}
