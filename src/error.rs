use crate::store::StoreError;

/// Input rejected before any persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("body is required")]
    EmptyBody,
    #[error("category name is required")]
    EmptyCategoryName,
}

/// Error type shared by the context and category repositories.
///
/// Not-found is not an error: repositories answer `None` / `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("category name already exists: {0}")]
    DuplicateName(String),
}
