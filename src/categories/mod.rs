//! Categories - named groupings weakly referenced by contexts.

mod category;
mod repository;

pub use category::{Category, CategoryPatch};
pub use repository::CategoryRepository;
