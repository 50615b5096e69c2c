use crate::infra::mongo::api::MongoRepError;
use crate::infra::mongo::types::{GrocerySections, Recipe};

use super::scope::{Owner, RecipeScope};
use super::update::RecipeUpdate;

/// Document store holding recipes and grocery sections. Every recipe access
/// is filtered by a [`RecipeScope`] or an [`Owner`].
#[rocket::async_trait]
pub trait RecipeStore: Send + Sync {
    async fn find_owned(&self, owner: &Owner) -> Result<Vec<Recipe>, MongoRepError>;

    async fn find_one(&self, scope: &RecipeScope) -> Result<Option<Recipe>, MongoRepError>;

    /// Stores a new recipe, assigning its id.
    async fn insert(&self, recipe: Recipe) -> Result<Recipe, MongoRepError>;

    /// Returns whether the scope matched a document.
    async fn update(&self, scope: &RecipeScope, update: &RecipeUpdate)
        -> Result<bool, MongoRepError>;

    /// Replaces the scoped document, inserting it when absent.
    async fn replace(&self, scope: &RecipeScope, recipe: &Recipe) -> Result<(), MongoRepError>;

    /// Returns whether a document was removed.
    async fn remove(&self, scope: &RecipeScope) -> Result<bool, MongoRepError>;

    async fn grocery_sections(
        &self,
        owner: &Owner,
    ) -> Result<Option<GrocerySections>, MongoRepError>;
}
