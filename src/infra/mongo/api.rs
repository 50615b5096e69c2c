use super::types::{GrocerySections, Recipe};
use crate::infra::recipes::{Owner, RecipeScope, RecipeStore, RecipeUpdate};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, oid::ObjectId},
    error::{Error as mongoError, ErrorKind, WriteFailure},
    options::ReplaceOptions,
    Client, Collection,
};
use thiserror::Error;
use tracing::debug;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Error, Debug)]
pub enum MongoRepError {
    #[error("error querying value")]
    QueryError(#[from] mongoError),
    #[error("could not encode update")]
    EncodeError(#[from] bson::ser::Error),
    #[error("recipe {0} already exists under another owner")]
    ForeignRecipe(ObjectId),
}

pub struct MongoRep {
    pub recipes: Collection<Recipe>,
    pub grocery_sections: Collection<GrocerySections>,
}

impl MongoRep {
    pub async fn init(uri: &str, database: &str) -> Result<Self, MongoRepError> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database);
        let rep = MongoRep {
            recipes: database.collection("recipes"),
            grocery_sections: database.collection("grocerysections"),
        };
        return Ok(rep);
    }
}

fn is_duplicate_key(err: &mongoError) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write)) if write.code == DUPLICATE_KEY
    )
}

#[rocket::async_trait]
impl RecipeStore for MongoRep {
    async fn find_owned(&self, owner: &Owner) -> Result<Vec<Recipe>, MongoRepError> {
        let cursor = self.recipes.find(owner.filter(), None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, scope: &RecipeScope) -> Result<Option<Recipe>, MongoRepError> {
        self.recipes
            .find_one(scope.filter(), None)
            .await
            .map_err(MongoRepError::from)
    }

    async fn insert(&self, mut recipe: Recipe) -> Result<Recipe, MongoRepError> {
        let id = recipe.id.unwrap_or_else(ObjectId::new);
        recipe.id = Some(id);
        self.recipes.insert_one(&recipe, None).await?;
        Ok(recipe)
    }

    async fn update(
        &self,
        scope: &RecipeScope,
        update: &RecipeUpdate,
    ) -> Result<bool, MongoRepError> {
        let result = self
            .recipes
            .update_one(scope.filter(), update.to_document()?, None)
            .await?;
        debug!(
            op = update.name(),
            matched = result.matched_count,
            modified = result.modified_count,
            "recipe updated"
        );
        Ok(result.matched_count > 0)
    }

    async fn replace(&self, scope: &RecipeScope, recipe: &Recipe) -> Result<(), MongoRepError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        match self
            .recipes
            .replace_one(scope.filter(), recipe, options)
            .await
        {
            Ok(_) => Ok(()),
            // the upsert collided with an id owned by someone else
            Err(e) if is_duplicate_key(&e) => {
                Err(MongoRepError::ForeignRecipe(scope.recipe_id()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, scope: &RecipeScope) -> Result<bool, MongoRepError> {
        let result = self.recipes.delete_one(scope.filter(), None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn grocery_sections(
        &self,
        owner: &Owner,
    ) -> Result<Option<GrocerySections>, MongoRepError> {
        self.grocery_sections
            .find_one(owner.filter(), None)
            .await
            .map_err(MongoRepError::from)
    }
}
