use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::Deserialize;

use crate::infra::mongo::types::{Image, Ingredient};

/// The set of field-scoped mutations a recipe accepts. Each variant touches
/// only the fields it names; whole-document replacement is a separate
/// store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeUpdate {
    SetRating(f64),
    PushIngredient(Ingredient),
    PullIngredient(ObjectId),
    PrependImage(Image),
    SetTimes(DetailTimes),
    SetNotes(String),
    SetInstructions(String),
    SetMealType(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailTimes {
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default, alias = "dificulty")]
    pub difficulty: Option<String>,
    pub servings: i32,
}

impl RecipeUpdate {
    /// Renders the update as document-store operators.
    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        let update = match self {
            RecipeUpdate::SetRating(rating) => doc! { "$set": { "rating": *rating } },
            RecipeUpdate::PushIngredient(ingredient) => {
                doc! { "$push": { "ingredients": bson::to_bson(ingredient)? } }
            }
            RecipeUpdate::PullIngredient(id) => {
                doc! { "$pull": { "ingredients": { "_id": *id } } }
            }
            RecipeUpdate::PrependImage(image) => doc! {
                "$push": {
                    "recipeDetails.images": {
                        "$each": [bson::to_bson(image)?],
                        "$position": 0,
                    }
                }
            },
            RecipeUpdate::SetTimes(times) => doc! {
                "$set": {
                    "recipeDetails.cookTime": times.cook_time.clone(),
                    "recipeDetails.prepTime": times.prep_time.clone(),
                    "recipeDetails.difficulty": times.difficulty.clone(),
                    "servings": times.servings,
                }
            },
            RecipeUpdate::SetNotes(notes) => doc! { "$set": { "recipeDetails.notes": notes } },
            RecipeUpdate::SetInstructions(instructions) => {
                doc! { "$set": { "recipeDetails.instructions": instructions } }
            }
            RecipeUpdate::SetMealType(meal_type) => doc! { "$set": { "mealType": meal_type } },
        };
        Ok(update)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecipeUpdate::SetRating(_) => "set_rating",
            RecipeUpdate::PushIngredient(_) => "push_ingredient",
            RecipeUpdate::PullIngredient(_) => "pull_ingredient",
            RecipeUpdate::PrependImage(_) => "prepend_image",
            RecipeUpdate::SetTimes(_) => "set_times",
            RecipeUpdate::SetNotes(_) => "set_notes",
            RecipeUpdate::SetInstructions(_) => "set_instructions",
            RecipeUpdate::SetMealType(_) => "set_meal_type",
        }
    }
}
