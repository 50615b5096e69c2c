//! Client-facing recipe shapes: what comes in on create/edit and what goes
//! back out. Ids travel as hex strings.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::infra::error::{parse_id, ApiError, ApiResult};
use crate::infra::mongo::types::{
    Ingredient, Recipe, RecipeDetails, DEFAULT_RECIPE_NAME, DEFAULT_SERVINGS, DEFAULT_SOURCE_URL,
};

use super::assembly::BaseRecipe;
use super::scope::Owner;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default, rename = "sourceURL", alias = "URL")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ingredients: Vec<IngredientDraft>,
    #[serde(default)]
    pub recipe_details: RecipeDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDraft {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub grocery_section: Option<String>,
}

impl IngredientDraft {
    /// Keeps a client-supplied id (edits round-trip them), otherwise assigns one.
    pub fn into_ingredient(self) -> ApiResult<Ingredient> {
        let id = match self.id.as_deref() {
            Some(id) => parse_id(id, "ingredient id")?,
            None => ObjectId::new(),
        };
        Ok(Ingredient {
            id,
            name: self.name,
            grocery_section: self.grocery_section,
        })
    }
}

pub fn check_servings(servings: i32, messages: &mut Vec<String>) {
    if servings < 1 {
        messages.push("Servings must be at least 1".to_string());
    }
}

pub fn check_rating(rating: f64, messages: &mut Vec<String>) {
    if !(0.0..=MAX_RATING).contains(&rating) {
        messages.push(format!("Rating must be between 0 and {MAX_RATING}"));
    }
}

impl RecipeDraft {
    /// Collects every field problem at once, the way the client shows them.
    pub fn validate(&self) -> ApiResult<()> {
        let mut messages = vec![];
        if let Some(name) = &self.name {
            if name.chars().count() > MAX_NAME_LEN {
                messages.push(format!("Name cannot be more than {MAX_NAME_LEN} characters"));
            }
        }
        if let Some(servings) = self.servings {
            check_servings(servings, &mut messages);
        }
        if let Some(rating) = self.rating {
            check_rating(rating, &mut messages);
        }
        if self.ingredients.iter().any(|i| i.name.trim().is_empty()) {
            messages.push("Ingredient name is required".to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(messages))
        }
    }

    pub fn base(&self) -> BaseRecipe {
        BaseRecipe {
            name: self.name_or_default(),
            servings: self.servings.unwrap_or(DEFAULT_SERVINGS),
            meal_type: self.meal_type.clone(),
        }
    }

    fn name_or_default(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_RECIPE_NAME.to_string(),
        }
    }

    /// Stamps the caller as owner; nothing in the draft can name another one.
    pub fn into_recipe(self, id: Option<ObjectId>, owner: &Owner) -> ApiResult<Recipe> {
        self.validate()?;
        let name = self.name_or_default();
        let source_url = match self.source_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_SOURCE_URL.to_string(),
        };
        let ingredients = self
            .ingredients
            .into_iter()
            .map(IngredientDraft::into_ingredient)
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(Recipe {
            id,
            user_id: owner.id(),
            name,
            servings: self.servings.unwrap_or(DEFAULT_SERVINGS),
            source_url,
            meal_type: self.meal_type,
            rating: self.rating,
            ingredients,
            recipe_details: self.recipe_details,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub grocery_section: Option<String>,
}

impl From<Ingredient> for IngredientView {
    fn from(ingredient: Ingredient) -> Self {
        IngredientView {
            id: ingredient.id.to_hex(),
            name: ingredient.name,
            grocery_section: ingredient.grocery_section,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub servings: i32,
    #[serde(rename = "sourceURL")]
    pub source_url: String,
    pub meal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub ingredients: Vec<IngredientView>,
    pub recipe_details: RecipeDetails,
}

impl From<Recipe> for RecipeView {
    fn from(recipe: Recipe) -> Self {
        RecipeView {
            id: recipe.id.map(|id| id.to_hex()),
            user_id: recipe.user_id.to_hex(),
            name: recipe.name,
            servings: recipe.servings,
            source_url: recipe.source_url,
            meal_type: recipe.meal_type,
            rating: recipe.rating,
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
            recipe_details: recipe.recipe_details,
        }
    }
}
