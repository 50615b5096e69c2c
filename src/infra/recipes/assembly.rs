use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::infra::mongo::types::{
    GrocerySections, Image, Ingredient, Recipe, RecipeDetails, DEFAULT_SOURCE_URL,
};
use crate::infra::scraper::ScrapedRecipe;

use super::scope::Owner;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("no grocery sections configured for user {0}")]
    MissingGrocerySections(ObjectId),
}

/// Caller-supplied part of a recipe built from scraped data.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRecipe {
    pub name: String,
    pub servings: i32,
    pub meal_type: Option<String>,
}

/// Builds a recipe from scraper output. Every scraped ingredient goes into
/// the owner's default grocery section; the user re-sorts them later.
pub fn build_full_recipe(
    base: BaseRecipe,
    owner: &Owner,
    sections: Option<&GrocerySections>,
    scraped: ScrapedRecipe,
) -> Result<Recipe, AssemblyError> {
    let sections = sections.ok_or(AssemblyError::MissingGrocerySections(owner.id()))?;

    let ingredients = scraped
        .ingredients
        .into_iter()
        .map(|name| Ingredient {
            id: ObjectId::new(),
            name,
            grocery_section: Some(sections.default_section.clone()),
        })
        .collect();

    let images = if scraped.url.is_empty() {
        vec![]
    } else {
        vec![Image::single(scraped.image)]
    };

    let source_url = if scraped.url.is_empty() {
        DEFAULT_SOURCE_URL.to_string()
    } else {
        scraped.url
    };

    Ok(Recipe {
        id: None,
        user_id: owner.id(),
        name: base.name,
        servings: base.servings,
        source_url,
        meal_type: base.meal_type,
        rating: None,
        ingredients,
        recipe_details: RecipeDetails {
            instructions: Some(scraped.instructions),
            images,
            ..RecipeDetails::default()
        },
    })
}
