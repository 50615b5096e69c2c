use mongodb::bson::oid::ObjectId;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Placeholder stored when a recipe has no source URL.
pub const DEFAULT_SOURCE_URL: &str = "http://";
pub const DEFAULT_RECIPE_NAME: &str = "Name Me!";
pub const DEFAULT_SERVINGS: i32 = 1;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    #[serde(deserialize_with = "whole_number")]
    pub servings: i32,
    #[serde(rename = "sourceURL", alias = "URL")]
    pub source_url: String,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    // display order
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub recipe_details: RecipeDetails,
}

/// Older documents store counts as doubles.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => i32::try_from(n).map_err(de::Error::custom),
        Number::Float(f) if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
            Ok(f as i32)
        }
        Number::Float(f) => Err(de::Error::custom(format!("{f} is not a whole number"))),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    // copied from the owner's grocery sections when created, never re-resolved
    #[serde(default)]
    pub grocery_section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    #[serde(default, alias = "Instructions")]
    pub instructions: Option<String>,
    /// Newest upload first.
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default, alias = "dificulty")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Image {
    pub original: String,
    pub thumbnail: String,
}

impl Image {
    /// Both renditions point at the same URL until thumbnails are generated.
    pub fn single(url: impl Into<String>) -> Self {
        let url = url.into();
        Image {
            original: url.clone(),
            thumbnail: url,
        }
    }
}

/// Per-user grocery section mapping. Only the `default` key is consulted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrocerySections {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(rename = "default")]
    pub default_section: String,
}
