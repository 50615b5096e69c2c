//! The recipe aggregate: ownership scoping, the field-scoped update catalog,
//! assembly from scraped data and the operations built on them.

mod assembly;
mod draft;
mod scope;
mod service;
mod store;
mod update;

pub use assembly::AssemblyError;
pub use draft::{IngredientDraft, IngredientView, RecipeDraft, RecipeView};
pub use scope::{Owner, RecipeScope};
pub use service::{
    dotted_extension, sniff_extension, ImageUpload, RecipeService, SIGNATURE_LEN,
};
pub use store::RecipeStore;
pub use update::{DetailTimes, RecipeUpdate};
