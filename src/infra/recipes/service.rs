use std::path::{Path, PathBuf};
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use tracing::{info, warn};

use crate::infra::blob::BlobStore;
use crate::infra::error::{ApiError, ApiResult};
use crate::infra::mongo::api::MongoRepError;
use crate::infra::mongo::types::{Image, Ingredient, Recipe};
use crate::infra::scraper::{ScrapeOutcome, ScrapedRecipe, Scraper};

use super::assembly::{build_full_recipe, BaseRecipe};
use super::draft::{check_rating, check_servings, IngredientDraft, RecipeDraft};
use super::scope::{Owner, RecipeScope};
use super::store::RecipeStore;
use super::update::{DetailTimes, RecipeUpdate};

pub const ACCEPTED_IMAGE_TYPES: [&str; 5] = [".jpe", ".jpg", ".jpeg", ".png", ".ico"];
pub const SCRAPER_SUCCESS: &str = "success";
pub const SCRAPER_UNAVAILABLE: &str = "Scraper unavailable";

/// Result of a create: the stored recipe and, when a URL was given, how the
/// scraper fared.
#[derive(Debug)]
pub struct Created {
    pub recipe: Recipe,
    pub scraper: Option<String>,
}

/// An uploaded image staged on local disk.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub local_path: PathBuf,
    /// Extension derived from the uploaded content, with leading dot.
    pub detected_extension: Option<String>,
    /// Extension of the file name the client sent.
    pub reported_extension: Option<String>,
    pub display_name: String,
}

impl ImageUpload {
    fn accepted_extension(&self) -> ApiResult<&str> {
        match self.detected_extension.as_deref() {
            Some(ext) if ACCEPTED_IMAGE_TYPES.contains(&ext) => Ok(ext),
            _ => Err(ApiError::invalid(format!(
                "Invalid file type: {}",
                self.reported_extension.as_deref().unwrap_or("Unknown")
            ))),
        }
    }

    fn storage_name(&self, extension: &str) -> String {
        let stem = Path::new(self.display_name.trim())
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("image");
        format!("{stem}{extension}")
    }
}

/// Bytes needed to recognise every accepted image signature.
pub const SIGNATURE_LEN: usize = 8;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const ICO_SIGNATURE: &[u8] = &[0x00, 0x00, 0x01, 0x00];

/// Image type read from the file's leading bytes.
pub fn sniff_extension(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(PNG_SIGNATURE) {
        Some(".png")
    } else if head.starts_with(JPEG_SIGNATURE) {
        Some(".jpg")
    } else if head.starts_with(ICO_SIGNATURE) {
        Some(".ico")
    } else {
        None
    }
}

/// Normalizes `"PNG"`, `".png"` and `"png"` to `".png"`.
pub fn dotted_extension(ext: &str) -> String {
    format!(".{}", ext.trim_start_matches('.').to_ascii_lowercase())
}

#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    blobs: Arc<dyn BlobStore>,
    scraper: Arc<dyn Scraper>,
}

impl RecipeService {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        blobs: Arc<dyn BlobStore>,
        scraper: Arc<dyn Scraper>,
    ) -> Self {
        RecipeService {
            store,
            blobs,
            scraper,
        }
    }

    pub async fn list(&self, owner: &Owner) -> ApiResult<Vec<Recipe>> {
        Ok(self.store.find_owned(owner).await?)
    }

    /// Creates a recipe, seeding it from the scraper when a source URL is
    /// given. A scraper failure still stores the base recipe.
    pub async fn create(&self, owner: &Owner, draft: RecipeDraft) -> ApiResult<Created> {
        draft.validate()?;
        let url = draft
            .source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        let Some(url) = url else {
            let recipe = self.store.insert(draft.into_recipe(None, owner)?).await?;
            info!(recipe = ?recipe.id, "created recipe");
            return Ok(Created {
                recipe,
                scraper: None,
            });
        };

        let (recipe, scraper) = match self.scraper.scrape(&url).await {
            Ok(ScrapeOutcome::Scraped(data)) => {
                let recipe = self.assemble(owner, draft.base(), data).await?;
                (recipe, SCRAPER_SUCCESS.to_string())
            }
            Ok(ScrapeOutcome::Failed(error)) => {
                warn!(%url, %error, "scraper rejected url, storing base recipe");
                (draft.into_recipe(None, owner)?, error)
            }
            Err(e) => {
                warn!(%url, error = %e, "scraper unreachable, storing base recipe");
                (draft.into_recipe(None, owner)?, SCRAPER_UNAVAILABLE.to_string())
            }
        };
        let recipe = self.store.insert(recipe).await?;
        info!(recipe = ?recipe.id, %url, "created recipe from url");
        Ok(Created {
            recipe,
            scraper: Some(scraper),
        })
    }

    /// Creates a recipe from scraped data the client already holds.
    pub async fn create_full(
        &self,
        owner: &Owner,
        draft: RecipeDraft,
        scraped: ScrapedRecipe,
    ) -> ApiResult<Recipe> {
        draft.validate()?;
        let recipe = self.assemble(owner, draft.base(), scraped).await?;
        Ok(self.store.insert(recipe).await?)
    }

    async fn assemble(
        &self,
        owner: &Owner,
        base: BaseRecipe,
        scraped: ScrapedRecipe,
    ) -> ApiResult<Recipe> {
        let sections = self.store.grocery_sections(owner).await?;
        Ok(build_full_recipe(base, owner, sections.as_ref(), scraped)?)
    }

    /// Releases the recipe's images, then removes the document. A failed
    /// release leaves the document in place.
    pub async fn delete(&self, scope: &RecipeScope) -> ApiResult<()> {
        if self.store.find_one(scope).await?.is_none() {
            return Err(ApiError::NotFound);
        }
        self.blobs
            .empty_directory(scope.owner().id(), scope.recipe_id())
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;
        if !self.store.remove(scope).await? {
            return Err(ApiError::NotFound);
        }
        info!(recipe = %scope.recipe_id(), "deleted recipe");
        Ok(())
    }

    pub async fn remove_ingredient(
        &self,
        scope: &RecipeScope,
        ingredient_id: ObjectId,
    ) -> ApiResult<()> {
        self.apply(scope, RecipeUpdate::PullIngredient(ingredient_id))
            .await
    }

    pub async fn add_ingredient(
        &self,
        scope: &RecipeScope,
        draft: IngredientDraft,
    ) -> ApiResult<Ingredient> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::invalid("Ingredient name is required"));
        }
        let ingredient = draft.into_ingredient()?;
        self.apply(scope, RecipeUpdate::PushIngredient(ingredient.clone()))
            .await?;
        Ok(ingredient)
    }

    /// Replaces the whole document, creating it when absent.
    pub async fn replace(&self, scope: &RecipeScope, draft: RecipeDraft) -> ApiResult<()> {
        let recipe = draft.into_recipe(Some(scope.recipe_id()), scope.owner())?;
        match self.store.replace(scope, &recipe).await {
            Ok(()) => Ok(()),
            Err(MongoRepError::ForeignRecipe(id)) => {
                warn!(recipe = %id, "edit targeted a recipe owned by another user");
                Err(ApiError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set_rating(&self, scope: &RecipeScope, rating: f64) -> ApiResult<()> {
        let mut messages = vec![];
        check_rating(rating, &mut messages);
        if !messages.is_empty() {
            return Err(ApiError::Validation(messages));
        }
        self.apply(scope, RecipeUpdate::SetRating(rating)).await
    }

    /// Stores the image and puts it at the front of the recipe's images.
    pub async fn upload_image(&self, scope: &RecipeScope, upload: ImageUpload) -> ApiResult<Image> {
        let extension = upload.accepted_extension()?;
        if self.store.find_one(scope).await?.is_none() {
            return Err(ApiError::NotFound);
        }
        let url = self
            .blobs
            .upload_file(
                &upload.local_path,
                &upload.storage_name(extension),
                scope.owner().id(),
                scope.recipe_id(),
            )
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;
        let image = Image::single(url);
        self.apply(scope, RecipeUpdate::PrependImage(image.clone()))
            .await?;
        Ok(image)
    }

    pub async fn update_times(&self, scope: &RecipeScope, times: DetailTimes) -> ApiResult<()> {
        let mut messages = vec![];
        check_servings(times.servings, &mut messages);
        if !messages.is_empty() {
            return Err(ApiError::Validation(messages));
        }
        self.apply(scope, RecipeUpdate::SetTimes(times)).await
    }

    pub async fn update_notes(&self, scope: &RecipeScope, notes: String) -> ApiResult<()> {
        self.apply(scope, RecipeUpdate::SetNotes(notes)).await
    }

    pub async fn update_instructions(
        &self,
        scope: &RecipeScope,
        instructions: String,
    ) -> ApiResult<()> {
        self.apply(scope, RecipeUpdate::SetInstructions(instructions))
            .await
    }

    pub async fn update_meal_type(&self, scope: &RecipeScope, meal_type: String) -> ApiResult<()> {
        self.apply(scope, RecipeUpdate::SetMealType(meal_type)).await
    }

    async fn apply(&self, scope: &RecipeScope, update: RecipeUpdate) -> ApiResult<()> {
        if self.store.update(scope, &update).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }
}
