//! In-memory stand-ins for the store, blob storage and scraper.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mongodb::bson::oid::ObjectId;

use super::blob::{BlobError, BlobStore};
use super::mongo::api::MongoRepError;
use super::mongo::types::{GrocerySections, Recipe, RecipeDetails, DEFAULT_SOURCE_URL};
use super::recipes::{Owner, RecipeDraft, RecipeScope, RecipeService, RecipeStore, RecipeUpdate};
use super::scraper::{ScrapeOutcome, Scraper, ScraperError};

pub fn draft(json: &str) -> RecipeDraft {
    rocket::serde::json::from_str(json).unwrap()
}

/// Mirrors what the document store does with each update operator.
fn apply_update(recipe: &mut Recipe, update: &RecipeUpdate) {
    let details = &mut recipe.recipe_details;
    match update.clone() {
        RecipeUpdate::SetRating(rating) => recipe.rating = Some(rating),
        RecipeUpdate::PushIngredient(ingredient) => recipe.ingredients.push(ingredient),
        RecipeUpdate::PullIngredient(id) => recipe.ingredients.retain(|i| i.id != id),
        RecipeUpdate::PrependImage(image) => details.images.insert(0, image),
        RecipeUpdate::SetTimes(times) => {
            details.cook_time = times.cook_time;
            details.prep_time = times.prep_time;
            details.difficulty = times.difficulty;
            recipe.servings = times.servings;
        }
        RecipeUpdate::SetNotes(notes) => details.notes = Some(notes),
        RecipeUpdate::SetInstructions(text) => details.instructions = Some(text),
        RecipeUpdate::SetMealType(meal_type) => recipe.meal_type = Some(meal_type),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    recipes: Mutex<Vec<Recipe>>,
    sections: Mutex<Vec<GrocerySections>>,
}

impl MemoryStore {
    pub fn get(&self, id: ObjectId) -> Option<Recipe> {
        let recipes = self.recipes.lock().unwrap();
        recipes.iter().find(|r| r.id == Some(id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.recipes.lock().unwrap().len()
    }

    pub fn add_sections(&self, owner: &Owner, default_section: &str) {
        self.sections.lock().unwrap().push(GrocerySections {
            id: Some(ObjectId::new()),
            user_id: owner.id(),
            default_section: default_section.to_string(),
        });
    }
}

#[rocket::async_trait]
impl RecipeStore for MemoryStore {
    async fn find_owned(&self, owner: &Owner) -> Result<Vec<Recipe>, MongoRepError> {
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes
            .iter()
            .filter(|r| r.user_id == owner.id())
            .cloned()
            .collect())
    }

    async fn find_one(&self, scope: &RecipeScope) -> Result<Option<Recipe>, MongoRepError> {
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes
            .iter()
            .find(|r| scope.matches(r.id, r.user_id))
            .cloned())
    }

    async fn insert(&self, mut recipe: Recipe) -> Result<Recipe, MongoRepError> {
        recipe.id = Some(recipe.id.unwrap_or_else(ObjectId::new));
        self.recipes.lock().unwrap().push(recipe.clone());
        Ok(recipe)
    }

    async fn update(
        &self,
        scope: &RecipeScope,
        update: &RecipeUpdate,
    ) -> Result<bool, MongoRepError> {
        let mut recipes = self.recipes.lock().unwrap();
        match recipes.iter_mut().find(|r| scope.matches(r.id, r.user_id)) {
            Some(recipe) => {
                apply_update(recipe, update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace(&self, scope: &RecipeScope, recipe: &Recipe) -> Result<(), MongoRepError> {
        let mut recipes = self.recipes.lock().unwrap();
        if let Some(existing) = recipes.iter_mut().find(|r| scope.matches(r.id, r.user_id)) {
            *existing = recipe.clone();
            return Ok(());
        }
        if recipes.iter().any(|r| r.id == Some(scope.recipe_id())) {
            return Err(MongoRepError::ForeignRecipe(scope.recipe_id()));
        }
        recipes.push(recipe.clone());
        Ok(())
    }

    async fn remove(&self, scope: &RecipeScope) -> Result<bool, MongoRepError> {
        let mut recipes = self.recipes.lock().unwrap();
        let before = recipes.len();
        recipes.retain(|r| !scope.matches(r.id, r.user_id));
        Ok(recipes.len() < before)
    }

    async fn grocery_sections(
        &self,
        owner: &Owner,
    ) -> Result<Option<GrocerySections>, MongoRepError> {
        let sections = self.sections.lock().unwrap();
        Ok(sections.iter().find(|s| s.user_id == owner.id()).cloned())
    }
}

/// Records every call and fails on request. Each release also notes whether
/// the recipe document was still stored at that moment.
pub struct RecordingBlobs {
    store: Arc<MemoryStore>,
    uploads: Mutex<Vec<(PathBuf, String, ObjectId, ObjectId)>>,
    emptied: Mutex<Vec<(ObjectId, ObjectId, bool)>>,
    upload_failure: Mutex<Option<String>>,
    empty_failure: Mutex<Option<String>>,
}

fn failure(message: &str) -> BlobError {
    BlobError::Io(std::io::Error::new(std::io::ErrorKind::Other, message))
}

impl RecordingBlobs {
    pub fn watching(store: Arc<MemoryStore>) -> Self {
        RecordingBlobs {
            store,
            uploads: Mutex::default(),
            emptied: Mutex::default(),
            upload_failure: Mutex::default(),
            empty_failure: Mutex::default(),
        }
    }

    pub fn uploads(&self) -> Vec<(PathBuf, String, ObjectId, ObjectId)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn emptied(&self) -> Vec<(ObjectId, ObjectId, bool)> {
        self.emptied.lock().unwrap().clone()
    }

    pub fn fail_upload(&self, message: &str) {
        *self.upload_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_empty(&self, message: &str) {
        *self.empty_failure.lock().unwrap() = Some(message.to_string());
    }
}

#[rocket::async_trait]
impl BlobStore for RecordingBlobs {
    async fn upload_file(
        &self,
        local_path: &Path,
        display_name: &str,
        owner_id: ObjectId,
        recipe_id: ObjectId,
    ) -> Result<String, BlobError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((
            local_path.to_path_buf(),
            display_name.to_string(),
            owner_id,
            recipe_id,
        ));
        if let Some(message) = self.upload_failure.lock().unwrap().as_deref() {
            return Err(failure(message));
        }
        Ok(format!(
            "http://blobs/{}/{}/{}-{}",
            owner_id.to_hex(),
            recipe_id.to_hex(),
            uploads.len(),
            display_name
        ))
    }

    async fn empty_directory(
        &self,
        owner_id: ObjectId,
        recipe_id: ObjectId,
    ) -> Result<(), BlobError> {
        let stored = self.store.get(recipe_id).is_some();
        self.emptied
            .lock()
            .unwrap()
            .push((owner_id, recipe_id, stored));
        match self.empty_failure.lock().unwrap().as_deref() {
            Some(message) => Err(failure(message)),
            None => Ok(()),
        }
    }
}

pub struct StubScraper {
    outcome: Result<ScrapeOutcome, String>,
    calls: Mutex<Vec<String>>,
}

impl StubScraper {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[rocket::async_trait]
impl Scraper for StubScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapeOutcome, ScraperError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.outcome.clone().map_err(ScraperError::Endpoint)
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<RecordingBlobs>,
    pub scraper: Arc<StubScraper>,
    pub service: RecipeService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_scrape(Ok(ScrapeOutcome::Failed("scraper not expected".to_string())))
    }

    pub fn with_scrape(outcome: Result<ScrapeOutcome, String>) -> Self {
        let store = Arc::new(MemoryStore::default());
        let blobs = Arc::new(RecordingBlobs::watching(store.clone()));
        let scraper = Arc::new(StubScraper {
            outcome,
            calls: Mutex::new(vec![]),
        });
        let service = RecipeService::new(store.clone(), blobs.clone(), scraper.clone());
        Harness {
            store,
            blobs,
            scraper,
            service,
        }
    }

    pub fn owner(&self) -> Owner {
        Owner::new(ObjectId::new())
    }

    /// Stores a bare recipe directly, bypassing the service.
    pub fn seed(&self, owner: &Owner, name: &str) -> Recipe {
        let recipe = Recipe {
            id: Some(ObjectId::new()),
            user_id: owner.id(),
            name: name.to_string(),
            servings: 2,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            meal_type: None,
            rating: None,
            ingredients: vec![],
            recipe_details: RecipeDetails::default(),
        };
        self.store.recipes.lock().unwrap().push(recipe.clone());
        recipe
    }
}
