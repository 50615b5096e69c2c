use std::path::Path;

use super::config::Config;
use super::error::{parse_id, ApiError, ApiResult, Envelope, ErrorBody, Reply, SERVER_ERROR};
use super::mongo::types::Image;
use super::recipes::{
    dotted_extension, sniff_extension, DetailTimes, ImageUpload, IngredientDraft, IngredientView,
    Owner, RecipeDraft, RecipeScope, RecipeService, RecipeView, SIGNATURE_LEN,
};
use super::scraper::ScrapedRecipe;
use mongodb::bson::oid::ObjectId;
use rocket::form::{Form, FromForm};
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::serde::json::{self, json, Json, Value};
use rocket::tokio::fs::File;
use rocket::tokio::io::AsyncReadExt;
use rocket::{catch, delete, get, post, Request, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn scoped(id: &str, owner: &Owner) -> ApiResult<RecipeScope> {
    Ok(RecipeScope::new(parse_id(id, "recipe id")?, owner))
}

/// A JSON body that failed to parse is answered by the handler, not a catcher.
type JsonBody<'r, T> = Result<Json<T>, json::Error<'r>>;

fn accept<T>(body: JsonBody<'_, T>) -> ApiResult<T> {
    body.map(Json::into_inner).map_err(|e| {
        debug!(error = %e, "rejected request body");
        ApiError::Validation(vec![e.to_string()])
    })
}

fn done() -> Reply<()> {
    Envelope::ok().reply(Status::Ok)
}

#[get("/recipes")]
pub async fn get_recipes(
    service: &State<RecipeService>,
    owner: Owner,
) -> ApiResult<Reply<Vec<RecipeView>>> {
    let recipes: Vec<RecipeView> = service
        .list(&owner)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let count = recipes.len();
    Ok(Envelope::data(recipes).with_count(count).reply(Status::Ok))
}

#[post("/recipes", data = "<draft>")]
pub async fn add_recipe(
    service: &State<RecipeService>,
    owner: Owner,
    draft: JsonBody<'_, RecipeDraft>,
) -> ApiResult<Reply<RecipeView>> {
    let created = service.create(&owner, accept(draft)?).await?;
    Ok(Envelope::data(RecipeView::from(created.recipe))
        .with_scraper(created.scraper)
        .reply(Status::Created))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullRecipeRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    servings: Option<i32>,
    #[serde(default)]
    meal_type: Option<String>,
    #[serde(flatten)]
    scraped: ScrapedRecipe,
}

#[post("/recipes/addFull", data = "<request>")]
pub async fn add_full_recipe(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, FullRecipeRequest>,
) -> ApiResult<Reply<RecipeView>> {
    let FullRecipeRequest {
        name,
        servings,
        meal_type,
        scraped,
    } = accept(request)?;
    let draft = RecipeDraft {
        name,
        servings,
        meal_type,
        ..RecipeDraft::default()
    };
    let recipe = service.create_full(&owner, draft, scraped).await?;
    Ok(Envelope::data(RecipeView::from(recipe)).reply(Status::Created))
}

#[delete("/recipes/<id>")]
pub async fn delete_recipe(
    service: &State<RecipeService>,
    owner: Owner,
    id: &str,
) -> ApiResult<Reply<Value>> {
    service.delete(&scoped(id, &owner)?).await?;
    Ok(Envelope::data(json!({})).reply(Status::Ok))
}

#[delete("/recipes/<recipe_id>/<ingredient_id>")]
pub async fn delete_recipe_ingredient(
    service: &State<RecipeService>,
    owner: Owner,
    recipe_id: &str,
    ingredient_id: &str,
) -> ApiResult<Reply<Value>> {
    let scope = scoped(recipe_id, &owner)?;
    let ingredient_id = parse_id(ingredient_id, "ingredient id")?;
    service.remove_ingredient(&scope, ingredient_id).await?;
    Ok(Envelope::data(json!({})).reply(Status::Ok))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddIngredientRequest {
    recipe_id: String,
    ingredient: IngredientDraft,
}

#[derive(Debug, Serialize)]
pub struct AddedIngredient {
    ingredient: IngredientView,
    recipe: String,
}

#[post("/recipes/ingredient", data = "<request>")]
pub async fn add_recipe_ingredient(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, AddIngredientRequest>,
) -> ApiResult<Reply<AddedIngredient>> {
    let AddIngredientRequest {
        recipe_id,
        ingredient,
    } = accept(request)?;
    let scope = scoped(&recipe_id, &owner)?;
    let ingredient = service.add_ingredient(&scope, ingredient).await?;
    Ok(Envelope::data(AddedIngredient {
        ingredient: ingredient.into(),
        recipe: recipe_id,
    })
    .reply(Status::Ok))
}

#[derive(Debug, Deserialize)]
pub struct EditRecipeRequest {
    #[serde(rename = "_id")]
    id: String,
    #[serde(flatten)]
    recipe: RecipeDraft,
}

#[post("/recipes/edit", data = "<request>")]
pub async fn save_edited_recipe(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, EditRecipeRequest>,
) -> ApiResult<Reply<()>> {
    let EditRecipeRequest { id, recipe } = accept(request)?;
    service.replace(&scoped(&id, &owner)?, recipe).await?;
    Ok(done())
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    #[serde(rename = "_id")]
    id: String,
    rating: f64,
}

#[post("/recipes/rate", data = "<request>")]
pub async fn rate(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, RateRequest>,
) -> ApiResult<Reply<()>> {
    let RateRequest { id, rating } = accept(request)?;
    service.set_rating(&scoped(&id, &owner)?, rating).await?;
    Ok(done())
}

#[derive(FromForm)]
pub struct ImageForm<'r> {
    file: TempFile<'r>,
    name: String,
    #[field(name = "recipeId")]
    recipe_id: String,
}

#[post("/recipes/details/uploadImage", data = "<form>")]
pub async fn upload_recipe_image(
    service: &State<RecipeService>,
    config: &State<Config>,
    owner: Owner,
    mut form: Form<ImageForm<'_>>,
) -> ApiResult<Reply<Image>> {
    let scope = scoped(&form.recipe_id, &owner)?;
    let reported_extension = form.file.raw_name().and_then(|name| {
        Path::new(name.dangerous_unsafe_unsanitized_raw().as_str())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(dotted_extension)
    });

    let staged = config.upload_dir.join(ObjectId::new().to_hex());
    form.file.copy_to(&staged).await?;
    let detected_extension = match read_head(&staged).await {
        Ok(head) => sniff_extension(&head).map(str::to_string),
        Err(e) => {
            discard(&staged).await;
            return Err(e.into());
        }
    };
    let upload = ImageUpload {
        local_path: staged.clone(),
        detected_extension,
        reported_extension,
        display_name: form.name.clone(),
    };
    let result = service.upload_image(&scope, upload).await;
    discard(&staged).await;
    Ok(Envelope::data(result?).reply(Status::Ok))
}

async fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SIGNATURE_LEN);
    File::open(path)
        .await?
        .take(SIGNATURE_LEN as u64)
        .read_to_end(&mut head)
        .await?;
    Ok(head)
}

async fn discard(staged: &Path) {
    if let Err(e) = rocket::tokio::fs::remove_file(staged).await {
        warn!(path = %staged.display(), error = %e, "could not remove staged upload");
    }
}

#[derive(Debug, Deserialize)]
pub struct TimesRequest {
    #[serde(rename = "_id")]
    id: String,
    data: DetailTimes,
}

#[post("/recipes/details/times", data = "<request>")]
pub async fn update_recipe_details_times(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, TimesRequest>,
) -> ApiResult<Reply<()>> {
    let TimesRequest { id, data } = accept(request)?;
    service.update_times(&scoped(&id, &owner)?, data).await?;
    Ok(done())
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    #[serde(rename = "_id")]
    id: String,
    notes: String,
}

#[post("/recipes/details/notes", data = "<request>")]
pub async fn update_recipe_details_notes(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, NotesRequest>,
) -> ApiResult<Reply<()>> {
    let NotesRequest { id, notes } = accept(request)?;
    service.update_notes(&scoped(&id, &owner)?, notes).await?;
    Ok(done())
}

#[derive(Debug, Deserialize)]
pub struct InstructionsRequest {
    #[serde(rename = "_id")]
    id: String,
    instructions: String,
}

#[post("/recipes/details/instructions", data = "<request>")]
pub async fn update_recipe_details_instructions(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, InstructionsRequest>,
) -> ApiResult<Reply<()>> {
    let InstructionsRequest { id, instructions } = accept(request)?;
    service
        .update_instructions(&scoped(&id, &owner)?, instructions)
        .await?;
    Ok(done())
}

#[derive(Debug, Deserialize)]
pub struct MealTypeRequest {
    #[serde(rename = "recipeId", alias = "_id")]
    id: String,
    #[serde(rename = "mealTypeName", alias = "mealType")]
    meal_type: String,
}

#[post("/recipes/mealType", data = "<request>")]
pub async fn update_recipe_meal_type(
    service: &State<RecipeService>,
    owner: Owner,
    request: JsonBody<'_, MealTypeRequest>,
) -> ApiResult<Reply<()>> {
    let MealTypeRequest { id, meal_type } = accept(request)?;
    service
        .update_meal_type(&scoped(&id, &owner)?, meal_type)
        .await?;
    Ok(done())
}

/// Framework-level failures (no caller id, unmatched route, unparseable
/// body) get the same envelope as handler errors.
#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request<'_>) -> Reply<()> {
    let message = match status.code {
        401 => "Not authorized",
        404 => "Not Found",
        400 | 413 | 422 => "Malformed request",
        _ if status.code >= 500 => SERVER_ERROR,
        _ => status.reason().unwrap_or(SERVER_ERROR),
    };
    Envelope::failure(ErrorBody::Message(message.to_string())).reply(status)
}
