mod infra;
use infra::*;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[macro_use]
extern crate rocket;

pub struct CORS {
    origin: String,
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Attaching CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new(
            "Access-Control-Allow-Origin",
            self.origin.clone(),
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[derive(Error, Debug)]
enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not prepare storage directories: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] MongoRepError),
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Rocket(#[from] rocket::Error),
}

pub fn build(service: RecipeService, config: Config) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", 10.mebibytes())
        .limit("data-form", 12.mebibytes());
    let figment = rocket::Config::figment().merge(("limits", limits));

    rocket::custom(figment)
        .manage(service)
        .mount(
            "/api",
            routes![
                get_recipes,
                add_recipe,
                add_full_recipe,
                delete_recipe,
                delete_recipe_ingredient,
                add_recipe_ingredient,
                save_edited_recipe,
                rate,
                upload_recipe_image,
                update_recipe_details_times,
                update_recipe_details_notes,
                update_recipe_details_instructions,
                update_recipe_meal_type
            ],
        )
        .mount("/images", FileServer::from(&config.blob_root))
        .register("/", catchers![default_catcher])
        .attach(CORS {
            origin: config.cors_origin.clone(),
        })
        .manage(config)
}

#[rocket::main]
async fn main() -> Result<(), LaunchError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load()?;
    std::fs::create_dir_all(&config.blob_root)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    info!("Connecting to {}", config.mongo_uri);
    let db = MongoRep::init(&config.mongo_uri, &config.mongo_database).await?;
    let blobs = FsBlobStore::new(&config.blob_root, &config.blob_public_url);
    let scraper = HttpScraper::new(&config.scraper_endpoint)?;
    let service = RecipeService::new(Arc::new(db), Arc::new(blobs), Arc::new(scraper));

    let _ = build(service, config).launch().await?;
    Ok(())
}
