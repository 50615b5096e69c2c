pub mod blob;
pub mod config;
pub mod error;
pub mod guards;
pub mod mongo;
pub mod recipes;
pub mod routes;
pub mod scraper;
#[cfg(test)]
pub mod testing;

pub use blob::FsBlobStore;
pub use config::{Config, ConfigError};
pub use mongo::api::{MongoRep, MongoRepError};
pub use recipes::RecipeService;
pub use routes::*;
pub use scraper::{HttpScraper, ScraperError};
