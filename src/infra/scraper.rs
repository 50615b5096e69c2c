use reqwest::Url;
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SCRAPER_ROUTE: &str = "/api/v1/scraper/fullRecipe";

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("scraper request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid scraper endpoint: {0}")]
    Endpoint(String),
    #[error("unexpected scraper reply: {0}")]
    Reply(String),
}

/// Structured recipe data extracted from a web page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScrapedRecipe {
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// What the scraper answered: either recipe data or its own error string.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Scraped(ScrapedRecipe),
    Failed(String),
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Any truthy `error` marks a failed scrape; otherwise the reply must carry a
/// complete recipe.
fn decode_reply(reply: Value) -> Result<ScrapeOutcome, ScraperError> {
    match reply.get("error") {
        Some(Value::String(error)) if !error.is_empty() => {
            return Ok(ScrapeOutcome::Failed(error.clone()))
        }
        Some(error) if truthy(error) => return Ok(ScrapeOutcome::Failed(error.to_string())),
        _ => {}
    }
    ScrapedRecipe::deserialize(reply)
        .map(ScrapeOutcome::Scraped)
        .map_err(|e| ScraperError::Reply(e.to_string()))
}

#[rocket::async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapeOutcome, ScraperError>;
}

#[derive(Clone)]
pub struct HttpScraper {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpScraper {
    pub fn new(base_url: &str) -> Result<Self, ScraperError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(SCRAPER_ROUTE))
            .map_err(|e| ScraperError::Endpoint(format!("{base_url}: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

#[rocket::async_trait]
impl Scraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapeOutcome, ScraperError> {
        let reply: Value = self
            .http
            .post(self.endpoint.clone())
            .json(&ScrapeRequest { url })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        decode_reply(reply)
    }
}
