//! Response envelope and the error type every handler returns.

use mongodb::bson::oid::ObjectId;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use super::mongo::api::MongoRepError;
use super::recipes::AssemblyError;

/// Body returned to clients in place of any internal error detail.
pub const SERVER_ERROR: &str = "Server Error";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Message(String),
    Messages(Vec<String>),
}

/// `{success, count?, scraper?, data?, error?}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

pub type Reply<T> = (Status, Json<Envelope<T>>);

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Envelope {
            success: true,
            count: None,
            scraper: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_scraper(mut self, scraper: Option<String>) -> Self {
        self.scraper = scraper;
        self
    }

    pub fn reply(self, status: Status) -> Reply<T> {
        (status, Json(self))
    }
}

impl Envelope<()> {
    pub fn ok() -> Self {
        Envelope {
            success: true,
            count: None,
            scraper: None,
            data: None,
            error: None,
        }
    }

    pub fn failure(error: ErrorBody) -> Self {
        Envelope {
            success: false,
            count: None,
            scraper: None,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
    #[error("No recipe found")]
    NotFound,
    #[error("Not authorized")]
    Unauthorized,
    /// A collaborator reported failure; its message is passed through.
    #[error("{0}")]
    Upstream(String),
    #[error("store error: {0}")]
    Store(#[from] MongoRepError),
    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::NotFound => Status::NotFound,
            ApiError::Unauthorized => Status::Unauthorized,
            ApiError::Upstream(_)
            | ApiError::Store(_)
            | ApiError::Assembly(_)
            | ApiError::Io(_) => Status::InternalServerError,
        }
    }

    /// What the client sees. Internal variants collapse to [`SERVER_ERROR`].
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation(messages) => ErrorBody::Messages(messages.clone()),
            ApiError::NotFound | ApiError::Unauthorized => ErrorBody::Message(self.to_string()),
            ApiError::Upstream(message) => ErrorBody::Message(message.clone()),
            ApiError::Store(_) | ApiError::Assembly(_) | ApiError::Io(_) => {
                ErrorBody::Message(SERVER_ERROR.to_string())
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            ApiError::Store(_) | ApiError::Assembly(_) | ApiError::Io(_) => {
                error!(uri = %req.uri(), "{}", self)
            }
            ApiError::Upstream(message) => warn!(uri = %req.uri(), "upstream failure: {message}"),
            _ => {}
        }
        Envelope::failure(self.body())
            .reply(self.status())
            .respond_to(req)
    }
}

pub fn parse_id(value: &str, field: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| ApiError::invalid(format!("Invalid {field}: {value}")))
}
