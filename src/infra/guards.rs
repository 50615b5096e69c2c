use mongodb::bson::oid::ObjectId;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use tracing::debug;

use super::error::ApiError;
use super::recipes::Owner;

/// Set by the authenticating gateway in front of this service.
pub const OWNER_HEADER: &str = "X-User-Id";

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Owner {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.headers().get_one(OWNER_HEADER).map(ObjectId::parse_str) {
            Some(Ok(id)) => Outcome::Success(Owner::new(id)),
            _ => {
                debug!(uri = %req.uri(), "missing or malformed caller id");
                Outcome::Error((Status::Unauthorized, ApiError::Unauthorized))
            }
        }
    }
}
