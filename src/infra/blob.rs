//! Recipe image storage, laid out as `<root>/<owner>/<recipe>/<file>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mongodb::bson::oid::ObjectId;
use rocket::tokio::fs;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Image storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image name {0:?} is not usable")]
    InvalidName(String),
}

#[rocket::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the file at `local_path` under the recipe's directory and
    /// returns its public URL.
    async fn upload_file(
        &self,
        local_path: &Path,
        display_name: &str,
        owner_id: ObjectId,
        recipe_id: ObjectId,
    ) -> Result<String, BlobError>;

    /// Releases everything stored for the recipe. An absent directory is
    /// already empty.
    async fn empty_directory(&self, owner_id: ObjectId, recipe_id: ObjectId)
        -> Result<(), BlobError>;
}

pub struct FsBlobStore {
    root: PathBuf,
    public_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        FsBlobStore {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn recipe_dir(&self, owner_id: ObjectId, recipe_id: ObjectId) -> PathBuf {
        self.root
            .join(owner_id.to_hex())
            .join(recipe_id.to_hex())
    }
}

/// Keeps `[A-Za-z0-9._-]`, replacing anything else, and refuses names that
/// would escape the recipe directory.
fn sanitize(display_name: &str) -> Result<String, BlobError> {
    let cleaned: String = display_name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return Err(BlobError::InvalidName(display_name.to_string()));
    }
    Ok(cleaned.to_string())
}

#[rocket::async_trait]
impl BlobStore for FsBlobStore {
    async fn upload_file(
        &self,
        local_path: &Path,
        display_name: &str,
        owner_id: ObjectId,
        recipe_id: ObjectId,
    ) -> Result<String, BlobError> {
        let dir = self.recipe_dir(owner_id, recipe_id);
        fs::create_dir_all(&dir).await?;

        // unique prefix so re-uploading the same name never clobbers
        let file_name = format!("{}-{}", ObjectId::new().to_hex(), sanitize(display_name)?);
        fs::copy(local_path, dir.join(&file_name)).await?;
        debug!(path = %dir.join(&file_name).display(), "stored recipe image");

        Ok(format!(
            "{}/{}/{}/{}",
            self.public_url,
            owner_id.to_hex(),
            recipe_id.to_hex(),
            file_name
        ))
    }

    async fn empty_directory(
        &self,
        owner_id: ObjectId,
        recipe_id: ObjectId,
    ) -> Result<(), BlobError> {
        let dir = self.recipe_dir(owner_id, recipe_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(path = %dir.display(), "released recipe images");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
