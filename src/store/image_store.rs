use crate::image_ops::profiles::ImageProfile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to build profile signature: {0}")]
    Signature(#[from] serde_json::Error),

    #[error("Media file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] fjall::Error),

    #[error("Corrupted record: {0}")]
    Encoding(#[from] postcard::Error),

    #[error("Store task failed: {0}")]
    Task(#[from] JoinError),
}

/// Generated image, persisted once per distinct signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: u64,
    /// Location relative to the media root
    pub file_location: String,
    pub signature: String,
}

/// Signature keyed storage of generated images.
///
/// At most one record exists per signature. Storing a signature which is
/// already present keeps the existing record and returns its url.
#[async_trait]
pub trait ImageStore {
    /// Public url of the image stored for the profile, if any
    async fn lookup(&self, profile: &ImageProfile) -> Result<Option<String>, StoreError>;

    /// Persist the file generated for the profile and return its public url
    async fn store(&self, file_path: &Path, profile: &ImageProfile) -> Result<String, StoreError>;

    async fn record(&self, signature: &str) -> Result<Option<StoredImage>, StoreError>;
}
