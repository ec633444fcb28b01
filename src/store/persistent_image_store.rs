use crate::image_ops::profiles::{ImageProfile, Profile};
use crate::store::image_store::{ImageStore, StoreError, StoredImage};
use crate::store::media_storage::MediaStorage;
use crate::store::persistent_store::{PersistSpace, PersistentStore};
use async_trait::async_trait;
use log::{debug, info};
use postcard::to_stdvec;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::spawn_blocking;

const IMAGE_ID_SEQUENCE_KEY: &str = "image_id_sequence";

/// Image records kept in the fjall store, files kept in media storage
pub struct PersistentImageStore {
    store: Arc<PersistentStore>,
    media: MediaStorage,
    write_lock: Arc<Mutex<()>>,
}

impl PersistentImageStore {
    pub fn new(store: Arc<PersistentStore>, media: MediaStorage) -> Self {
        PersistentImageStore {
            store,
            media,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Must be called with `write_lock` held
    async fn next_id(&self) -> Result<u64, StoreError> {
        let current = match self
            .store
            .get(PersistSpace::Meta, &IMAGE_ID_SEQUENCE_KEY)
            .await?
        {
            Some(value) => postcard::from_bytes::<u64>(&value)?,
            None => 0,
        };
        let next = current + 1;
        self.store
            .set(PersistSpace::Meta, &IMAGE_ID_SEQUENCE_KEY, &to_stdvec(&next)?)
            .await?;
        Ok(next)
    }
}

#[async_trait]
impl ImageStore for PersistentImageStore {
    async fn lookup(&self, profile: &ImageProfile) -> Result<Option<String>, StoreError> {
        let signature = profile.signature()?;
        let record = self.record(&signature).await?;
        Ok(record.map(|record| self.media.url(&record.file_location)))
    }

    async fn store(&self, file_path: &Path, profile: &ImageProfile) -> Result<String, StoreError> {
        let signature = profile.signature()?;
        let name = profile.upload_file_name();

        // without guard, parallel stores of one signature could both pass the check
        let lock = self.write_lock.clone();
        let _guard = lock.lock().await;

        if let Some(existing) = self.record(&signature).await? {
            debug!(
                "Signature already stored as {}, keeping existing record",
                existing.file_location
            );
            return Ok(self.media.url(&existing.file_location));
        }

        let media = self.media.clone();
        let source = file_path.to_path_buf();
        let file_location = spawn_blocking(move || media.save(&source, &name)).await??;

        let record = StoredImage {
            id: self.next_id().await?,
            file_location,
            signature,
        };
        self.store
            .set(PersistSpace::Images, &record.signature, &to_stdvec(&record)?)
            .await?;
        info!("Stored image {} at {}", record.id, record.file_location);

        Ok(self.media.url(&record.file_location))
    }

    async fn record(&self, signature: &str) -> Result<Option<StoredImage>, StoreError> {
        let value = self
            .store
            .get(PersistSpace::Images, &signature.to_string())
            .await?;
        match value {
            None => Ok(None),
            Some(value) => Ok(Some(postcard::from_bytes::<StoredImage>(&value)?)),
        }
    }
}
