use crate::image_ops::profiles::{ImageProfile, Profile};
use crate::store::image_store::{ImageStore, StoreError, StoredImage};
use crate::store::media_storage::MediaStorage;
use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tokio::task::spawn_blocking;

/// Image records kept in process memory, files kept in media storage.
///
/// Records are lost on restart, so this is meant for development and tests.
pub struct MemoryImageStore {
    records: RwLock<HashMap<String, StoredImage>>,
    media: MediaStorage,
    last_id: AtomicU64,
    write_lock: Mutex<()>,
}

impl MemoryImageStore {
    pub fn new(media: MediaStorage) -> Self {
        MemoryImageStore {
            records: RwLock::new(HashMap::new()),
            media,
            last_id: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn lookup(&self, profile: &ImageProfile) -> Result<Option<String>, StoreError> {
        let signature = profile.signature()?;
        let records = self.records.read().await;
        Ok(records
            .get(&signature)
            .map(|record| self.media.url(&record.file_location)))
    }

    async fn store(&self, file_path: &Path, profile: &ImageProfile) -> Result<String, StoreError> {
        let signature = profile.signature()?;
        let name = profile.upload_file_name();

        // serializes stores, `records` itself is only write locked for the insert
        let _guard = self.write_lock.lock().await;

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
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            file_location,
            signature: signature.clone(),
        };
        info!("Stored image {} at {}", record.id, record.file_location);
        let url = self.media.url(&record.file_location);
        self.records.write().await.insert(signature, record);

        Ok(url)
    }

    async fn record(&self, signature: &str) -> Result<Option<StoredImage>, StoreError> {
        Ok(self.records.read().await.get(signature).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::color::ColorRgb;
    use crate::image_ops::profiles::{JpegPlainProfile, PngPlainProfile};
    use tempdir::TempDir;

    fn sample_profile() -> ImageProfile {
        PngPlainProfile::new(9, 10, ColorRgb::new(83, 183, 128), 189).into()
    }

    fn generated_file(temp_dir: &TempDir) -> std::path::PathBuf {
        let path = temp_dir.path().join("tmp.png");
        std::fs::write(&path, b"png bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let temp_dir = TempDir::new("memory_store").expect("Failed to create temporary directory");
        let store = MemoryImageStore::new(MediaStorage::new(temp_dir.path(), "media/"));
        let profile = sample_profile();

        assert_eq!(store.lookup(&profile).await.unwrap(), None);

        let url = store
            .store(&generated_file(&temp_dir), &profile)
            .await
            .unwrap();

        assert_eq!(
            url,
            "media/images/png_plain_width_9_height_10_color_r_83_g_183_b_128_alpha_189.png"
        );
        assert_eq!(store.lookup(&profile).await.unwrap(), Some(url));

        let never_stored = ImageProfile::from(JpegPlainProfile::default());
        assert_eq!(store.lookup(&never_stored).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_repeated_store_keeps_single_record() {
        let temp_dir = TempDir::new("memory_store").expect("Failed to create temporary directory");
        let store = MemoryImageStore::new(MediaStorage::new(temp_dir.path(), "/media/"));
        let profile = sample_profile();
        let file = generated_file(&temp_dir);

        let first = store.store(&file, &profile).await.unwrap();
        let second = store.store(&file, &profile).await.unwrap();

        assert_eq!(first, second);
        let record = store
            .record(&profile.signature().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.file_location, format!("images/{}", profile.upload_file_name()));
        assert_eq!(store.records.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_not_blocked_by_pending_store() {
        let temp_dir = TempDir::new("memory_store").expect("Failed to create temporary directory");
        let store = MemoryImageStore::new(MediaStorage::new(temp_dir.path(), "/media/"));
        let stored = sample_profile();
        store
            .store(&generated_file(&temp_dir), &stored)
            .await
            .unwrap();

        let _pending_store = store.write_lock.lock().await;
        let url = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.lookup(&stored),
        )
        .await
        .expect("lookup waited for the write lock")
        .unwrap();

        assert!(url.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_stores_keep_single_record() {
        let temp_dir = TempDir::new("memory_store").expect("Failed to create temporary directory");
        let store = MemoryImageStore::new(MediaStorage::new(temp_dir.path(), "/media/"));
        let profile = sample_profile();
        let file = generated_file(&temp_dir);

        let (first, second) = tokio::join!(store.store(&file, &profile), store.store(&file, &profile));

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(store.records.read().await.len(), 1);
        assert_eq!(store.last_id.load(Ordering::SeqCst), 1);
    }
}
