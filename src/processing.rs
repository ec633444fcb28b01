use crate::forms::profile_forms::QueryParams;
use crate::forms::query_error::QueryError;
use crate::forms::router::ProfileRouter;
use crate::image_ops::generator::{GenerateError, ImageGenerator};
use crate::image_ops::profiles::ImageProfile;
use crate::store::image_store::{ImageStore, StoreError};
use log::{debug, info};
use std::sync::Arc;
use tempdir::TempDir;
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use tracing::instrument;

const TEMP_DIR_PREFIX: &str = "impala";

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("Failed to generate image: {0}")]
    Generate(#[from] GenerateError),

    #[error("Failed to store image: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to create temporary directory: {0}")]
    TempDir(#[from] std::io::Error),

    #[error("Generation task failed: {0}")]
    Task(#[from] JoinError),
}

/// Where the requested image can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    /// Image was stored by an earlier request
    Cached(String),
    /// Image was generated and stored by this request
    Generated(String),
}

impl ImageLocation {
    pub fn url(&self) -> &str {
        match self {
            ImageLocation::Cached(url) | ImageLocation::Generated(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            ImageLocation::Cached(url) | ImageLocation::Generated(url) => url,
        }
    }
}

pub struct Processor {
    router: ProfileRouter,
    generator: Arc<dyn ImageGenerator + Send + Sync>,
    store: Arc<dyn ImageStore + Send + Sync>,
}

impl Processor {
    pub fn new(
        router: ProfileRouter,
        generator: Arc<dyn ImageGenerator + Send + Sync>,
        store: Arc<dyn ImageStore + Send + Sync>,
    ) -> Self {
        Processor {
            router,
            generator,
            store,
        }
    }

    pub fn router(&self) -> &ProfileRouter {
        &self.router
    }

    /// Resolve query parameters into the url of a stored image, generating
    /// and storing it on first request
    #[instrument(skip_all)]
    pub async fn get(&self, params: &QueryParams) -> Result<ImageLocation, ProcessingError> {
        let profile = self.router.create_profile(params)?;

        if let Some(url) = self.store.lookup(&profile).await? {
            debug!("Found stored image at {}", url);
            return Ok(ImageLocation::Cached(url));
        }

        let url = self.generate_and_store(profile).await?;
        Ok(ImageLocation::Generated(url))
    }

    async fn generate_and_store(&self, profile: ImageProfile) -> Result<String, ProcessingError> {
        // removed on drop, whatever the outcome
        let temp_dir = TempDir::new(TEMP_DIR_PREFIX)?;

        let generator = self.generator.clone();
        let output_dir = temp_dir.path().to_path_buf();
        let to_render = profile.clone();
        let file_path =
            spawn_blocking(move || generator.generate(&to_render, &output_dir)).await??;
        debug!("Generated image at {}", file_path.display());

        let url = self.store.store(&file_path, &profile).await?;
        info!("Generated new image {}", url);

        Ok(url)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::image_ops::color::ColorRgb;
    use crate::image_ops::generator::PlainImageGenerator;
    use crate::image_ops::profiles::{JpegPlainProfile, Profile};
    use crate::store::image_store::StoredImage;
    use crate::store::media_storage::MediaStorage;
    use crate::store::memory_image_store::MemoryImageStore;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: AtomicUsize,
        output_dirs: std::sync::Mutex<Vec<PathBuf>>,
    }

    impl CountingGenerator {
        fn new() -> Self {
            CountingGenerator {
                calls: AtomicUsize::new(0),
                output_dirs: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageGenerator for CountingGenerator {
        fn generate(
            &self,
            profile: &ImageProfile,
            output_dir: &Path,
        ) -> Result<PathBuf, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output_dirs.lock().unwrap().push(output_dir.to_path_buf());
            PlainImageGenerator.generate(profile, output_dir)
        }
    }

    pub(crate) struct FailingStore;

    #[async_trait]
    impl ImageStore for FailingStore {
        async fn lookup(&self, _profile: &ImageProfile) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn store(
            &self,
            _file_path: &Path,
            _profile: &ImageProfile,
        ) -> Result<String, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk is full")))
        }

        async fn record(&self, _signature: &str) -> Result<Option<StoredImage>, StoreError> {
            Ok(None)
        }
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn processor(
        generator: Arc<CountingGenerator>,
        store: Arc<dyn ImageStore + Send + Sync>,
    ) -> Processor {
        Processor::new(ProfileRouter::default(), generator, store)
    }

    #[tokio::test]
    async fn test_generates_once_then_serves_stored() {
        let media_dir = TempDir::new("processing").expect("Failed to create temporary directory");
        let generator = Arc::new(CountingGenerator::new());
        let store = Arc::new(MemoryImageStore::new(MediaStorage::new(
            media_dir.path(),
            "/media/",
        )));
        let processor = processor(generator.clone(), store);
        let query = params(&[
            ("profile_type", "jpeg_plain"),
            ("width", "512"),
            ("height", "1024"),
            ("color_rgb", "BEF0CB"),
            ("quality", "65"),
        ]);
        let expected = JpegPlainProfile::new(512, 1024, ColorRgb::new(190, 240, 203), 65);

        let first = processor.get(&query).await.unwrap();
        let second = processor.get(&query).await.unwrap();

        assert_eq!(
            first,
            ImageLocation::Generated(format!("/media/images/{}", expected.upload_file_name()))
        );
        assert_eq!(second, ImageLocation::Cached(first.url().to_string()));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert!(
            media_dir
                .path()
                .join("images")
                .join(expected.upload_file_name())
                .is_file()
        );
        for output_dir in generator.output_dirs.lock().unwrap().iter() {
            assert!(!output_dir.exists());
        }
    }

    #[tokio::test]
    async fn test_invalid_query_skips_generation() {
        let media_dir = TempDir::new("processing").expect("Failed to create temporary directory");
        let generator = Arc::new(CountingGenerator::new());
        let store = Arc::new(MemoryImageStore::new(MediaStorage::new(
            media_dir.path(),
            "/media/",
        )));
        let processor = processor(generator.clone(), store);

        let result = processor
            .get(&params(&[("profile_type", "png_plain"), ("width", "0")]))
            .await;

        let Err(ProcessingError::Query(err)) = result else {
            panic!("expected query error");
        };
        assert_eq!(
            err.messages().get("width"),
            Some(&vec![
                "Ensure this value is greater than or equal to 1.".to_string()
            ])
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_cleans_up() {
        let generator = Arc::new(CountingGenerator::new());
        let processor = processor(generator.clone(), Arc::new(FailingStore));

        let result = processor
            .get(&params(&[
                ("profile_type", "png_plain"),
                ("width", "4"),
                ("height", "4"),
                ("color_rgb", "fff"),
                ("alpha", "10"),
            ]))
            .await;

        assert!(matches!(result, Err(ProcessingError::Store(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        for output_dir in generator.output_dirs.lock().unwrap().iter() {
            assert!(!output_dir.exists());
        }
    }
}
