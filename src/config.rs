use crate::forms::router::ProfileRouter;
use crate::image_ops::generator::PlainImageGenerator;
use crate::processing::Processor;
use crate::routes::ratelimit::{RateLimit, RateLimiter};
use crate::store::image_store::{ImageStore, StoreError};
use crate::store::media_storage::MediaStorage;
use crate::store::memory_image_store::MemoryImageStore;
use crate::store::persistent_image_store::PersistentImageStore;
use crate::store::persistent_store::PersistentStore;
use envconfig::Envconfig;
use log::info;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use strum::EnumString;
use thiserror::Error;

#[derive(Clone, Copy, Debug, EnumString, strum::Display, Eq, PartialEq)]
pub enum StoreImplementation {
    InMemory,
    Persistent,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment: {0}")]
    Env(#[from] envconfig::Error),

    #[error("Failed to open image store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Envconfig)]
pub(crate) struct EnvConfig {
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,
    #[envconfig(from = "PORT", default = "8000")]
    pub port: u16,

    // ------------------
    // Image store
    #[envconfig(from = "STORE_IMPLEMENTATION", default = "Persistent")]
    pub store_implementation: StoreImplementation,
    /// Persistent db location (directory)
    #[envconfig(from = "PERSISTENT_STORAGE_DIR", default = ".impala")]
    pub persistent_storage_dir: String,
    /// Expected count of stored images, sizes the db cache
    #[envconfig(from = "STORE_CACHE_SIZE", default = "1024")]
    pub store_cache_size: NonZeroUsize,

    // ------------------
    // Media files
    #[envconfig(from = "MEDIA_ROOT", default = "media")]
    pub media_root: String,
    #[envconfig(from = "MEDIA_URL", default = "/media/")]
    pub media_url: String,
    /// Serve MEDIA_ROOT at MEDIA_URL, ignored when MEDIA_URL is not a path
    #[envconfig(from = "SERVE_MEDIA", default = "true")]
    pub serve_media: bool,

    // ------------------
    // Rate limiting of image requests
    #[envconfig(from = "RATELIMIT_ENABLE", default = "true")]
    pub ratelimit_enable: bool,
    #[envconfig(from = "RATELIMIT_PER_SECOND", default = "50")]
    pub ratelimit_per_second: u32,
    #[envconfig(from = "RATELIMIT_PER_MINUTE", default = "500")]
    pub ratelimit_per_minute: u32,
    /// Key clients by the `X-Real-Ip` header, disable when not behind a proxy setting it
    #[envconfig(from = "RATELIMIT_TRUST_REAL_IP", default = "true")]
    pub ratelimit_trust_real_ip: bool,
    /// Max count of tracked (client, window) counters
    #[envconfig(from = "RATELIMIT_CACHE_SIZE", default = "65536")]
    pub ratelimit_cache_size: NonZeroUsize,

    /// Enable OpenAPI and Swagger docs routes
    #[envconfig(from = "ENABLE_DOCS", default = "true")]
    pub enable_docs: bool,
}

/// Static serving of stored images
pub struct MediaServing {
    /// Route prefix, without trailing slash. Empty when served at the root
    pub route: String,
    pub root: PathBuf,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub processor: Processor,
    pub persistent_store: Option<Arc<PersistentStore>>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub media_serving: Option<MediaServing>,
    pub enable_docs: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_env_config(EnvConfig::init_from_env()?)
    }

    pub(crate) fn from_env_config(env_conf: EnvConfig) -> Result<Config, ConfigError> {
        let media = MediaStorage::new(PathBuf::from(&env_conf.media_root), env_conf.media_url);

        let persistent_store = match env_conf.store_implementation {
            StoreImplementation::Persistent => Some(Arc::new(PersistentStore::open(
                PathBuf::from(&env_conf.persistent_storage_dir),
                env_conf.store_cache_size,
            )?)),
            StoreImplementation::InMemory => None,
        };

        info!("Using {} image store", env_conf.store_implementation);
        let store: Arc<dyn ImageStore + Send + Sync> = match &persistent_store {
            Some(persistent_store) => Arc::new(PersistentImageStore::new(
                persistent_store.clone(),
                media.clone(),
            )),
            None => Arc::new(MemoryImageStore::new(media.clone())),
        };

        let processor = Processor::new(
            ProfileRouter::default(),
            Arc::new(PlainImageGenerator),
            store,
        );

        let rate_limiter = match env_conf.ratelimit_enable {
            true => Some(Arc::new(RateLimiter::new(
                RateLimit {
                    per_second: env_conf.ratelimit_per_second,
                    per_minute: env_conf.ratelimit_per_minute,
                    trust_real_ip: env_conf.ratelimit_trust_real_ip,
                },
                env_conf.ratelimit_cache_size.get(),
            ))),
            false => None,
        };

        let media_serving = match env_conf.serve_media && media.url_prefix().starts_with('/') {
            true => Some(MediaServing {
                route: media.url_prefix().trim_end_matches('/').to_string(),
                root: media.root().to_path_buf(),
            }),
            false => None,
        };

        Ok(Config {
            host: env_conf.host,
            port: env_conf.port,
            processor,
            persistent_store,
            rate_limiter,
            media_serving,
            enable_docs: env_conf.enable_docs,
        })
    }
}
