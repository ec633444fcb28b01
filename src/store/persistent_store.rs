use crate::store::image_store::StoreError;
use crate::utils::background::BackgroundService;
use async_trait::async_trait;
use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode, Slice};
use log::{debug, warn};
use postcard::to_stdvec;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumString};
use tokio::sync::watch::Receiver;
use tokio::task::spawn_blocking;

#[derive(Debug, EnumString, Display)]
pub enum PersistSpace {
    Images,
    Meta,
}

impl PersistSpace {
    fn keyspace_name(&self) -> &'static str {
        match self {
            PersistSpace::Images => PERSISTENT_IMAGES_KEYSPACE,
            PersistSpace::Meta => PERSISTENT_META_KEYSPACE,
        }
    }
}

const PERSISTENT_IMAGES_KEYSPACE: &str = "images";
const PERSISTENT_META_KEYSPACE: &str = "meta";

/// Expecting a stored image record to be about 512 bytes
const IMAGE_RECORD_SIZE: u64 = 512;

pub struct PersistentStore {
    db: fjall::Database,
    images_keyspace: Keyspace,
    meta_keyspace: Keyspace,
}

impl PersistentStore {
    pub fn open(db_path: PathBuf, records_capacity: NonZeroUsize) -> Result<Self, StoreError> {
        let db_cache_size = IMAGE_RECORD_SIZE * records_capacity.get() as u64;

        let db = fjall::Database::builder(db_path)
            .cache_size(db_cache_size)
            .open()?;

        let images_keyspace = db.keyspace(
            PersistSpace::Images.keyspace_name(),
            KeyspaceCreateOptions::default,
        )?;
        let meta_keyspace =
            db.keyspace(PersistSpace::Meta.keyspace_name(), KeyspaceCreateOptions::default)?;

        Ok(PersistentStore {
            db,
            images_keyspace,
            meta_keyspace,
        })
    }

    fn keyspace(&self, space: PersistSpace) -> Keyspace {
        match space {
            PersistSpace::Images => self.images_keyspace.clone(),
            PersistSpace::Meta => self.meta_keyspace.clone(),
        }
    }

    pub async fn get<K>(&self, space: PersistSpace, key: &K) -> Result<Option<Slice>, StoreError>
    where
        K: Serialize + Send + Sync,
    {
        let keyspace = self.keyspace(space);
        let key = to_stdvec(key)?;

        Ok(spawn_blocking(move || keyspace.get(key)).await??)
    }

    pub async fn set<K>(&self, space: PersistSpace, key: &K, value: &[u8]) -> Result<(), StoreError>
    where
        K: Serialize + Send + Sync,
    {
        let keyspace = self.keyspace(space);
        let key = to_stdvec(key)?;
        let value = value.to_vec();

        Ok(spawn_blocking(move || keyspace.insert(key, value)).await??)
    }

    /// Flush journal to disk
    pub fn persist(&self) -> Result<(), StoreError> {
        Ok(self.db.persist(PersistMode::SyncAll)?)
    }
}

/// Periodically flushes the persistent store
pub struct StorageBackgroundAdapter {
    store: Option<Arc<PersistentStore>>,
    cancel_chan: (
        tokio::sync::watch::Sender<bool>,
        tokio::sync::watch::Receiver<bool>,
    ),
}

impl StorageBackgroundAdapter {
    pub fn new(store: Option<Arc<PersistentStore>>) -> Self {
        StorageBackgroundAdapter {
            store,
            cancel_chan: tokio::sync::watch::channel(false),
        }
    }

    fn flush(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        debug!("Flushing image records to disk");
        if let Err(err) = store.persist() {
            warn!("Failed to flush data to disk, got error: {}", err)
        }
    }
}

#[async_trait]
impl BackgroundService for StorageBackgroundAdapter {
    fn background_period(&self) -> Duration {
        Duration::new(60, 0)
    }

    async fn background(&mut self) {
        self.flush();
    }

    fn cancel_token(&self) -> Receiver<bool> {
        self.cancel_chan.1.clone()
    }

    async fn stop(&mut self) {
        let _ = self.cancel_chan.0.send(true);
        self.flush();
    }
}
