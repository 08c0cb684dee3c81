use crate::config::MediaConfig;
use crate::error::MediaResult;
use crate::services::access::{AccessControl, Capability, MEDIA_MODULE, OBJECT_RESOURCE};
use crate::services::mime_registry::MimeTypeRegistry;
use crate::services::object_store::ObjectStore;
use crate::services::thumbnail_service::ThumbnailService;
use crate::utils::keyed_mutex::KeyedMutex;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod lifecycle;
pub mod query;
pub mod types;
pub mod upload;

pub use types::{
    CountObjectsOptions, EditOutcome, MediaObjectChanges, NewMediaObject, OrderMacro,
    SelectObjectsOptions, StoredFile, Timeframe, UploadedFile,
};

/// Media objects of all projects: rows, stored files and thumbnails.
pub struct MediaObjectService {
    db: DatabaseConnection,
    store: ObjectStore,
    thumbnails: ThumbnailService,
    registry: MimeTypeRegistry,
    access: Arc<dyn AccessControl>,
    config: MediaConfig,
    locks: KeyedMutex,
}

impl MediaObjectService {
    pub fn new(
        db: DatabaseConnection,
        config: MediaConfig,
        access: Arc<dyn AccessControl>,
    ) -> Self {
        let store = ObjectStore::new(&config);
        Self {
            db,
            thumbnails: ThumbnailService::new(store.clone()),
            store,
            registry: MimeTypeRegistry::new(),
            access,
            config,
            locks: KeyedMutex::new(),
        }
    }

    pub fn registry(&self) -> &MimeTypeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn locks(&self) -> &KeyedMutex {
        &self.locks
    }

    fn require(&self, action: Capability) -> MediaResult<()> {
        self.access.require(MEDIA_MODULE, OBJECT_RESOURCE, action)
    }

    pub async fn store_is_ready(&self) -> MediaResult<bool> {
        self.require(Capability::Use)?;
        Ok(self.store.is_ready().await)
    }
}

fn object_lock_key(id: i32) -> String {
    format!("object:{}", id)
}

fn file_lock_key(name: &str) -> String {
    format!("file:{}", name)
}
