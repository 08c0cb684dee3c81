use crate::entities::media_objects;
use crate::error::{MediaError, MediaResult};
use crate::services::access::Capability;
use sea_orm::Value;
use std::path::Path;
use tracing::{info, warn};

use super::query::{file_columns, find_object, preview_columns, require_object, set_columns};
use super::{MediaObjectService, object_lock_key};

impl MediaObjectService {
    /// Deletes the stored file of an object and clears its five file columns.
    /// `Ok(false)` when there is nothing to remove or the file cannot be moved.
    pub async fn remove_object_file(&self, project: i32, id: i32) -> MediaResult<bool> {
        self.require(Capability::Manage)?;
        self.ensure_store_ready().await?;

        let _guard = self.locks.lock(&object_lock_key(id)).await;
        self.remove_object_file_locked(project, id).await
    }

    /// Deletes the thumbnail of an object and clears its five preview columns.
    pub async fn remove_thumbnail(&self, project: i32, id: i32) -> MediaResult<bool> {
        self.require(Capability::Manage)?;
        self.ensure_store_ready().await?;

        let _guard = self.locks.lock(&object_lock_key(id)).await;
        self.remove_thumbnail_locked(project, id).await
    }

    /// Removes thumbnail, stored file, tag links and the row itself.
    pub async fn delete(&self, project: i32, id: i32) -> MediaResult<()> {
        self.require(Capability::Manage)?;
        self.ensure_store_ready().await?;

        let _guard = self.locks.lock(&object_lock_key(id)).await;
        require_object(&self.db, project, id).await?;

        self.remove_thumbnail_locked(project, id).await?;
        self.remove_object_file_locked(project, id).await?;
        self.delete_object(project, id).await?;

        info!("🗑️  Media object {} deleted (project {})", id, project);
        Ok(())
    }

    pub(super) async fn ensure_store_ready(&self) -> MediaResult<()> {
        if self.store.is_ready().await {
            Ok(())
        } else {
            Err(MediaError::StoreNotReady)
        }
    }

    pub(super) async fn remove_object_file_locked(&self, project: i32, id: i32) -> MediaResult<bool> {
        let Some(object) = find_object(&self.db, project, id).await? else {
            return Ok(false);
        };
        let Some(name) = object.file_name_on_disk.filter(|n| !n.is_empty()) else {
            return Ok(false);
        };

        let path = self.store.path_to_object(&name)?;
        if !self.store.exists(&path).await {
            return Ok(false);
        }

        let removed = self
            .clear_with_tombstone(project, id, &path, file_columns(None))
            .await?;
        if removed {
            info!("Removed file '{}' of media object {}", name, id);
        }
        Ok(removed)
    }

    pub(super) async fn remove_thumbnail_locked(&self, project: i32, id: i32) -> MediaResult<bool> {
        let Some(object) = find_object(&self.db, project, id).await? else {
            return Ok(false);
        };
        let Some(name) = object.preview_name_on_disk.filter(|n| !n.is_empty()) else {
            return Ok(false);
        };

        let path = self.store.path_to_thumbnail(&name)?;
        if !self.store.exists(&path).await {
            return Ok(false);
        }

        let removed = self
            .clear_with_tombstone(project, id, &path, preview_columns(None))
            .await?;
        if removed {
            info!("Removed thumbnail '{}' of media object {}", name, id);
        }
        Ok(removed)
    }

    /// Moves `path` to a tombstone, clears `columns`, then unlinks the
    /// tombstone. A failed update puts the file back before returning.
    async fn clear_with_tombstone(
        &self,
        project: i32,
        id: i32,
        path: &Path,
        columns: Vec<(media_objects::Column, Value)>,
    ) -> MediaResult<bool> {
        let tombstone = match self.store.bury(path).await {
            Ok(tombstone) => tombstone,
            Err(e) => {
                warn!("Could not remove {:?}: {}", path, e);
                return Ok(false);
            }
        };

        match set_columns(&self.db, project, id, columns).await {
            Ok(_) => {
                self.store.purge(&tombstone).await;
                Ok(true)
            }
            Err(e) => {
                warn!("Rolling back removal of {:?}: {}", path, e);
                self.store.restore(&tombstone, path).await;
                Err(e)
            }
        }
    }
}
