use crate::entities::media_objects;
use crate::error::{MediaError, MediaResult};
use crate::services::access::Capability;
use crate::services::tag_service::{tag_string_to_words, update_tags};
use crate::services::thumbnail_service::ThumbnailResult;
use crate::utils::validation::{sanitize_filename, validate_file_size, validate_mime_type};
use sea_orm::TransactionTrait;
use tracing::{info, warn};

use super::query::{insert_object, require_object, update_object};
use super::types::{EditOutcome, MediaObjectChanges, NewMediaObject, StoredFile, UploadedFile};
use super::{MediaObjectService, file_lock_key, object_lock_key};

const OCTET_STREAM: &str = "application/octet-stream";

/// Validated facts about an upload, gathered before anything touches the store
struct PreparedUpload {
    name: String,
    mime_type: String,
}

impl MediaObjectService {
    /// Stores a new upload and creates its media object.
    pub async fn upload(
        &self,
        project: i32,
        file: UploadedFile,
        description: Option<String>,
        tags: Option<String>,
    ) -> MediaResult<media_objects::Model> {
        self.require(Capability::Manage)?;
        let prepared = self.prepare(&file).await?;
        self.ensure_store_ready().await?;

        let _guard = self.locks.lock(&file_lock_key(&prepared.name)).await;
        if !self
            .test_unique_filename(project, &prepared.name, None)
            .await?
        {
            return Err(MediaError::invalid(format!(
                "A file named '{}' already exists",
                prepared.name
            )));
        }

        info!(
            "📥 Upload accepted: '{}' ({}, {} bytes)",
            prepared.name, prepared.mime_type, file.size
        );

        let name = self
            .store
            .move_into_store(&prepared.name, &file.temp_path)
            .await?;

        let (stored, preview) = match self.describe_stored(&name, &prepared, file.size).await {
            Ok(described) => described,
            Err(e) => {
                warn!("Upload of '{}' failed, removing stored file: {}", name, e);
                self.discard_stored(&name, None).await;
                return Err(e);
            }
        };
        let preview_name = preview.as_ref().map(|p| p.name.clone());

        let result = async {
            let words = tags.as_deref().map(tag_string_to_words).unwrap_or_default();

            let txn = self.db.begin().await?;
            let model = insert_object(
                &txn,
                project,
                NewMediaObject {
                    description,
                    tags,
                    file: Some(stored),
                    preview,
                },
            )
            .await?;
            update_tags(&txn, project, model.id, &words).await?;
            txn.commit().await?;
            Ok::<_, MediaError>(model)
        }
        .await;

        match result {
            Ok(model) => {
                info!("✅ Media object {} created for '{}'", model.id, name);
                Ok(model)
            }
            Err(e) => {
                warn!("Upload of '{}' failed, removing stored files: {}", name, e);
                self.discard_stored(&name, preview_name.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Updates metadata and tags, then swaps in a replacement file if one is given.
    pub async fn edit(
        &self,
        project: i32,
        id: i32,
        description: Option<String>,
        tags: Option<String>,
        file: Option<UploadedFile>,
    ) -> MediaResult<EditOutcome> {
        self.require(Capability::Manage)?;
        let prepared = match &file {
            Some(file) => Some(self.prepare(file).await?),
            None => None,
        };

        let _guard = self.locks.lock(&object_lock_key(id)).await;
        require_object(&self.db, project, id).await?;

        let words = tags.as_deref().map(tag_string_to_words).unwrap_or_default();
        let txn = self.db.begin().await?;
        update_object(
            &txn,
            project,
            id,
            MediaObjectChanges {
                description: Some(description),
                tags: Some(tags),
                ..Default::default()
            },
        )
        .await?;
        update_tags(&txn, project, id, &words).await?;
        txn.commit().await?;

        let (Some(file), Some(prepared)) = (file, prepared) else {
            return Ok(EditOutcome::Updated);
        };

        self.ensure_store_ready().await?;
        let _file_guard = self.locks.lock(&file_lock_key(&prepared.name)).await;
        if !self
            .test_unique_filename(project, &prepared.name, Some(id))
            .await?
        {
            info!(
                "Replacement '{}' for media object {} collides with another file",
                prepared.name, id
            );
            return Ok(EditOutcome::FileNameTaken);
        }

        self.remove_thumbnail_locked(project, id).await?;
        self.remove_object_file_locked(project, id).await?;

        let name = self
            .store
            .move_into_store(&prepared.name, &file.temp_path)
            .await?;

        let (stored, preview) = match self.describe_stored(&name, &prepared, file.size).await {
            Ok(described) => described,
            Err(e) => {
                warn!("Replacing file of media object {} failed: {}", id, e);
                self.discard_stored(&name, None).await;
                return Err(e);
            }
        };
        let preview_name = preview.as_ref().map(|p| p.name.clone());

        let result = async {
            let txn = self.db.begin().await?;
            update_object(
                &txn,
                project,
                id,
                MediaObjectChanges {
                    file: Some(Some(stored)),
                    preview: Some(preview),
                    ..Default::default()
                },
            )
            .await?;
            txn.commit().await?;
            Ok::<_, MediaError>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("🔁 Replaced file of media object {} with '{}'", id, name);
                Ok(EditOutcome::Updated)
            }
            Err(e) => {
                warn!("Replacing file of media object {} failed: {}", id, e);
                self.discard_stored(&name, preview_name.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn prepare(&self, file: &UploadedFile) -> MediaResult<PreparedUpload> {
        let size = usize::try_from(file.size).unwrap_or(usize::MAX);
        validate_file_size(size, self.config.max_file_size)?;
        let name = sanitize_filename(&file.original_name)?;
        let mime_type = self.resolve_content_type(file).await?;
        Ok(PreparedUpload { name, mime_type })
    }

    /// Keeps a specific advertised type; sniffs the header when the client
    /// sent nothing useful.
    async fn resolve_content_type(&self, file: &UploadedFile) -> MediaResult<String> {
        let advertised = match file.content_type.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => {
                let parsed: mime::Mime = value.parse().map_err(|_| {
                    MediaError::invalid(format!("Invalid content type '{}'", value))
                })?;
                Some(parsed.essence_str().to_ascii_lowercase())
            }
            _ => None,
        };

        if let Some(mime_type) = advertised.filter(|m| m != OCTET_STREAM) {
            validate_mime_type(&mime_type)?;
            return Ok(mime_type);
        }

        let path = file.path();
        let sniffed = tokio::task::spawn_blocking(move || infer::get_from_path(path))
            .await
            .ok()
            .and_then(|r| r.ok())
            .flatten()
            .map(|kind| kind.mime_type().to_string());

        Ok(sniffed.unwrap_or_else(|| OCTET_STREAM.to_string()))
    }

    /// Dimensions and thumbnail of a freshly stored file. The thumbnail is
    /// written last, so an error never leaves one behind.
    async fn describe_stored(
        &self,
        name: &str,
        prepared: &PreparedUpload,
        size: u64,
    ) -> MediaResult<(StoredFile, Option<ThumbnailResult>)> {
        let dimensions = self.thumbnails.image_dimensions(name).await?;
        let preview = match self
            .thumbnails
            .generate(
                name,
                name,
                self.config.thumbnail_width,
                self.config.thumbnail_height,
                self.config.thumbnail_fill_up,
                self.config.thumbnail_fill_color.as_deref(),
            )
            .await
        {
            Ok(preview) => preview,
            Err(MediaError::Image(e)) => {
                warn!("No thumbnail for '{}': {}", name, e);
                None
            }
            Err(e) => return Err(e),
        };

        let stored = StoredFile {
            name: prepared.name.clone(),
            name_on_disk: name.to_string(),
            mime_type: prepared.mime_type.clone(),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            size,
        };
        Ok((stored, preview))
    }

    /// Removes a stored file and the thumbnail generated for it, if any.
    async fn discard_stored(&self, name: &str, preview: Option<&str>) {
        self.store.discard(name).await;
        if let Some(preview) = preview {
            self.store.discard(preview).await;
        }
    }
}
