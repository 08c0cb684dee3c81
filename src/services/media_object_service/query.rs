use crate::entities::{media_objects, media_objects2media_tags, media_tags, prelude::*};
use crate::error::{MediaError, MediaResult};
use crate::services::access::Capability;
use crate::services::generic_type_filter::build_predicate;
use crate::services::mime_registry::GenericType;
use crate::services::tag_service::tag_string_to_words;
use crate::services::thumbnail_service::ThumbnailResult;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, TransactionTrait,
    Value,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::types::{
    CountObjectsOptions, MediaObjectChanges, NewMediaObject, OrderMacro, SelectObjectsOptions,
    StoredFile, Timeframe,
};
use super::MediaObjectService;

impl MediaObjectService {
    pub async fn add_object(&self, project: i32, object: NewMediaObject) -> MediaResult<i32> {
        self.require(Capability::Manage)?;
        let model = insert_object(&self.db, project, object).await?;
        Ok(model.id)
    }

    pub async fn update_object(
        &self,
        project: i32,
        id: i32,
        changes: MediaObjectChanges,
    ) -> MediaResult<u64> {
        self.require(Capability::Manage)?;
        update_object(&self.db, project, id, changes).await
    }

    /// Deletes the row and its tag links. Stored files are left alone; see
    /// [`MediaObjectService::delete`] for the full removal. `Ok(0)` when the
    /// object does not belong to `project`.
    pub async fn delete_object(&self, project: i32, id: i32) -> MediaResult<u64> {
        self.require(Capability::Manage)?;

        let txn = self.db.begin().await?;
        if find_object(&txn, project, id).await?.is_none() {
            txn.rollback().await?;
            return Ok(0);
        }
        crate::services::tag_service::update_tags(&txn, project, id, &[]).await?;
        let res = MediaObjects::delete_many()
            .filter(media_objects::Column::Id.eq(id))
            .filter(media_objects::Column::Project.eq(project))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(res.rows_affected)
    }

    pub async fn select_object(
        &self,
        project: i32,
        id: i32,
    ) -> MediaResult<Option<media_objects::Model>> {
        self.require(Capability::Use)?;
        find_object(&self.db, project, id).await
    }

    pub async fn select_objects(
        &self,
        project: i32,
        options: SelectObjectsOptions,
    ) -> MediaResult<Vec<media_objects::Model>> {
        self.require(Capability::Use)?;

        let mut query = self.filtered(
            project,
            &options.types,
            options.tags.as_deref(),
            options.timeframe,
        );
        if let Some(id) = options.id {
            query = query.filter(media_objects::Column::Id.eq(id));
        }

        query = match options.order {
            Some((order_macro, order)) => query.order_by(order_column(order_macro), order),
            None => query.order_by(media_objects::Column::Id, Order::Asc),
        };

        // start only counts together with a limit
        query = match (options.start, options.limit) {
            (Some(start), Some(limit)) if start > 0 => query.offset(start).limit(limit),
            (_, Some(limit)) => query.limit(limit),
            _ => query,
        };

        Ok(query.all(&self.db).await?)
    }

    pub async fn count_objects(
        &self,
        project: i32,
        options: CountObjectsOptions,
    ) -> MediaResult<u64> {
        self.require(Capability::Use)?;
        let query = self.filtered(
            project,
            &options.types,
            options.tags.as_deref(),
            options.timeframe,
        );
        Ok(query.count(&self.db).await?)
    }

    fn filtered(
        &self,
        project: i32,
        types: &BTreeSet<GenericType>,
        tags: Option<&str>,
        timeframe: Option<Timeframe>,
    ) -> Select<MediaObjects> {
        let mut query = MediaObjects::find().filter(media_objects::Column::Project.eq(project));

        if let Some(frame) = timeframe {
            query = query.filter(media_objects::Column::DateAdded.gte(Utc::now() - frame.duration()));
        }

        let words = tags.map(tag_string_to_words).unwrap_or_default();
        if !words.is_empty() {
            let matches_any_word = words.iter().fold(Condition::any(), |cond, word| {
                cond.add(
                    Expr::col((MediaTags, media_tags::Column::Word))
                        .like(LikeExpr::new(format!("%{}%", escape_like(word))).escape('\\')),
                )
            });
            let tagged = MediaObjectTags::find()
                .select_only()
                .column(media_objects2media_tags::Column::Object)
                .inner_join(MediaTags)
                .filter(media_tags::Column::Project.eq(project))
                .filter(matches_any_word)
                .into_query();
            query = query.filter(media_objects::Column::Id.in_subquery(tagged));
        }

        if let Some(predicate) =
            build_predicate(&self.registry, media_objects::Column::FileMimeType, types)
        {
            query = query.filter(predicate);
        }

        query
    }

    pub fn path_to_object(&self, name: &str) -> MediaResult<PathBuf> {
        self.require(Capability::Use)?;
        self.store.path_to_object(name)
    }

    pub fn path_to_thumbnail(&self, name: &str) -> MediaResult<PathBuf> {
        self.require(Capability::Use)?;
        self.store.path_to_thumbnail(name)
    }

    pub async fn path_to_object_using_id(&self, project: i32, id: i32) -> MediaResult<PathBuf> {
        self.require(Capability::Use)?;
        let object = require_object(&self.db, project, id).await?;
        let name = object
            .file_name_on_disk
            .ok_or_else(|| MediaError::NotFound(format!("Object {} has no stored file", id)))?;
        self.store.path_to_object(&name)
    }

    pub fn www_path_to_object(&self, name: &str) -> MediaResult<String> {
        self.require(Capability::Use)?;
        self.store.www_path_to_object(name)
    }

    /// Empty string when the object carries no file.
    pub async fn www_path_to_object_using_id(&self, project: i32, id: i32) -> MediaResult<String> {
        self.require(Capability::Use)?;
        let object = require_object(&self.db, project, id).await?;
        match object.file_name_on_disk.as_deref() {
            Some(name) if !name.is_empty() => self.store.www_path_to_object(name),
            _ => Ok(String::new()),
        }
    }

    /// True when `name` is free in the store, or already belongs to object `id`.
    pub async fn test_unique_filename(
        &self,
        project: i32,
        name: &str,
        id: Option<i32>,
    ) -> MediaResult<bool> {
        self.require(Capability::Use)?;
        if name.is_empty() {
            return Err(MediaError::invalid("File name cannot be empty"));
        }

        let target = self.store.path_to_object(name)?;
        if !self.store.exists(&target).await {
            return Ok(true);
        }

        let Some(id) = id else {
            return Ok(false);
        };
        let owner_path = match require_object(&self.db, project, id).await?.file_name_on_disk {
            Some(current) => Some(self.store.path_to_object(&current)?),
            None => None,
        };
        Ok(owner_path.as_deref() == Some(target.as_path()))
    }
}

/// Escapes `LIKE` wildcards so a word only matches literally.
fn escape_like(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len());
    for c in word.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn order_column(order_macro: OrderMacro) -> media_objects::Column {
    match order_macro {
        OrderMacro::Name => media_objects::Column::FileName,
        OrderMacro::DateAdded => media_objects::Column::DateAdded,
        OrderMacro::DateModified => media_objects::Column::DateModified,
    }
}

pub(crate) async fn find_object<C>(
    db: &C,
    project: i32,
    id: i32,
) -> MediaResult<Option<media_objects::Model>>
where
    C: ConnectionTrait,
{
    Ok(MediaObjects::find_by_id(id)
        .filter(media_objects::Column::Project.eq(project))
        .one(db)
        .await?)
}

pub(crate) async fn require_object<C>(
    db: &C,
    project: i32,
    id: i32,
) -> MediaResult<media_objects::Model>
where
    C: ConnectionTrait,
{
    find_object(db, project, id)
        .await?
        .ok_or_else(|| MediaError::NotFound(format!("Media object {} not found", id)))
}

pub(crate) async fn insert_object<C>(
    db: &C,
    project: i32,
    object: NewMediaObject,
) -> MediaResult<media_objects::Model>
where
    C: ConnectionTrait,
{
    let file = object.file.as_ref();
    let preview = object.preview.as_ref();

    let model = media_objects::ActiveModel {
        project: Set(project),
        description: Set(object.description),
        tags: Set(object.tags),
        file_name: Set(file.map(|f| f.name.clone())),
        file_name_on_disk: Set(file.map(|f| f.name_on_disk.clone())),
        file_mime_type: Set(file.map(|f| f.mime_type.clone())),
        file_width: Set(file.and_then(|f| f.width).and_then(to_i32)),
        file_height: Set(file.and_then(|f| f.height).and_then(to_i32)),
        file_size: Set(file.and_then(|f| i64::try_from(f.size).ok())),
        preview_name_on_disk: Set(preview.map(|p| p.name.clone())),
        preview_mime_type: Set(preview.map(|p| p.mime_type.clone())),
        preview_width: Set(preview.and_then(|p| to_i32(p.width))),
        preview_height: Set(preview.and_then(|p| to_i32(p.height))),
        preview_size: Set(preview.and_then(|p| i64::try_from(p.size_bytes).ok())),
        date_added: Set(Utc::now()),
        date_modified: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Applies `changes` and stamps `date_modified`.
pub(crate) async fn update_object<C>(
    db: &C,
    project: i32,
    id: i32,
    changes: MediaObjectChanges,
) -> MediaResult<u64>
where
    C: ConnectionTrait,
{
    let mut columns: Vec<(media_objects::Column, Value)> = Vec::new();

    if let Some(description) = changes.description {
        columns.push((media_objects::Column::Description, description.into()));
    }
    if let Some(tags) = changes.tags {
        columns.push((media_objects::Column::Tags, tags.into()));
    }
    if let Some(file) = changes.file {
        if let Some(f) = &file {
            columns.push((media_objects::Column::FileName, Some(f.name.clone()).into()));
        }
        columns.extend(file_columns(file.as_ref()));
    }
    if let Some(preview) = changes.preview {
        columns.extend(preview_columns(preview.as_ref()));
    }
    columns.push((
        media_objects::Column::DateModified,
        Some(Utc::now()).into(),
    ));

    set_columns(db, project, id, columns).await
}

pub(crate) async fn set_columns<C>(
    db: &C,
    project: i32,
    id: i32,
    columns: Vec<(media_objects::Column, Value)>,
) -> MediaResult<u64>
where
    C: ConnectionTrait,
{
    let mut update = MediaObjects::update_many()
        .filter(media_objects::Column::Id.eq(id))
        .filter(media_objects::Column::Project.eq(project));
    for (column, value) in columns {
        update = update.col_expr(column, Expr::value(value));
    }
    Ok(update.exec(db).await?.rows_affected)
}

/// The five stored-file columns. `file_name` stays as the display name.
pub(crate) fn file_columns(file: Option<&StoredFile>) -> Vec<(media_objects::Column, Value)> {
    vec![
        (
            media_objects::Column::FileNameOnDisk,
            file.map(|f| f.name_on_disk.clone()).into(),
        ),
        (
            media_objects::Column::FileMimeType,
            file.map(|f| f.mime_type.clone()).into(),
        ),
        (
            media_objects::Column::FileWidth,
            file.and_then(|f| f.width).and_then(to_i32).into(),
        ),
        (
            media_objects::Column::FileHeight,
            file.and_then(|f| f.height).and_then(to_i32).into(),
        ),
        (
            media_objects::Column::FileSize,
            file.and_then(|f| i64::try_from(f.size).ok()).into(),
        ),
    ]
}

pub(crate) fn preview_columns(
    preview: Option<&ThumbnailResult>,
) -> Vec<(media_objects::Column, Value)> {
    vec![
        (
            media_objects::Column::PreviewNameOnDisk,
            preview.map(|p| p.name.clone()).into(),
        ),
        (
            media_objects::Column::PreviewMimeType,
            preview.map(|p| p.mime_type.clone()).into(),
        ),
        (
            media_objects::Column::PreviewWidth,
            preview.and_then(|p| to_i32(p.width)).into(),
        ),
        (
            media_objects::Column::PreviewHeight,
            preview.and_then(|p| to_i32(p.height)).into(),
        ),
        (
            media_objects::Column::PreviewSize,
            preview.and_then(|p| i64::try_from(p.size_bytes).ok()).into(),
        ),
    ]
}

fn to_i32(value: u32) -> Option<i32> {
    i32::try_from(value).ok()
}
