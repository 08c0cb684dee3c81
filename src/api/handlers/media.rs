use crate::AppState;
use crate::api::middleware::project::ProjectScope;
use crate::entities::media_objects;
use crate::error::{MediaError, MediaResult};
use crate::services::media_object_service::types::parse_order_macro;
use crate::services::media_object_service::{
    CountObjectsOptions, EditOutcome, MediaObjectService, SelectObjectsOptions, Timeframe,
    UploadedFile,
};
use crate::services::mime_registry::{GenericType, parse_generic_types};
use crate::utils::validation::validate_file_size;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State, multipart::Field},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaObjectResponse {
    pub id: i32,
    pub project: i32,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub file_name: Option<String>,
    pub file_name_on_disk: Option<String>,
    pub file_mime_type: Option<String>,
    pub file_width: Option<i32>,
    pub file_height: Option<i32>,
    pub file_size: Option<i64>,
    pub preview_name_on_disk: Option<String>,
    pub preview_mime_type: Option<String>,
    pub preview_width: Option<i32>,
    pub preview_height: Option<i32>,
    pub preview_size: Option<i64>,
    pub date_added: DateTime<Utc>,
    pub date_modified: Option<DateTime<Utc>>,
    pub generic_type: GenericType,
    pub icon: Option<String>,
    pub insert_callback: String,
    pub podcastable: bool,
    /// Public URL of the stored file, empty when there is none
    pub www_path: String,
    pub preview_www_path: Option<String>,
}

impl MediaObjectResponse {
    fn build(media: &MediaObjectService, model: media_objects::Model) -> MediaResult<Self> {
        let entry = media
            .registry()
            .lookup(model.file_mime_type.as_deref().unwrap_or_default());
        let www_path = match model.file_name_on_disk.as_deref() {
            Some(name) if !name.is_empty() => media.www_path_to_object(name)?,
            _ => String::new(),
        };
        let preview_www_path = model
            .preview_name_on_disk
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|n| media.www_path_to_object(n))
            .transpose()?;

        Ok(Self {
            id: model.id,
            project: model.project,
            description: model.description,
            tags: model.tags,
            file_name: model.file_name,
            file_name_on_disk: model.file_name_on_disk,
            file_mime_type: model.file_mime_type,
            file_width: model.file_width,
            file_height: model.file_height,
            file_size: model.file_size,
            preview_name_on_disk: model.preview_name_on_disk,
            preview_mime_type: model.preview_mime_type,
            preview_width: model.preview_width,
            preview_height: model.preview_height,
            preview_size: model.preview_size,
            date_added: model.date_added,
            date_modified: model.date_modified,
            generic_type: entry.generic_type,
            icon: entry.icon.map(str::to_string),
            insert_callback: entry.insert_callback.to_string(),
            podcastable: entry.podcastable,
            www_path,
            preview_www_path,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Comma separated generic types, e.g. `image,other`
    pub types: Option<String>,
    /// Comma separated tag words
    pub tags: Option<String>,
    /// e.g. `last7days`
    pub timeframe: Option<String>,
    /// `NAME`, `DATE_ADDED` or `DATE_MODIFIED`, optionally suffixed with `:DESC`
    pub order: Option<String>,
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub total: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EditResponse {
    pub outcome: EditOutcome,
    pub object: MediaObjectResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedResponse {
    pub removed: bool,
}

fn parse_filters(
    query: &ListQuery,
) -> MediaResult<(
    std::collections::BTreeSet<GenericType>,
    Option<String>,
    Option<Timeframe>,
)> {
    let types = query
        .types
        .as_deref()
        .map(parse_generic_types)
        .transpose()?
        .unwrap_or_default();
    let timeframe = query
        .timeframe
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::parse::<Timeframe>)
        .transpose()?;
    let tags = query.tags.clone().filter(|t| !t.trim().is_empty());
    Ok((types, tags, timeframe))
}

#[utoipa::path(
    get,
    path = "/media",
    params(ListQuery),
    responses(
        (status = 200, description = "Media objects of the project", body = [MediaObjectResponse]),
        (status = 400, description = "Invalid filter")
    ),
    tag = "media"
)]
pub async fn list_objects(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MediaObjectResponse>>, MediaError> {
    let (types, tags, timeframe) = parse_filters(&query)?;
    let order = query
        .order
        .as_deref()
        .filter(|o| !o.is_empty())
        .map(parse_order_macro)
        .transpose()?;

    let objects = state
        .media
        .select_objects(
            project,
            SelectObjectsOptions {
                id: None,
                types,
                tags,
                timeframe,
                order,
                start: query.start,
                limit: query.limit,
            },
        )
        .await?;

    let response = objects
        .into_iter()
        .map(|m| MediaObjectResponse::build(&state.media, m))
        .collect::<MediaResult<Vec<_>>>()?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/media/count",
    params(ListQuery),
    responses(
        (status = 200, description = "Number of matching media objects", body = CountResponse)
    ),
    tag = "media"
)]
pub async fn count_objects(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CountResponse>, MediaError> {
    let (types, tags, timeframe) = parse_filters(&query)?;
    let total = state
        .media
        .count_objects(
            project,
            CountObjectsOptions {
                types,
                tags,
                timeframe,
            },
        )
        .await?;
    Ok(Json(CountResponse { total }))
}

#[utoipa::path(
    get,
    path = "/media/{id}",
    params(("id" = i32, Path, description = "Media object id")),
    responses(
        (status = 200, description = "Media object", body = MediaObjectResponse),
        (status = 404, description = "Not found")
    ),
    tag = "media"
)]
pub async fn get_object(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Path(id): Path<i32>,
) -> Result<Json<MediaObjectResponse>, MediaError> {
    let model = state
        .media
        .select_object(project, id)
        .await?
        .ok_or_else(|| MediaError::NotFound(format!("Media object {} not found", id)))?;
    Ok(Json(MediaObjectResponse::build(&state.media, model)?))
}

/// Multipart fields shared by upload and edit
#[derive(Default)]
struct MediaForm {
    file: Option<UploadedFile>,
    description: Option<String>,
    tags: Option<String>,
}

async fn read_form(mut multipart: Multipart, max_file_size: usize) -> MediaResult<MediaForm> {
    let mut form = MediaForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if field.file_name().is_some_and(|n| !n.is_empty()) {
                    form.file = Some(stage_file(field, max_file_size).await?);
                }
            }
            "description" => {
                let text = field.text().await?;
                form.description = Some(text).filter(|t| !t.trim().is_empty());
            }
            "tags" => {
                let text = field.text().await?;
                form.tags = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Streams a file field into a temp file, enforcing the size limit on the way.
async fn stage_file(mut field: Field<'_>, max_file_size: usize) -> MediaResult<UploadedFile> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);

    let temp_path = tempfile::NamedTempFile::new()
        .map_err(|e| MediaError::Io("creating temp upload", e))?
        .into_temp_path();
    let mut out = tokio::fs::File::create(&temp_path)
        .await
        .map_err(|e| MediaError::Io("opening temp upload", e))?;

    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        validate_file_size(usize::try_from(size).unwrap_or(usize::MAX), max_file_size)?;
        out.write_all(&chunk)
            .await
            .map_err(|e| MediaError::Io("writing temp upload", e))?;
    }
    out.flush()
        .await
        .map_err(|e| MediaError::Io("writing temp upload", e))?;

    Ok(UploadedFile {
        original_name,
        temp_path,
        size,
        content_type,
    })
}

#[utoipa::path(
    post,
    path = "/media",
    request_body(content = Multipart, description = "Fields: file, description, tags"),
    responses(
        (status = 201, description = "Media object created", body = MediaObjectResponse),
        (status = 400, description = "Invalid upload or file name already taken"),
        (status = 503, description = "Media store not ready")
    ),
    tag = "media"
)]
pub async fn upload_object(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MediaObjectResponse>), MediaError> {
    let form = read_form(multipart, state.config.max_file_size).await?;
    let file = form
        .file
        .ok_or_else(|| MediaError::invalid("No file provided"))?;

    let model = state
        .media
        .upload(project, file, form.description, form.tags)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MediaObjectResponse::build(&state.media, model)?),
    ))
}

#[utoipa::path(
    put,
    path = "/media/{id}",
    params(("id" = i32, Path, description = "Media object id")),
    request_body(content = Multipart, description = "Fields: description, tags, optional file"),
    responses(
        (status = 200, description = "Media object updated", body = EditResponse),
        (status = 404, description = "Not found")
    ),
    tag = "media"
)]
pub async fn edit_object(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<EditResponse>, MediaError> {
    let form = read_form(multipart, state.config.max_file_size).await?;
    let outcome = state
        .media
        .edit(project, id, form.description, form.tags, form.file)
        .await?;

    let model = state
        .media
        .select_object(project, id)
        .await?
        .ok_or_else(|| MediaError::NotFound(format!("Media object {} not found", id)))?;
    Ok(Json(EditResponse {
        outcome,
        object: MediaObjectResponse::build(&state.media, model)?,
    }))
}

#[utoipa::path(
    delete,
    path = "/media/{id}",
    params(("id" = i32, Path, description = "Media object id")),
    responses(
        (status = 204, description = "Media object deleted"),
        (status = 404, description = "Not found")
    ),
    tag = "media"
)]
pub async fn delete_object(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Path(id): Path<i32>,
) -> Result<StatusCode, MediaError> {
    state.media.delete(project, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/media/{id}/file",
    params(("id" = i32, Path, description = "Media object id")),
    responses(
        (status = 200, description = "Whether a stored file was removed", body = RemovedResponse)
    ),
    tag = "media"
)]
pub async fn remove_object_file(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Path(id): Path<i32>,
) -> Result<Json<RemovedResponse>, MediaError> {
    let removed = state.media.remove_object_file(project, id).await?;
    Ok(Json(RemovedResponse { removed }))
}

#[utoipa::path(
    delete,
    path = "/media/{id}/thumbnail",
    params(("id" = i32, Path, description = "Media object id")),
    responses(
        (status = 200, description = "Whether a thumbnail was removed", body = RemovedResponse)
    ),
    tag = "media"
)]
pub async fn remove_thumbnail(
    State(state): State<AppState>,
    Extension(ProjectScope(project)): Extension<ProjectScope>,
    Path(id): Path<i32>,
) -> Result<Json<RemovedResponse>, MediaError> {
    let removed = state.media.remove_thumbnail(project, id).await?;
    Ok(Json(RemovedResponse { removed }))
}
