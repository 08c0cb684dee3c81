use crate::AppState;
use crate::error::MediaError;
use crate::services::mime_registry::{DEFAULT_KEY, GenericType};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MimeTypeInfo {
    pub mime_type: String,
    /// False when the answer comes from the fallback entry
    pub known: bool,
    pub suffix: Option<String>,
    pub generic_type: GenericType,
    pub podcastable: bool,
    pub icon: Option<String>,
    pub insert_callback: String,
}

#[utoipa::path(
    get,
    path = "/mime-types/{type}/{subtype}",
    params(
        ("type" = String, Path, description = "Top level type, e.g. image"),
        ("subtype" = String, Path, description = "Subtype, e.g. png")
    ),
    responses(
        (status = 200, description = "Registry entry for the MIME type", body = MimeTypeInfo),
        (status = 400, description = "Malformed MIME type")
    ),
    tag = "media"
)]
pub async fn lookup_mime_type(
    State(state): State<AppState>,
    Path((top, subtype)): Path<(String, String)>,
) -> Result<Json<MimeTypeInfo>, MediaError> {
    let mime_type = format!("{}/{}", top, subtype);
    let registry = state.media.registry();

    let podcastable = registry.is_podcast_format(&mime_type)?;
    let icon = registry.mime_type_to_icon(&mime_type)?;
    let insert_callback = registry.mime_type_to_insert_callback(&mime_type)?;
    let entry = registry.lookup(&mime_type);

    Ok(Json(MimeTypeInfo {
        known: entry.mime_type != DEFAULT_KEY,
        suffix: entry.suffix.map(str::to_string),
        generic_type: entry.generic_type,
        podcastable,
        icon: icon.map(str::to_string),
        insert_callback: insert_callback.to_string(),
        mime_type,
    }))
}
