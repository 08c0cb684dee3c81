use crate::error::MediaError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MediaError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            MediaError::AccessDenied => (
                StatusCode::FORBIDDEN,
                "You are not allowed to perform this action".to_string(),
            ),
            MediaError::StoreNotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Media store is not ready".to_string(),
            ),
            MediaError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            MediaError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            MediaError::Io(action, e) => {
                tracing::error!("IO error while {}: {:?}", action, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            MediaError::Image(e) => {
                tracing::error!("Image error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<MultipartError> for MediaError {
    fn from(e: MultipartError) -> Self {
        MediaError::invalid(format!("Malformed multipart body: {}", e))
    }
}
