pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::api::middleware::project::project_middleware;
use crate::config::MediaConfig;
use crate::services::media_object_service::MediaObjectService;
use axum::{Json, Router, middleware::from_fn_with_state, routing::{delete, get}};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::media::list_objects,
        handlers::media::count_objects,
        handlers::media::upload_object,
        handlers::media::get_object,
        handlers::media::edit_object,
        handlers::media::delete_object,
        handlers::media::remove_object_file,
        handlers::media::remove_thumbnail,
        handlers::mime_types::lookup_mime_type,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::media::MediaObjectResponse,
            handlers::media::CountResponse,
            handlers::media::EditResponse,
            handlers::media::RemovedResponse,
            handlers::mime_types::MimeTypeInfo,
            services::mime_registry::GenericType,
            services::media_object_service::EditOutcome,
        )
    ),
    tags(
        (name = "media", description = "Media object management"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub media: Arc<MediaObjectService>,
    pub config: MediaConfig,
}

pub fn create_app(state: AppState) -> Router {
    let media_routes = Router::new()
        .route(
            "/media",
            get(handlers::media::list_objects).post(handlers::media::upload_object),
        )
        .route("/media/count", get(handlers::media::count_objects))
        .route(
            "/media/:id",
            get(handlers::media::get_object)
                .put(handlers::media::edit_object)
                .delete(handlers::media::delete_object),
        )
        .route("/media/:id/file", delete(handlers::media::remove_object_file))
        .route(
            "/media/:id/thumbnail",
            delete(handlers::media::remove_thumbnail),
        )
        .route(
            "/mime-types/:type/:subtype",
            get(handlers::mime_types::lookup_mime_type),
        )
        .layer(from_fn_with_state(state.clone(), project_middleware));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(media_routes)
        .with_state(state)
}
