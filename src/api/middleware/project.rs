use crate::AppState;
use crate::error::MediaError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const PROJECT_HEADER: &str = "X-Project-Id";

/// Tenant every media request is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectScope(pub i32);

/// Resolves the project from `X-Project-Id`, falling back to the configured default.
pub async fn project_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let project = match req.headers().get(PROJECT_HEADER) {
        None => state.config.default_project,
        Some(value) => match value.to_str().ok().and_then(|v| v.trim().parse::<i32>().ok()) {
            Some(project) if project > 0 => project,
            _ => {
                return MediaError::invalid(format!(
                    "{} must be a positive integer",
                    PROJECT_HEADER
                ))
                .into_response();
            }
        },
    };

    req.extensions_mut().insert(ProjectScope(project));
    next.run(req).await
}
