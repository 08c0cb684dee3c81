use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("You are not allowed to perform this action")]
    AccessDenied,

    #[error("Media store is not ready")]
    StoreNotReady,

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("IO error while {0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl MediaError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type MediaResult<T> = Result<T, MediaError>;
