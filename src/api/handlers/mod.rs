pub mod health;
pub mod media;
pub mod mime_types;
