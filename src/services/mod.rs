pub mod access;
pub mod generic_type_filter;
pub mod media_object_service;
pub mod mime_registry;
pub mod object_store;
pub mod tag_service;
pub mod thumbnail_service;
