pub mod prelude;

pub mod media_objects;
pub mod media_objects2media_tags;
pub mod media_tags;
