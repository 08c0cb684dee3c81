pub use super::media_objects::Entity as MediaObjects;
pub use super::media_objects2media_tags::Entity as MediaObjectTags;
pub use super::media_tags::Entity as MediaTags;
