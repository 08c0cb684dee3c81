use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_objects")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub date_added: DateTimeUtc,
    pub date_modified: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::media_objects2media_tags::Entity")]
    ObjectTags,
}

impl Related<super::media_objects2media_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ObjectTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
