use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_objects2media_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub object: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::media_objects::Entity",
        from = "Column::Object",
        to = "super::media_objects::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    MediaObjects,
    #[sea_orm(
        belongs_to = "super::media_tags::Entity",
        from = "Column::Tag",
        to = "super::media_tags::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    MediaTags,
}

impl Related<super::media_objects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MediaObjects.def()
    }
}

impl Related<super::media_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MediaTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
