use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project: i32,
    pub word: String,
    pub occurrences: i32,
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
