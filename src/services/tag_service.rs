use crate::entities::{media_objects2media_tags, media_tags, prelude::*};
use crate::error::MediaResult;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
};
use std::collections::BTreeSet;

/// Splits a comma separated tag string into normalized, unique words.
pub fn tag_string_to_words(tags: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tags.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Replaces the tag links of an object and keeps `occurrences` in step.
/// Run it on the transaction that also updates the object row.
pub async fn update_tags<C>(db: &C, project: i32, object: i32, words: &[String]) -> MediaResult<()>
where
    C: ConnectionTrait,
{
    // Only links to this project's tags are touched
    let previous = MediaObjectTags::find()
        .inner_join(MediaTags)
        .filter(media_objects2media_tags::Column::Object.eq(object))
        .filter(media_tags::Column::Project.eq(project))
        .all(db)
        .await?;

    if !previous.is_empty() {
        MediaObjectTags::delete_many()
            .filter(media_objects2media_tags::Column::Object.eq(object))
            .filter(media_objects2media_tags::Column::Tag.is_in(previous.iter().map(|l| l.tag)))
            .exec(db)
            .await?;
    }

    for link in previous {
        let Some(tag) = MediaTags::find_by_id(link.tag).one(db).await? else {
            continue;
        };
        if tag.occurrences <= 1 {
            MediaTags::delete_by_id(tag.id).exec(db).await?;
        } else {
            let occurrences = tag.occurrences - 1;
            let mut active: media_tags::ActiveModel = tag.into();
            active.occurrences = Set(occurrences);
            active.update(db).await?;
        }
    }

    for word in words {
        let existing = MediaTags::find()
            .filter(media_tags::Column::Project.eq(project))
            .filter(media_tags::Column::Word.eq(word.as_str()))
            .one(db)
            .await?;

        let tag = match existing {
            Some(tag) => {
                let occurrences = tag.occurrences + 1;
                let mut active: media_tags::ActiveModel = tag.into();
                active.occurrences = Set(occurrences);
                active.update(db).await?
            }
            None => {
                media_tags::ActiveModel {
                    project: Set(project),
                    word: Set(word.clone()),
                    occurrences: Set(1),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        media_objects2media_tags::ActiveModel {
            object: Set(object),
            tag: Set(tag.id),
        }
        .insert(db)
        .await?;
    }

    tracing::debug!("Object {} tagged with {:?}", object, words);
    Ok(())
}

/// Words currently linked to an object, alphabetically.
pub async fn select_object_tags<C>(db: &C, object: i32) -> MediaResult<Vec<String>>
where
    C: ConnectionTrait,
{
    let mut words: Vec<String> = MediaTags::find()
        .inner_join(MediaObjectTags)
        .filter(media_objects2media_tags::Column::Object.eq(object))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.word)
        .collect();
    words.sort();
    Ok(words)
}
