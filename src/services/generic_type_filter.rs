use crate::services::mime_registry::{GenericType, MimeTypeRegistry};
use sea_orm::{ColumnTrait, Condition};
use std::collections::BTreeSet;

/// Builds the filter selecting rows whose MIME type column belongs to one of
/// `categories`.
///
/// Named categories become `column IN (union)`. `Other` becomes
/// `column NOT IN (image + document + audio + video)`, a plain complement
/// against the named categories. Both fragments are joined with OR. An empty
/// request produces no predicate at all.
pub fn build_predicate<C>(
    registry: &MimeTypeRegistry,
    column: C,
    categories: &BTreeSet<GenericType>,
) -> Option<Condition>
where
    C: ColumnTrait,
{
    let requested: BTreeSet<&'static str> = categories
        .iter()
        .filter(|t| **t != GenericType::Other)
        .flat_map(|t| registry.generic_types_to_mime_types(*t))
        .collect();

    let mut condition = Condition::any();
    let mut fragments = 0;

    if !requested.is_empty() {
        condition = condition.add(column.is_in(requested));
        fragments += 1;
    }

    if categories.contains(&GenericType::Other) {
        let classified: BTreeSet<&'static str> = GenericType::NAMED
            .into_iter()
            .flat_map(|t| registry.generic_types_to_mime_types(t))
            .collect();
        if !classified.is_empty() {
            condition = condition.add(column.is_not_in(classified));
            fragments += 1;
        }
    }

    (fragments > 0).then_some(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::media_objects;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn render(categories: &[GenericType]) -> Option<String> {
        let registry = MimeTypeRegistry::new();
        let set: BTreeSet<GenericType> = categories.iter().copied().collect();
        build_predicate(&registry, media_objects::Column::FileMimeType, &set).map(|cond| {
            media_objects::Entity::find()
                .filter(cond)
                .build(DbBackend::Sqlite)
                .to_string()
        })
    }

    #[test]
    fn test_empty_request_has_no_predicate() {
        assert!(render(&[]).is_none());
    }

    #[test]
    fn test_named_category_is_membership() {
        let sql = render(&[GenericType::Image]).unwrap();
        assert!(sql.contains(
            r#""file_mime_type" IN ('image/gif', 'image/jpeg', 'image/pjpeg', 'image/png', 'image/tif')"#
        ));
        assert!(!sql.contains("NOT IN"));
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn test_named_categories_are_unioned() {
        let sql = render(&[GenericType::Audio, GenericType::Video]).unwrap();
        assert!(sql.contains("'audio/mpeg'"));
        assert!(sql.contains("'video/quicktime'"));
        assert!(sql.contains("'application/x-shockwave-flash'"));
        assert!(!sql.contains("'image/png'"));
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn test_other_is_complement_of_named_categories() {
        let sql = render(&[GenericType::Other]).unwrap();
        assert!(sql.contains(r#""file_mime_type" NOT IN ("#));
        for mime in [
            "image/gif",
            "application/pdf",
            "application/zip",
            "audio/x-m4a",
            "video/mp4",
            "application/x-shockwave-flash",
        ] {
            assert!(sql.contains(&format!("'{}'", mime)), "{} missing", mime);
        }
    }

    #[test]
    fn test_image_and_other_are_joined_with_or() {
        let sql = render(&[GenericType::Image, GenericType::Other]).unwrap();
        let membership = sql.find(r#""file_mime_type" IN ("#).unwrap();
        let complement = sql.find(r#""file_mime_type" NOT IN ("#).unwrap();
        let or = sql.find(" OR ").unwrap();
        assert!(membership < or && or < complement);
    }
}
