use crate::error::{MediaError, MediaResult};
use crate::utils::validation::validate_mime_type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Coarse media category derived from a MIME type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum GenericType {
    Image,
    Document,
    Audio,
    Video,
    Other,
}

impl GenericType {
    pub const ALL: [GenericType; 5] = [
        GenericType::Image,
        GenericType::Document,
        GenericType::Audio,
        GenericType::Video,
        GenericType::Other,
    ];

    /// Every category except the `Other` sentinel.
    pub const NAMED: [GenericType; 4] = [
        GenericType::Image,
        GenericType::Document,
        GenericType::Audio,
        GenericType::Video,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenericType::Image => "image",
            GenericType::Document => "document",
            GenericType::Audio => "audio",
            GenericType::Video => "video",
            GenericType::Other => "other",
        }
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenericType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenericType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| MediaError::invalid(format!("Unknown generic type '{}'", s)))
    }
}

/// Parses a comma separated list such as `image,other`.
pub fn parse_generic_types(list: &str) -> MediaResult<BTreeSet<GenericType>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(GenericType::from_str)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimeTypeEntry {
    pub mime_type: &'static str,
    pub suffix: Option<&'static str>,
    pub podcastable: bool,
    pub insert_callback: &'static str,
    pub generic_type: GenericType,
    pub icon: Option<&'static str>,
}

/// Reserved key of the fallback entry
pub const DEFAULT_KEY: &str = "__DEFAULT__";

const DEFAULT_ENTRY: MimeTypeEntry = MimeTypeEntry {
    mime_type: DEFAULT_KEY,
    suffix: None,
    podcastable: false,
    insert_callback: "document",
    generic_type: GenericType::Other,
    icon: Some("generic.jpg"),
};

const fn entry(
    mime_type: &'static str,
    suffix: &'static str,
    podcastable: bool,
    insert_callback: &'static str,
    generic_type: GenericType,
    icon: Option<&'static str>,
) -> MimeTypeEntry {
    MimeTypeEntry {
        mime_type,
        suffix: Some(suffix),
        podcastable,
        insert_callback,
        generic_type,
        icon,
    }
}

const MIME_TYPES: &[MimeTypeEntry] = &[
    // Documents
    entry("application/msword", "doc", false, "document", GenericType::Document, Some("doc.jpg")),
    entry("application/pdf", "pdf", true, "document", GenericType::Document, Some("pdf.jpg")),
    entry("application/rtf", "rtf", false, "document", GenericType::Document, Some("rtf.jpg")),
    entry("application/vnd.ms-excel", "xls", false, "document", GenericType::Document, Some("xls.jpg")),
    entry("application/vnd.ms-powerpoint", "ppt", false, "document", GenericType::Document, Some("ppt.jpg")),
    entry("application/vnd.oasis.opendocument.text", "odt", false, "document", GenericType::Document, Some("odt.jpg")),
    entry("application/vnd.oasis.opendocument.spreadsheet", "ods", false, "document", GenericType::Document, Some("ods.jpg")),
    entry("application/vnd.oasis.opendocument.presentation", "odp", false, "document", GenericType::Document, Some("odp.jpg")),
    entry("application/zip", "zip", false, "document", GenericType::Document, Some("zip.jpg")),
    // Flash is embedded like a video
    entry("application/x-shockwave-flash", "swf", false, "application-x-shockwave-flash", GenericType::Video, Some("swf.jpg")),
    // Audio
    entry("audio/mpeg", "mp3", true, "document", GenericType::Audio, Some("audio.jpg")),
    entry("audio/x-m4a", "m4a", true, "document", GenericType::Audio, Some("audio.jpg")),
    // Images
    entry("image/gif", "gif", false, "image", GenericType::Image, None),
    entry("image/pjpeg", "jpg", false, "image", GenericType::Image, None),
    entry("image/jpeg", "jpg", false, "image", GenericType::Image, None),
    entry("image/png", "png", false, "image", GenericType::Image, None),
    entry("image/tif", "tif", false, "image", GenericType::Image, None),
    // Video
    entry("video/mp4", "mp4", true, "document", GenericType::Video, Some("video.jpg")),
    entry("video/x-m4v", "m4v", true, "document", GenericType::Video, Some("video.jpg")),
    entry("video/quicktime", "mov", true, "document", GenericType::Video, Some("video.jpg")),
];

/// Static table mapping MIME types to their category, icon, podcast bit
/// and insert callback.
#[derive(Debug, Clone)]
pub struct MimeTypeRegistry {
    entries: &'static [MimeTypeEntry],
    fallback: &'static MimeTypeEntry,
}

impl Default for MimeTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeTypeRegistry {
    pub fn new() -> Self {
        Self {
            entries: MIME_TYPES,
            fallback: &DEFAULT_ENTRY,
        }
    }

    pub fn entries(&self) -> &'static [MimeTypeEntry] {
        self.entries
    }

    pub fn default_entry(&self) -> &'static MimeTypeEntry {
        self.fallback
    }

    /// Never fails: unknown types resolve to the `__DEFAULT__` entry.
    pub fn lookup(&self, mime_type: &str) -> &'static MimeTypeEntry {
        self.find(mime_type).unwrap_or(self.fallback)
    }

    fn find(&self, mime_type: &str) -> Option<&'static MimeTypeEntry> {
        self.entries.iter().find(|e| e.mime_type == mime_type)
    }

    pub fn generic_type_of(&self, mime_type: &str) -> GenericType {
        self.lookup(mime_type).generic_type
    }

    /// MIME types classified as `generic_type`. `Other` is the complement of
    /// the named categories and therefore always yields an empty set here.
    pub fn generic_types_to_mime_types(&self, generic_type: GenericType) -> BTreeSet<&'static str> {
        if generic_type == GenericType::Other {
            return BTreeSet::new();
        }
        self.entries
            .iter()
            .filter(|e| e.generic_type == generic_type)
            .map(|e| e.mime_type)
            .collect()
    }

    pub fn is_podcast_format(&self, mime_type: &str) -> MediaResult<bool> {
        validate_mime_type(mime_type)?;
        Ok(self.find(mime_type).map(|e| e.podcastable).unwrap_or(false))
    }

    pub fn mime_type_to_icon(&self, mime_type: &str) -> MediaResult<Option<&'static str>> {
        validate_mime_type(mime_type)?;
        Ok(self.lookup(mime_type).icon)
    }

    pub fn mime_type_to_insert_callback(&self, mime_type: &str) -> MediaResult<&'static str> {
        validate_mime_type(mime_type)?;
        Ok(self.lookup(mime_type).insert_callback)
    }
}
