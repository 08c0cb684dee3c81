use crate::error::{MediaError, MediaResult};
use crate::utils::validation::parse_hex_color;
use std::env;
use std::path::PathBuf;

/// Configuration of the media store and the thumbnail pipeline
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory holding uploaded objects and their thumbnails (default: unset)
    pub store_disk: Option<PathBuf>,

    /// Public URL prefix the store is served under (default: "/files/media")
    pub store_www: String,

    /// Permission mode applied to moved objects, e.g. 0o644 (default: unset)
    pub chmod: Option<u32>,

    /// Maximum upload size in bytes (default: 64 MB)
    pub max_file_size: usize,

    /// Thumbnail bounding box (default: 200x200)
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,

    /// Pad thumbnails onto a canvas of exactly the bounding box (default: true)
    pub thumbnail_fill_up: bool,

    /// Canvas color as six hex digits (default: "ffffff")
    pub thumbnail_fill_color: Option<String>,

    /// Project used when a request does not name one (default: 1)
    pub default_project: i32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            store_disk: None,
            store_www: "/files/media".to_string(),
            chmod: None,
            max_file_size: 64 * 1024 * 1024, // 64 MB
            thumbnail_width: 200,
            thumbnail_height: 200,
            thumbnail_fill_up: true,
            thumbnail_fill_color: Some("ffffff".to_string()),
            default_project: 1,
        }
    }
}

impl MediaConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            store_disk: env::var("MEDIA_STORE_DISK")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            store_www: env::var("MEDIA_STORE_WWW").unwrap_or(default.store_www),

            chmod: env::var("MEDIA_CHMOD").ok().and_then(|v| parse_mode(&v)),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            thumbnail_width: env::var("THUMBNAIL_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.thumbnail_width),

            thumbnail_height: env::var("THUMBNAIL_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.thumbnail_height),

            thumbnail_fill_up: env::var("THUMBNAIL_FILL_UP")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.thumbnail_fill_up),

            thumbnail_fill_color: env::var("THUMBNAIL_FILL_COLOR")
                .ok()
                .or(default.thumbnail_fill_color),

            default_project: env::var("DEFAULT_PROJECT_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.default_project),
        }
    }

    /// Config rooted at the given store directory, used by tests and local runs
    pub fn development(store_disk: impl Into<PathBuf>) -> Self {
        Self {
            store_disk: Some(store_disk.into()),
            ..Self::default()
        }
    }

    /// Rejects thumbnail settings every raster upload would trip over.
    pub fn validate(&self) -> MediaResult<()> {
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(MediaError::invalid(format!(
                "THUMBNAIL_WIDTH and THUMBNAIL_HEIGHT must be greater than zero (got {}x{})",
                self.thumbnail_width, self.thumbnail_height
            )));
        }
        match self.thumbnail_fill_color.as_deref().filter(|c| !c.is_empty()) {
            Some(color) => {
                parse_hex_color(color)?;
            }
            None if self.thumbnail_fill_up => {
                return Err(MediaError::invalid(
                    "THUMBNAIL_FILL_UP requires THUMBNAIL_FILL_COLOR",
                ));
            }
            None => {}
        }
        if self.max_file_size == 0 {
            return Err(MediaError::invalid("MAX_FILE_SIZE must be greater than zero"));
        }
        Ok(())
    }
}

/// Parses an octal permission mode such as "0644" or "644".
fn parse_mode(value: &str) -> Option<u32> {
    let trimmed = value.trim().trim_start_matches("0o");
    if trimmed.is_empty() {
        return None;
    }
    u32::from_str_radix(trimmed, 8).ok()
}
