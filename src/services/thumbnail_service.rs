use crate::error::{MediaError, MediaResult};
use crate::services::object_store::ObjectStore;
use crate::utils::validation::parse_hex_color;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use std::io::Cursor;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

/// MIME type of every generated thumbnail
pub const THUMBNAIL_MIME_TYPE: &str = "image/png";

/// Numbered variants tried when the plain thumbnail name is taken
const THUMBNAIL_NAME_ATTEMPTS: u32 = 100;

/// Descriptor of a written thumbnail, persisted into the preview columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ThumbnailResult {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub size_bytes: u64,
}

pub struct ThumbnailService {
    store: ObjectStore,
}

impl ThumbnailService {
    pub fn new(store: ObjectStore) -> Self {
        Self { store }
    }

    /// Renders a PNG thumbnail of a stored raster image.
    ///
    /// Returns `Ok(None)` when the stored file is not a GIF, JPEG or PNG.
    pub async fn generate(
        &self,
        original_name: &str,
        stored_name: &str,
        max_width: u32,
        max_height: u32,
        fill_up: bool,
        fill_color: Option<&str>,
    ) -> MediaResult<Option<ThumbnailResult>> {
        if original_name.is_empty() || stored_name.is_empty() {
            return Err(MediaError::invalid("Object names cannot be empty"));
        }
        if max_width == 0 || max_height == 0 {
            return Err(MediaError::invalid(
                "Thumbnail width and height must be greater than zero",
            ));
        }
        let fill_color = fill_color.filter(|c| !c.is_empty());
        if fill_up && fill_color.is_none() {
            return Err(MediaError::invalid(
                "To fill up an image a canvas color is required",
            ));
        }
        let canvas_rgb = fill_color.map(parse_hex_color).transpose()?;
        if !self.store.is_ready().await {
            return Err(MediaError::StoreNotReady);
        }

        let source_path = self.store.path_to_object(stored_name)?;
        let bytes = tokio::fs::read(&source_path)
            .await
            .map_err(|e| MediaError::Io("reading thumbnail source", e))?;

        let Some(format) = raster_format(&bytes) else {
            debug!("No thumbnail for '{}': not a gif, jpeg or png", stored_name);
            return Ok(None);
        };

        let source = image::load_from_memory_with_format(&bytes, format)?;
        let (width, height) = scaled_size(source.width(), source.height(), max_width, max_height);
        let scaled = source.resize_exact(width, height, FilterType::CatmullRom);

        let output = match (fill_up, canvas_rgb) {
            (true, Some([r, g, b])) => {
                let mut canvas = RgbaImage::from_pixel(max_width, max_height, Rgba([r, g, b, 255]));
                let x = (max_width.saturating_sub(width) / 2) as i64;
                let y = (max_height.saturating_sub(height) / 2) as i64;
                imageops::overlay(&mut canvas, &scaled.to_rgba8(), x, y);
                DynamicImage::ImageRgba8(canvas)
            }
            _ => scaled,
        };

        let (width, height) = (output.width(), output.height());
        let mut png = Vec::new();
        output.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let Some(name) = self.store_png(original_name, width, height, &png).await? else {
            warn!(
                "No free thumbnail name for '{}' ({}x{}), skipping preview",
                original_name, width, height
            );
            return Ok(None);
        };

        let target = self.store.path_to_thumbnail(&name)?;
        let size_bytes = match tokio::fs::metadata(&target).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                self.store.discard(&name).await;
                return Err(MediaError::Io("reading thumbnail size", e));
            }
        };

        info!(
            "🖼️  Thumbnail '{}' written ({}x{}, {} bytes)",
            name, width, height, size_bytes
        );

        Ok(Some(ThumbnailResult {
            name,
            width,
            height,
            mime_type: THUMBNAIL_MIME_TYPE.to_string(),
            size_bytes,
        }))
    }

    /// Writes the encoded thumbnail under the first free name. Existing files
    /// in the store are never replaced.
    async fn store_png(
        &self,
        original_name: &str,
        width: u32,
        height: u32,
        png: &[u8],
    ) -> MediaResult<Option<String>> {
        for attempt in 0..THUMBNAIL_NAME_ATTEMPTS {
            let name = numbered_thumbnail_name(original_name, width, height, attempt);
            if self.store.write_new(&name, png).await? {
                return Ok(Some(name));
            }
            debug!("Thumbnail name '{}' is taken", name);
        }
        Ok(None)
    }

    /// Pixel dimensions of a stored raster image, `None` for anything else.
    pub async fn image_dimensions(&self, stored_name: &str) -> MediaResult<Option<(u32, u32)>> {
        let path = self.store.path_to_object(stored_name)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| MediaError::Io("reading stored object", e))?;

        let Some(format) = raster_format(&bytes) else {
            return Ok(None);
        };
        let reader = image::io::Reader::with_format(Cursor::new(&bytes), format);
        Ok(reader.into_dimensions().ok())
    }
}

fn raster_format(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Gif | ImageFormat::Jpeg | ImageFormat::Png)) => Some(format),
        _ => None,
    }
}

/// Fits `src` into the `max` box keeping the aspect ratio. The overflowing
/// dimension shrinks; the other one is taken from the box as is.
pub fn scaled_size(src_width: u32, src_height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (max_width.max(1), max_height.max(1));
    }
    let ratio = src_width as f64 / src_height as f64;
    let (width, height) = if max_width as f64 / max_height as f64 > ratio {
        (max_height as f64 * ratio, max_height as f64)
    } else {
        (max_width as f64, max_width as f64 / ratio)
    };
    ((width as u32).max(1), (height as u32).max(1))
}

/// `photo.jpg` at 200x50 becomes `photo_200x50.png`. Only a raster suffix is
/// stripped, so `report.pdf` becomes `report.pdf_200x200.png`.
pub fn thumbnail_name(original_name: &str, width: u32, height: u32) -> String {
    numbered_thumbnail_name(original_name, width, height, 0)
}

/// Attempt 0 is the plain name; later attempts append `_{n}`.
fn numbered_thumbnail_name(original_name: &str, width: u32, height: u32, attempt: u32) -> String {
    let stem = match original_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && ["jpg", "jpeg", "png", "gif"]
                    .iter()
                    .any(|s| ext.eq_ignore_ascii_case(s)) =>
        {
            stem
        }
        _ => original_name,
    };
    if attempt == 0 {
        format!("{}_{}x{}.png", stem, width, height)
    } else {
        format!("{}_{}x{}_{}.png", stem, width, height, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_size_landscape() {
        assert_eq!(scaled_size(400, 100, 200, 200), (200, 50));
        assert_eq!(scaled_size(1920, 1080, 200, 200), (200, 112));
    }

    #[test]
    fn test_scaled_size_portrait() {
        assert_eq!(scaled_size(100, 400, 200, 200), (50, 200));
        assert_eq!(scaled_size(300, 600, 100, 300), (100, 200));
    }

    #[test]
    fn test_scaled_size_upscales_small_sources() {
        assert_eq!(scaled_size(50, 50, 200, 200), (200, 200));
        assert_eq!(scaled_size(10, 20, 200, 200), (100, 200));
    }

    #[test]
    fn test_scaled_size_never_zero() {
        assert_eq!(scaled_size(10000, 1, 200, 200), (200, 1));
    }

    #[test]
    fn test_thumbnail_name() {
        assert_eq!(thumbnail_name("a.gif", 200, 200), "a_200x200.png");
        assert_eq!(thumbnail_name("Photo.JPEG", 80, 60), "Photo_80x60.png");
        assert_eq!(thumbnail_name("archive.tar.png", 10, 10), "archive.tar_10x10.png");
        assert_eq!(thumbnail_name("report.pdf", 200, 200), "report.pdf_200x200.png");
        assert_eq!(thumbnail_name("README", 200, 200), "README_200x200.png");
        assert_eq!(numbered_thumbnail_name("logo.gif", 200, 200, 0), "logo_200x200.png");
        assert_eq!(numbered_thumbnail_name("logo.gif", 200, 200, 2), "logo_200x200_2.png");
    }
}
