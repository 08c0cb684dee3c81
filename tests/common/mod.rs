#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use sea_orm::{Database, DatabaseConnection};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::TempDir;
use welcompose_media::config::MediaConfig;
use welcompose_media::infrastructure::database;
use welcompose_media::services::access::{AccessControl, AllowAll};
use welcompose_media::services::media_object_service::{MediaObjectService, UploadedFile};
use welcompose_media::{AppState, create_app};

pub const PROJECT: i32 = 1;

pub struct TestEnv {
    pub store_dir: TempDir,
    pub db: DatabaseConnection,
    pub config: MediaConfig,
    pub media: Arc<MediaObjectService>,
}

impl TestEnv {
    pub fn app(&self) -> axum::Router {
        create_app(AppState {
            db: self.db.clone(),
            media: self.media.clone(),
            config: self.config.clone(),
        })
    }

    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.store_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

pub async fn setup() -> TestEnv {
    setup_with_access(Arc::new(AllowAll)).await
}

pub async fn setup_with_access(access: Arc<dyn AccessControl>) -> TestEnv {
    let store_dir = tempfile::tempdir().unwrap();
    let config = MediaConfig::development(store_dir.path());
    let db = setup_test_db().await;
    let media = Arc::new(MediaObjectService::new(db.clone(), config.clone(), access));
    TestEnv {
        store_dir,
        db,
        config,
        media,
    }
}

/// Stages bytes the way the multipart handler does.
pub fn staged(name: &str, bytes: &[u8], content_type: Option<&str>) -> UploadedFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    UploadedFile {
        original_name: name.to_string(),
        temp_path: file.into_temp_path(),
        size: bytes.len() as u64,
        content_type: content_type.map(str::to_string),
    }
}

pub fn solid_image(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let [r, g, b] = color;
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn red_gif(width: u32, height: u32) -> Vec<u8> {
    solid_image(width, height, [255, 0, 0], ImageFormat::Gif)
}

pub fn blue_png(width: u32, height: u32) -> Vec<u8> {
    solid_image(width, height, [0, 0, 255], ImageFormat::Png)
}
