use crate::config::MediaConfig;
use tracing::{info, warn};

/// Creates the configured store directory if it is missing.
pub async fn setup_store(config: &MediaConfig) {
    let Some(root) = config.store_disk.as_ref() else {
        warn!("⚠️  MEDIA_STORE_DISK is not set, uploads will be rejected");
        return;
    };

    info!("🗄️  Media store: {:?} (served at {})", root, config.store_www);

    match tokio::fs::create_dir_all(root).await {
        Ok(()) => info!("✅ Media store directory is ready"),
        Err(e) => tracing::error!("❌ Failed to create media store {:?}: {}", root, e),
    }
}
