use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::utils::validation::is_plain_file_name;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Characters left untouched by RFC 3986 style encoding of a single path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Local directory holding media objects and their thumbnails.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: Option<PathBuf>,
    www_root: String,
    chmod: Option<u32>,
}

impl ObjectStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.store_disk.clone(),
            www_root: config.store_www.trim_end_matches('/').to_string(),
            chmod: config.chmod,
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path of an object below the store root. The file does not have to exist.
    pub fn path_to_object(&self, name: &str) -> MediaResult<PathBuf> {
        self.join(name)
    }

    /// Thumbnails share the object root.
    pub fn path_to_thumbnail(&self, name: &str) -> MediaResult<PathBuf> {
        self.join(name)
    }

    fn join(&self, name: &str) -> MediaResult<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(MediaError::invalid(format!(
                "'{}' is not a plain file name",
                name
            )));
        }
        let root = self.root.as_ref().ok_or(MediaError::StoreNotReady)?;
        Ok(root.join(name))
    }

    /// Public URL of an object: the www prefix plus the encoded name.
    pub fn www_path_to_object(&self, name: &str) -> MediaResult<String> {
        if name.is_empty() {
            return Err(MediaError::invalid("Object name cannot be empty"));
        }
        Ok(format!(
            "{}/{}",
            self.www_root,
            utf8_percent_encode(name, PATH_SEGMENT)
        ))
    }

    /// Fresh check that the root is a readable and writable directory.
    pub async fn is_ready(&self) -> bool {
        let Some(root) = self.root.clone() else {
            return false;
        };

        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return false,
        }

        if tokio::fs::read_dir(&root).await.is_err() {
            debug!("Media store {:?} is not readable", root);
            return false;
        }

        let probe = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".store-probe")
                .tempfile_in(&root)
                .map(drop)
        })
        .await;

        match probe {
            Ok(Ok(())) => true,
            _ => {
                debug!("Media store is not writable");
                false
            }
        }
    }

    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    /// Moves an uploaded temp file into the store under its original name.
    /// An existing file of the same name is replaced; callers run the
    /// uniqueness test first.
    pub async fn move_into_store(&self, name: &str, temp_path: &Path) -> MediaResult<String> {
        let target = self.path_to_object(name)?;
        if !self.is_ready().await {
            return Err(MediaError::StoreNotReady);
        }

        if let Err(e) = tokio::fs::rename(temp_path, &target).await {
            // Temp dir may live on another filesystem
            debug!("rename failed ({}), falling back to copy", e);
            tokio::fs::copy(temp_path, &target)
                .await
                .map_err(|e| MediaError::Io("moving upload into store", e))?;
            if let Err(e) = tokio::fs::remove_file(temp_path).await {
                warn!("Failed to remove temp upload {:?}: {}", temp_path, e);
            }
        }

        if let Some(mode) = self.chmod {
            self.apply_mode(&target, mode).await;
        }

        info!("📦 Stored object '{}'", name);
        Ok(name.to_string())
    }

    /// Creates `name` holding `bytes`. Never replaces an existing file:
    /// `Ok(false)` when the name is already taken.
    pub async fn write_new(&self, name: &str, bytes: &[u8]) -> MediaResult<bool> {
        let target = self.join(name)?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(MediaError::Io("creating file in store", e)),
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;
        drop(file);

        if let Err(e) = written {
            self.discard(name).await;
            return Err(MediaError::Io("writing file in store", e));
        }

        if let Some(mode) = self.chmod {
            self.apply_mode(&target, mode).await;
        }
        Ok(true)
    }

    #[cfg(unix)]
    async fn apply_mode(&self, path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
        {
            warn!("Failed to chmod {:?} to {:o}: {}", path, mode, e);
        }
    }

    #[cfg(not(unix))]
    async fn apply_mode(&self, path: &Path, mode: u32) {
        debug!("Ignoring chmod {:o} for {:?} on this platform", mode, path);
    }

    /// Renames a stored file out of the way so it can be restored if the
    /// matching row update fails.
    pub async fn bury(&self, path: &Path) -> MediaResult<PathBuf> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MediaError::invalid(format!("{:?} has no file name", path)))?;
        let tombstone = path.with_file_name(format!(".{}.{}.deleted", name, uuid::Uuid::new_v4()));
        tokio::fs::rename(path, &tombstone)
            .await
            .map_err(|e| MediaError::Io("moving file to tombstone", e))?;
        Ok(tombstone)
    }

    pub async fn restore(&self, tombstone: &Path, path: &Path) {
        if let Err(e) = tokio::fs::rename(tombstone, path).await {
            tracing::error!("Failed to restore {:?} from {:?}: {}", path, tombstone, e);
        }
    }

    /// Unlinks a buried file. Failure leaves an orphan tombstone behind.
    pub async fn purge(&self, tombstone: &Path) -> bool {
        match tokio::fs::remove_file(tombstone).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to unlink tombstone {:?}: {}", tombstone, e);
                false
            }
        }
    }

    /// Best effort removal used to roll back a half finished upload.
    pub async fn discard(&self, name: &str) {
        if let Ok(path) = self.join(name) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Discarded {:?}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to discard {:?}: {}", path, e),
            }
        }
    }
}
