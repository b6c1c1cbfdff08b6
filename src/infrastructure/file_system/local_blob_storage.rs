use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::application::ports::blob_storage::{BlobStorage, BlobStorageError, BlobUploadOptions};

const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Serialize, Deserialize)]
struct BlobMetadata {
    content_type: String,
    cache_control: String,
    size: u64,
}

/// Blob storage backed by a directory. Every object `key` is stored at
/// `root/key` next to a `key.meta.json` sidecar.
pub struct LocalBlobStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStorage {
    pub fn new(root: PathBuf, public_base_url: &str) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_directory_exists(&self) -> Result<(), BlobStorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, BlobStorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(BlobStorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn sidecar_path(object_path: &Path) -> PathBuf {
        let mut name = object_path.as_os_str().to_owned();
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        options: &BlobUploadOptions,
    ) -> Result<(), BlobStorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobStorageError::IoError(e.to_string()))?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        let metadata = serde_json::to_vec(&BlobMetadata {
            content_type: options.content_type.clone(),
            cache_control: options.cache_control.clone(),
            size: data.len() as u64,
        })
        .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        fs::write(Self::sidecar_path(&path), metadata)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        debug!("Stored blob {} ({} bytes)", key, data.len());
        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<String, BlobStorageError> {
        self.object_path(key)?;
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn remove(&self, keys: &[String]) -> Result<usize, BlobStorageError> {
        let mut removed = 0;

        for key in keys {
            let path = self.object_path(key)?;
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(BlobStorageError::IoError(e.to_string())),
            }

            match fs::remove_file(Self::sidecar_path(&path)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(BlobStorageError::IoError(e.to_string())),
            }
        }

        Ok(removed)
    }
}
