use async_trait::async_trait;

#[derive(Debug)]
pub enum BlobStorageError {
    NotFound(String),
    InvalidKey(String),
    IoError(String),
}

impl std::fmt::Display for BlobStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobStorageError::NotFound(key) => write!(f, "Blob not found: {}", key),
            BlobStorageError::InvalidKey(key) => write!(f, "Invalid blob key: {}", key),
            BlobStorageError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for BlobStorageError {}

#[derive(Debug, Clone, PartialEq)]
pub struct BlobUploadOptions {
    pub content_type: String,
    pub cache_control: String,
}

impl BlobUploadOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: "max-age=3600".to_string(),
        }
    }
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        options: &BlobUploadOptions,
    ) -> Result<(), BlobStorageError>;

    fn public_url(&self, key: &str) -> Result<String, BlobStorageError>;

    /// Removes every key that exists and returns how many were removed.
    async fn remove(&self, keys: &[String]) -> Result<usize, BlobStorageError>;
}
