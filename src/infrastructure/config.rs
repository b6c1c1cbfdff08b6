use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 250 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Missing(String),
    Invalid { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} not set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub service_url: String,
    pub model: String,
    pub dimension: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub root: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub supabase_url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub ingest_concurrency: usize,
    pub retrieval_top_k: usize,
    pub context_passages: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub qdrant: QdrantConfig,
    pub embedding: EmbeddingConfig,
    pub gemini: GeminiConfig,
    pub blobs: BlobConfig,
    pub auth: AuthConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = Reader { lookup };

        let port = reader.parsed("PORT", DEFAULT_PORT)?;

        let pipeline = PipelineConfig {
            chunk_size: reader.positive("CHUNK_SIZE", 500)?,
            ingest_concurrency: reader.positive("INGEST_CONCURRENCY", 3)?,
            retrieval_top_k: reader.positive("RETRIEVAL_TOP_K", 5)?,
            context_passages: reader.positive("CONTEXT_PASSAGES", 3)?,
        };

        Ok(Self {
            database_url: reader.required("DATABASE_URL")?,
            port,
            max_upload_bytes: reader.positive("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            qdrant: QdrantConfig {
                url: reader.url("QDRANT_URL", "http://localhost:6333")?,
                api_key: reader.optional("QDRANT_API_KEY"),
                collection: reader.or("QDRANT_COLLECTION", "user_docs"),
            },
            embedding: EmbeddingConfig {
                service_url: reader.url("EMBEDDINGS_SERVICE_URL", "http://localhost:8000/embed")?,
                model: reader.or("EMBEDDING_MODEL", "all-MiniLM-L6-v2"),
                dimension: reader.positive("EMBEDDING_DIMENSION", 384)?,
                max_retries: 3,
                timeout_secs: 30,
                backoff_factor: 1.5,
            },
            gemini: GeminiConfig {
                api_key: reader.required("GEMINI_API_KEY")?,
                model: reader.or("GEMINI_MODEL", "gemini-2.5-flash"),
                base_url: reader.url(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com",
                )?,
            },
            blobs: BlobConfig {
                root: PathBuf::from(reader.or("UPLOAD_DIR", "./uploads")),
                public_base_url: reader
                    .optional("PUBLIC_BLOB_BASE_URL")
                    .unwrap_or_else(|| format!("http://localhost:{}/blobs", port)),
            },
            auth: AuthConfig {
                supabase_url: reader.url("SUPABASE_URL", "http://localhost:54321")?,
                anon_key: reader.or("SUPABASE_ANON_KEY", ""),
            },
            pipeline,
        })
    }
}

struct Reader<F> {
    lookup: F,
}

impl<F> Reader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.optional(key) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    /// An absolute http(s) URL, returned as configured.
    fn url(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let value = self.or(key, default);
        match Url::parse(&value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(value),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value,
            }),
        }
    }

    fn positive(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        let value = self.parsed(key, default)?;
        if value == 0 {
            return Err(ConfigError::Invalid {
                key: key.to_string(),
                value: "0".to_string(),
            });
        }
        Ok(value)
    }
}
