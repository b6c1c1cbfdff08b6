use async_trait::async_trait;
use futures::stream::BoxStream;

#[derive(Debug, Clone)]
pub enum GenerationError {
    RequestFailed(String),
    ApiError(String),
    EmptyResponse,
    StreamInterrupted(String),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::RequestFailed(msg) => write!(f, "Generation request failed: {}", msg),
            GenerationError::ApiError(msg) => write!(f, "Generation API error: {}", msg),
            GenerationError::EmptyResponse => write!(f, "Generation returned no text"),
            GenerationError::StreamInterrupted(msg) => {
                write!(f, "Generation stream interrupted: {}", msg)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// Incremental text fragments in arrival order. Dropping the stream cancels
/// the upstream call.
pub type TextStream = BoxStream<'static, Result<String, GenerationError>>;

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream, GenerationError>;
}
