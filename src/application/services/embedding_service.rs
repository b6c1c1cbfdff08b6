use std::sync::Arc;

use crate::application::ports::embedding_provider::{BatchEmbeddingRequest, EmbeddingProvider};
use crate::domain::value_objects::EmbeddingVector;

#[derive(Debug)]
pub enum EmbeddingServiceError {
    ProviderError(String),
    CountMismatch { expected: usize, actual: usize },
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for EmbeddingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingServiceError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            EmbeddingServiceError::CountMismatch { expected, actual } => write!(
                f,
                "Embedding count mismatch: expected {}, got {}",
                expected, actual
            ),
            EmbeddingServiceError::DimensionMismatch { expected, actual } => write!(
                f,
                "Embedding dimension mismatch: expected {}, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for EmbeddingServiceError {}

/// Embeds chunks and queries through one provider, so every vector it hands
/// out is comparable with every other.
pub struct EmbeddingService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
}

impl EmbeddingService {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>, dimension: usize) -> Self {
        Self {
            embedding_provider,
            dimension,
        }
    }

    /// One provider call for the whole batch; vector `i` belongs to `texts[i]`.
    pub async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<EmbeddingVector>, EmbeddingServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .embedding_provider
            .generate_embeddings(BatchEmbeddingRequest {
                texts: texts.to_vec(),
            })
            .await
            .map_err(|e| EmbeddingServiceError::ProviderError(e.to_string()))?;

        if response.embeddings.len() != texts.len() {
            return Err(EmbeddingServiceError::CountMismatch {
                expected: texts.len(),
                actual: response.embeddings.len(),
            });
        }

        if let Some(bad) = response
            .embeddings
            .iter()
            .find(|vector| vector.dimension() != self.dimension)
        {
            return Err(EmbeddingServiceError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.dimension(),
            });
        }

        Ok(response.embeddings)
    }

    pub async fn embed_one(&self, text: &str) -> Result<EmbeddingVector, EmbeddingServiceError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingServiceError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    pub fn model_name(&self) -> &str {
        self.embedding_provider.model_name()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::embedding_provider::{
        BatchEmbeddingResponse, EmbeddingProviderError,
    };
    use crate::application::testing::{HashEmbeddingProvider, TEST_DIMENSION};
    use async_trait::async_trait;
    use std::sync::atomic::Ordering;

    struct ShortProvider;

    #[async_trait]
    impl EmbeddingProvider for ShortProvider {
        async fn generate_embeddings(
            &self,
            request: BatchEmbeddingRequest,
        ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
            Ok(BatchEmbeddingResponse {
                embeddings: request
                    .texts
                    .iter()
                    .skip(1)
                    .map(|_| EmbeddingVector::from(vec![0.0; 3]))
                    .collect(),
                model_name: "short".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "short"
        }

        fn embedding_dimension(&self) -> usize {
            3
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_matches_single() {
        let provider = Arc::new(HashEmbeddingProvider::default());
        let service = EmbeddingService::new(provider.clone(), TEST_DIMENSION);
        let texts = vec![
            "the quick brown fox".to_string(),
            "lorem ipsum".to_string(),
            "rust ownership and borrowing".to_string(),
        ];

        let batch = service.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), texts.len());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        for (text, vector) in texts.iter().zip(batch.iter()) {
            assert_eq!(&service.embed_one(text).await.unwrap(), vector);
        }
    }

    #[tokio::test]
    async fn test_empty_batch_skips_provider() {
        let provider = Arc::new(HashEmbeddingProvider::default());
        let service = EmbeddingService::new(provider.clone(), TEST_DIMENSION);

        assert!(service.embed_batch(&[]).await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_an_error() {
        let service = EmbeddingService::new(Arc::new(ShortProvider), 3);
        let result = service
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await;

        assert!(matches!(
            result,
            Err(EmbeddingServiceError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_error() {
        let service = EmbeddingService::new(Arc::new(HashEmbeddingProvider::default()), 384);
        let result = service.embed_one("hello").await;

        assert!(matches!(
            result,
            Err(EmbeddingServiceError::DimensionMismatch { expected: 384, .. })
        ));
    }
}
