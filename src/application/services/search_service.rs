use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::application::ports::vector_store::{SearchFilter, VectorStore};
use crate::application::services::EmbeddingService;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug)]
pub enum SearchServiceError {
    EmbeddingError(String),
    VectorStoreError(String),
}

impl std::fmt::Display for SearchServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchServiceError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            SearchServiceError::VectorStoreError(msg) => write!(f, "Vector store error: {}", msg),
        }
    }
}

impl std::error::Error for SearchServiceError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
    pub file_name: Option<String>,
}

/// Query-time half of the pipeline: embed the question, search the
/// collection restricted to the given files, keep the passages' text.
pub struct SearchService {
    embedding_service: Arc<EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
}

impl SearchService {
    pub fn new(
        embedding_service: Arc<EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        collection: String,
    ) -> Self {
        Self {
            embedding_service,
            vector_store,
            collection,
        }
    }

    /// Passages in the store's similarity order. Hits whose payload carries
    /// no `text` are dropped.
    pub async fn retrieve(
        &self,
        query: &str,
        file_names: &[String],
        owner_id: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, SearchServiceError> {
        let query_vector = self
            .embedding_service
            .embed_one(query)
            .await
            .map_err(|e| SearchServiceError::EmbeddingError(e.to_string()))?;

        let filter = SearchFilter::for_files(file_names.to_vec(), owner_id.map(str::to_string));

        let hits = self
            .vector_store
            .search(&self.collection, &query_vector, &filter, top_k)
            .await
            .map_err(|e| SearchServiceError::VectorStoreError(e.to_string()))?;

        let total_hits = hits.len();
        let passages: Vec<RetrievedPassage> = hits
            .into_iter()
            .filter_map(|hit| {
                hit.text.map(|text| RetrievedPassage {
                    text,
                    score: hit.score,
                    file_name: hit.file_name,
                })
            })
            .collect();

        debug!(
            "Retrieved {} passages ({} hits) across {} files",
            passages.len(),
            total_hits,
            file_names.len()
        );

        Ok(passages)
    }
}
