use std::sync::Arc;

use crate::application::services::SearchService;
use crate::application::services::search_service::RetrievedPassage;

#[derive(Debug)]
pub enum SemanticSearchError {
    ValidationError(String),
    SearchError(String),
}

impl std::fmt::Display for SemanticSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticSearchError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SemanticSearchError::SearchError(msg) => write!(f, "Search error: {}", msg),
        }
    }
}

impl std::error::Error for SemanticSearchError {}

#[derive(Debug, Clone)]
pub struct SemanticSearchRequest {
    pub question: String,
    pub file_names: Vec<String>,
    pub owner_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SemanticSearchResponse {
    pub question: String,
    pub results: Vec<RetrievedPassage>,
    pub search_time_ms: u64,
}

pub struct SemanticSearchUseCase {
    search_service: Arc<SearchService>,
    default_limit: usize,
}

impl SemanticSearchUseCase {
    pub fn new(search_service: Arc<SearchService>, default_limit: usize) -> Self {
        Self {
            search_service,
            default_limit,
        }
    }

    pub async fn execute(
        &self,
        request: SemanticSearchRequest,
    ) -> Result<SemanticSearchResponse, SemanticSearchError> {
        let start_time = std::time::Instant::now();

        if request.question.trim().is_empty() {
            return Err(SemanticSearchError::ValidationError(
                "Question cannot be empty".to_string(),
            ));
        }

        let limit = request.limit.unwrap_or(self.default_limit);
        if limit == 0 || limit > 100 {
            return Err(SemanticSearchError::ValidationError(
                "Limit must be between 1 and 100".to_string(),
            ));
        }

        // Nothing to search without an allow-list.
        let results = if request.file_names.is_empty() {
            Vec::new()
        } else {
            self.search_service
                .retrieve(
                    &request.question,
                    &request.file_names,
                    Some(request.owner_id.as_str()),
                    limit,
                )
                .await
                .map_err(|e| SemanticSearchError::SearchError(e.to_string()))?
        };

        Ok(SemanticSearchResponse {
            question: request.question,
            results,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
