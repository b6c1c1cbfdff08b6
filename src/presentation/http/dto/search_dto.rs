use serde::{Deserialize, Serialize};

use crate::application::services::search_service::RetrievedPassage;
use crate::application::use_cases::semantic_search::SemanticSearchResponse;

#[derive(Debug, Deserialize)]
pub struct SearchRequestDto {
    pub question: String,
    #[serde(default)]
    pub file_names: Vec<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseDto {
    pub question: String,
    pub results: Vec<SearchResultDto>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub text: String,
    pub score: String,
    pub file_name: Option<String>,
}

impl From<SemanticSearchResponse> for SearchResponseDto {
    fn from(response: SemanticSearchResponse) -> Self {
        Self {
            question: response.question,
            total_results: response.results.len(),
            results: response.results.into_iter().map(SearchResultDto::from).collect(),
            search_time_ms: response.search_time_ms,
        }
    }
}

impl From<RetrievedPassage> for SearchResultDto {
    fn from(passage: RetrievedPassage) -> Self {
        Self {
            text: passage.text,
            score: passage.score.to_string(),
            file_name: passage.file_name,
        }
    }
}
