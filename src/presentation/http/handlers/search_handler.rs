use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::ports::AuthProvider;
use crate::application::use_cases::SemanticSearchUseCase;
use crate::application::use_cases::semantic_search::SemanticSearchRequest;
use crate::presentation::http::auth::authenticate;
use crate::presentation::http::dto::{ApiResponse, SearchRequestDto, SearchResponseDto};
use crate::presentation::http::errors::HttpError;

pub struct SearchHandler {
    search_use_case: Arc<SemanticSearchUseCase>,
    auth_provider: Arc<dyn AuthProvider>,
}

impl SearchHandler {
    pub fn new(
        search_use_case: Arc<SemanticSearchUseCase>,
        auth_provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            search_use_case,
            auth_provider,
        }
    }

    pub async fn search(
        State(handler): State<Arc<SearchHandler>>,
        headers: HeaderMap,
        Json(body): Json<SearchRequestDto>,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let request = SemanticSearchRequest {
            question: body.question,
            file_names: body.file_names,
            owner_id,
            limit: body.limit,
        };

        let response = handler.search_use_case.execute(request).await?;

        Ok((
            StatusCode::OK,
            Json(ApiResponse::success(SearchResponseDto::from(response))),
        ))
    }
}
