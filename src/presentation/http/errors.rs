use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::application::ports::auth_provider::AuthError;
use crate::application::services::generation_service::AnswerError;
use crate::application::services::ingestion_service::{BatchIngestionError, IngestionError};
use crate::application::use_cases::delete_chat_space::DeleteChatSpaceError;
use crate::application::use_cases::delete_documents::DeleteDocumentsError;
use crate::application::use_cases::get_document_urls::GetDocumentUrlsError;
use crate::application::use_cases::get_user_history::GetUserHistoryError;
use crate::application::use_cases::list_user_documents::ListUserDocumentsError;
use crate::application::use_cases::semantic_search::SemanticSearchError;
use crate::presentation::http::dto::{
    ApiResponse, BatchFailureDto, BatchFileErrorDto, UnsavedAnswerDto,
};

pub const PARTIALLY_RECORDED: &str = "PARTIALLY_RECORDED";

/// A failed request, rendered as an `ApiResponse` envelope.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
    pub data: Option<Value>,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            data: None,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let code = self.code.to_string();
        match self.data {
            Some(data) => (
                self.status,
                Json(ApiResponse::partial(data, code, self.message, self.details)),
            )
                .into_response(),
            None => (
                self.status,
                Json(ApiResponse::<()>::error(code, self.message, self.details)),
            )
                .into_response(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::ProviderUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_UNAVAILABLE",
                error.to_string(),
            ),
            _ => Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", error.to_string()),
        }
    }
}

impl From<IngestionError> for HttpError {
    fn from(error: IngestionError) -> Self {
        let (status, code) = match &error {
            IngestionError::UnsupportedType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FILE_TYPE")
            }
            IngestionError::ExtractionFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED")
            }
            IngestionError::EmbeddingFailed(_) => (StatusCode::BAD_GATEWAY, "EMBEDDING_FAILED"),
            IngestionError::EmbeddingsNotStored(_) => {
                (StatusCode::BAD_GATEWAY, "VECTOR_STORE_FAILED")
            }
            IngestionError::MetadataNotRecorded { .. } | IngestionError::BlobNotStored { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, PARTIALLY_RECORDED)
            }
        };
        Self::new(status, code, error.to_string())
    }
}

impl From<BatchIngestionError> for HttpError {
    fn from(error: BatchIngestionError) -> Self {
        let details = format!("file #{} ({})", error.index, error.file_name);
        // A partial write anywhere in the batch outranks a clean failure.
        let headline = match error
            .other_failures
            .iter()
            .find(|failure| failure.error.is_partial())
        {
            Some(partial) if !error.error.is_partial() => partial.error.clone(),
            _ => error.error,
        };
        let failure = BatchFailureDto {
            failed_index: error.index,
            failed_file: error.file_name,
            ingested: error.ingested,
            other_failures: error
                .other_failures
                .into_iter()
                .map(BatchFileErrorDto::from)
                .collect(),
        };
        HttpError::from(headline)
            .with_details(details)
            .with_data(&failure)
    }
}

impl From<AnswerError> for HttpError {
    fn from(error: AnswerError) -> Self {
        let message = error.to_string();
        match error {
            AnswerError::QuestionNotRecorded(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "QUESTION_NOT_RECORDED",
                message,
            ),
            AnswerError::RetrievalFailed(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "RETRIEVAL_FAILED", message)
            }
            AnswerError::GenerationFailed(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "GENERATION_FAILED", message)
            }
            AnswerError::AnswerNotStored {
                question_id,
                answer,
                ..
            } => Self::new(StatusCode::INTERNAL_SERVER_ERROR, PARTIALLY_RECORDED, message)
                .with_data(&UnsavedAnswerDto {
                    question_id,
                    answer,
                }),
        }
    }
}

impl From<SemanticSearchError> for HttpError {
    fn from(error: SemanticSearchError) -> Self {
        match error {
            SemanticSearchError::ValidationError(_) => {
                Self::bad_request("INVALID_SEARCH", error.to_string())
            }
            SemanticSearchError::SearchError(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "SEARCH_FAILED", error.to_string())
            }
        }
    }
}

impl From<DeleteDocumentsError> for HttpError {
    fn from(error: DeleteDocumentsError) -> Self {
        let (status, code) = match &error {
            DeleteDocumentsError::ValidationError(_) => (StatusCode::BAD_REQUEST, "INVALID_DELETE"),
            DeleteDocumentsError::NotFound => (StatusCode::NOT_FOUND, "DOCUMENTS_NOT_FOUND"),
            DeleteDocumentsError::VectorStoreError(_) => {
                (StatusCode::BAD_GATEWAY, "VECTOR_STORE_FAILED")
            }
            DeleteDocumentsError::BlobStorageError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "BLOB_STORAGE_FAILED")
            }
            DeleteDocumentsError::RepositoryError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DELETE_FAILED")
            }
        };
        Self::new(status, code, error.to_string())
    }
}

impl From<DeleteChatSpaceError> for HttpError {
    fn from(error: DeleteChatSpaceError) -> Self {
        match error {
            DeleteChatSpaceError::ValidationError(_) => {
                Self::bad_request("INVALID_CHAT_SPACE", error.to_string())
            }
            DeleteChatSpaceError::RepositoryError(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DELETE_FAILED",
                error.to_string(),
            ),
        }
    }
}

impl From<GetUserHistoryError> for HttpError {
    fn from(error: GetUserHistoryError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "HISTORY_FAILED",
            error.to_string(),
        )
    }
}

impl From<ListUserDocumentsError> for HttpError {
    fn from(error: ListUserDocumentsError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "LIST_FAILED", error.to_string())
    }
}

impl From<GetDocumentUrlsError> for HttpError {
    fn from(error: GetDocumentUrlsError) -> Self {
        let (status, code) = match &error {
            GetDocumentUrlsError::NotFound(_) => (StatusCode::NOT_FOUND, "DOCUMENT_NOT_FOUND"),
            GetDocumentUrlsError::RepositoryError(_) | GetDocumentUrlsError::BlobStorageError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "URL_LOOKUP_FAILED")
            }
        };
        Self::new(status, code, error.to_string())
    }
}
