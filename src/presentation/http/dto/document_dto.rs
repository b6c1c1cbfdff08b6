use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::ingestion_service::{
    BatchFailure, BatchIngested, IngestedDocument,
};
use crate::application::use_cases::delete_documents::DeleteDocumentsResponse;
use crate::domain::entities::Document;

#[derive(Debug, Serialize)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub media_type: String,
    pub created_at: String,
}

impl From<Document> for DocumentResponseDto {
    fn from(document: Document) -> Self {
        Self {
            id: document.id(),
            name: document.name().to_string(),
            size: document.size(),
            media_type: document.media_type().to_string(),
            created_at: document.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestResponseDto {
    pub documents: Vec<IngestedDocument>,
}

/// Returned alongside the error when a batch stops part way.
#[derive(Debug, Serialize)]
pub struct BatchFailureDto {
    pub failed_index: usize,
    pub failed_file: String,
    pub ingested: Vec<BatchIngested>,
    pub other_failures: Vec<BatchFileErrorDto>,
}

#[derive(Debug, Serialize)]
pub struct BatchFileErrorDto {
    pub index: usize,
    pub file_name: String,
    pub message: String,
    pub partial: bool,
}

impl From<BatchFailure> for BatchFileErrorDto {
    fn from(failure: BatchFailure) -> Self {
        Self {
            index: failure.index,
            file_name: failure.file_name,
            message: failure.error.to_string(),
            partial: failure.error.is_partial(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteDocumentsRequestDto {
    pub document_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentsResponseDto {
    pub deleted_documents: usize,
    pub removed_blobs: usize,
}

impl From<DeleteDocumentsResponse> for DeleteDocumentsResponseDto {
    fn from(response: DeleteDocumentsResponse) -> Self {
        Self {
            deleted_documents: response.deleted_documents,
            removed_blobs: response.removed_blobs,
        }
    }
}
