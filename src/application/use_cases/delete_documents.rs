use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::application::ports::vector_store::DocumentFilter;
use crate::application::ports::{BlobStorage, VectorStore};
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug)]
pub enum DeleteDocumentsError {
    ValidationError(String),
    NotFound,
    VectorStoreError(String),
    BlobStorageError(String),
    RepositoryError(String),
}

impl std::fmt::Display for DeleteDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteDocumentsError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            DeleteDocumentsError::NotFound => write!(f, "No matching documents found"),
            DeleteDocumentsError::VectorStoreError(msg) => write!(f, "Vector store error: {}", msg),
            DeleteDocumentsError::BlobStorageError(msg) => write!(f, "Blob storage error: {}", msg),
            DeleteDocumentsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DeleteDocumentsError {}

impl From<DocumentRepositoryError> for DeleteDocumentsError {
    fn from(error: DocumentRepositoryError) -> Self {
        DeleteDocumentsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DeleteDocumentsRequest {
    pub document_ids: Vec<Uuid>,
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteDocumentsResponse {
    pub deleted_documents: usize,
    pub removed_blobs: usize,
}

/// Vectors go first, then blobs, then metadata rows. A failure part way
/// leaves the rows in place so the same request can be retried.
pub struct DeleteDocumentsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    vector_store: Arc<dyn VectorStore>,
    blob_storage: Arc<dyn BlobStorage>,
    collection: String,
}

impl DeleteDocumentsUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        vector_store: Arc<dyn VectorStore>,
        blob_storage: Arc<dyn BlobStorage>,
        collection: String,
    ) -> Self {
        Self {
            document_repository,
            vector_store,
            blob_storage,
            collection,
        }
    }

    pub async fn execute(
        &self,
        request: DeleteDocumentsRequest,
    ) -> Result<DeleteDocumentsResponse, DeleteDocumentsError> {
        if request.document_ids.is_empty() {
            return Err(DeleteDocumentsError::ValidationError(
                "At least one document id is required".to_string(),
            ));
        }

        let documents = self
            .document_repository
            .find_by_ids_for_owner(&request.document_ids, &request.owner_id)
            .await?;

        if documents.is_empty() {
            return Err(DeleteDocumentsError::NotFound);
        }

        let ids: Vec<Uuid> = documents.iter().map(|document| document.id()).collect();

        self.vector_store
            .delete(
                &self.collection,
                &DocumentFilter::new(ids.clone(), request.owner_id.clone()),
            )
            .await
            .map_err(|e| DeleteDocumentsError::VectorStoreError(e.to_string()))?;

        let blob_keys: Vec<String> = documents.iter().map(|document| document.blob_key()).collect();
        let removed_blobs = self
            .blob_storage
            .remove(&blob_keys)
            .await
            .map_err(|e| DeleteDocumentsError::BlobStorageError(e.to_string()))?;

        let deleted_documents = self
            .document_repository
            .delete_by_ids_for_owner(&ids, &request.owner_id)
            .await?;

        info!(
            "Deleted {} documents ({} blobs) for {}",
            deleted_documents, removed_blobs, request.owner_id
        );

        Ok(DeleteDocumentsResponse {
            deleted_documents,
            removed_blobs,
        })
    }
}
