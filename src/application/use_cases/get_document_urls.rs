use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::BlobStorage;
use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug)]
pub enum GetDocumentUrlsError {
    NotFound(Uuid),
    RepositoryError(String),
    BlobStorageError(String),
}

impl std::fmt::Display for GetDocumentUrlsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetDocumentUrlsError::NotFound(id) => write!(f, "Document not found: {}", id),
            GetDocumentUrlsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            GetDocumentUrlsError::BlobStorageError(msg) => {
                write!(f, "Blob storage error: {}", msg)
            }
        }
    }
}

impl std::error::Error for GetDocumentUrlsError {}

impl From<DocumentRepositoryError> for GetDocumentUrlsError {
    fn from(error: DocumentRepositoryError) -> Self {
        GetDocumentUrlsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentUrl {
    pub document_id: Uuid,
    pub name: String,
    pub url: String,
}

pub struct GetDocumentUrlsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    blob_storage: Arc<dyn BlobStorage>,
}

impl GetDocumentUrlsUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        blob_storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            document_repository,
            blob_storage,
        }
    }

    pub async fn single(
        &self,
        document_id: Uuid,
        owner_id: &str,
    ) -> Result<DocumentUrl, GetDocumentUrlsError> {
        let document = self
            .document_repository
            .find_by_id_for_owner(document_id, owner_id)
            .await?
            .ok_or(GetDocumentUrlsError::NotFound(document_id))?;

        self.url_for(&document)
    }

    pub async fn all(&self, owner_id: &str) -> Result<Vec<DocumentUrl>, GetDocumentUrlsError> {
        self.document_repository
            .find_by_owner(owner_id)
            .await?
            .iter()
            .map(|document| self.url_for(document))
            .collect()
    }

    fn url_for(&self, document: &Document) -> Result<DocumentUrl, GetDocumentUrlsError> {
        let url = self
            .blob_storage
            .public_url(&document.blob_key())
            .map_err(|e| GetDocumentUrlsError::BlobStorageError(e.to_string()))?;

        Ok(DocumentUrl {
            document_id: document.id(),
            name: document.name().to_string(),
            url,
        })
    }
}
