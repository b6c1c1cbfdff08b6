use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Document;

#[derive(Debug)]
pub enum DocumentRepositoryError {
    NotFound(Uuid),
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for DocumentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRepositoryError::NotFound(id) => write!(f, "Document not found: {}", id),
            DocumentRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            DocumentRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DocumentRepositoryError {}

/// Document metadata rows. Every read and delete is scoped by owner.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Persists the document and returns the id the store assigned to it.
    async fn insert(&self, document: &Document) -> Result<Uuid, DocumentRepositoryError>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Document>, DocumentRepositoryError>;
    async fn find_by_id_for_owner(
        &self,
        id: Uuid,
        owner_id: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError>;
    async fn find_by_ids_for_owner(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<Vec<Document>, DocumentRepositoryError>;
    async fn delete_by_ids_for_owner(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<usize, DocumentRepositoryError>;
}
