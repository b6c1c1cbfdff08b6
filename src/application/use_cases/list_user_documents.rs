use std::sync::Arc;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug)]
pub enum ListUserDocumentsError {
    RepositoryError(String),
}

impl std::fmt::Display for ListUserDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListUserDocumentsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ListUserDocumentsError {}

impl From<DocumentRepositoryError> for ListUserDocumentsError {
    fn from(error: DocumentRepositoryError) -> Self {
        ListUserDocumentsError::RepositoryError(error.to_string())
    }
}

pub struct ListUserDocumentsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl ListUserDocumentsUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self {
            document_repository,
        }
    }

    pub async fn execute(&self, owner_id: &str) -> Result<Vec<Document>, ListUserDocumentsError> {
        let mut documents = self.document_repository.find_by_owner(owner_id).await?;
        documents.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::InMemoryDocumentRepository;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_lists_only_the_owners_documents() {
        let documents = Arc::new(InMemoryDocumentRepository::default());
        for (owner, name) in [("user-1", "a.pdf"), ("user-2", "b.pdf"), ("user-1", "c.pdf")] {
            documents
                .insert(&Document::new(
                    owner.to_string(),
                    name.to_string(),
                    1,
                    "application/pdf".to_string(),
                ))
                .await
                .unwrap();
        }

        let listed = ListUserDocumentsUseCase::new(documents)
            .execute("user-1")
            .await
            .unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|document| document.is_owned_by("user-1")));
    }

    #[tokio::test]
    async fn test_repository_errors_are_surfaced() {
        let documents = Arc::new(InMemoryDocumentRepository::default());
        documents.fail.store(true, Ordering::SeqCst);

        let error = ListUserDocumentsUseCase::new(documents)
            .execute("user-1")
            .await
            .unwrap_err();

        assert!(error.to_string().contains("metadata store unavailable"));
    }
}
