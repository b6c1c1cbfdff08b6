use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Exchange;

#[derive(Debug)]
pub enum QuestionRepositoryError {
    NotFound(Uuid),
    AlreadyAnswered(Uuid),
    DatabaseError(String),
}

impl std::fmt::Display for QuestionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionRepositoryError::NotFound(id) => write!(f, "Question not found: {}", id),
            QuestionRepositoryError::AlreadyAnswered(id) => {
                write!(f, "Question {} already has an answer", id)
            }
            QuestionRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for QuestionRepositoryError {}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert(&self, exchange: &Exchange) -> Result<Uuid, QuestionRepositoryError>;
    /// Fails with `AlreadyAnswered` if the exchange has an answer already.
    async fn attach_answer(&self, id: Uuid, answer: &str) -> Result<(), QuestionRepositoryError>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Exchange>, QuestionRepositoryError>;
    async fn find_by_chat_space(
        &self,
        owner_id: &str,
        chat_space: &str,
    ) -> Result<Vec<Exchange>, QuestionRepositoryError>;
    async fn delete_by_chat_space(
        &self,
        owner_id: &str,
        chat_space: &str,
    ) -> Result<usize, QuestionRepositoryError>;
}
