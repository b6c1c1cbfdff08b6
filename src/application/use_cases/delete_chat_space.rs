use std::sync::Arc;
use tracing::info;

use crate::domain::repositories::{QuestionRepository, question_repository::QuestionRepositoryError};

#[derive(Debug)]
pub enum DeleteChatSpaceError {
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for DeleteChatSpaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteChatSpaceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            DeleteChatSpaceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DeleteChatSpaceError {}

impl From<QuestionRepositoryError> for DeleteChatSpaceError {
    fn from(error: QuestionRepositoryError) -> Self {
        DeleteChatSpaceError::RepositoryError(error.to_string())
    }
}

pub struct DeleteChatSpaceUseCase {
    question_repository: Arc<dyn QuestionRepository>,
}

impl DeleteChatSpaceUseCase {
    pub fn new(question_repository: Arc<dyn QuestionRepository>) -> Self {
        Self {
            question_repository,
        }
    }

    /// Returns how many exchanges were removed. An unknown chat space is
    /// not an error.
    pub async fn execute(
        &self,
        owner_id: &str,
        chat_space: &str,
    ) -> Result<usize, DeleteChatSpaceError> {
        if chat_space.trim().is_empty() {
            return Err(DeleteChatSpaceError::ValidationError(
                "Chat space cannot be empty".to_string(),
            ));
        }

        let deleted = self
            .question_repository
            .delete_by_chat_space(owner_id, chat_space)
            .await?;

        info!("Deleted {} exchanges from chat space {}", deleted, chat_space);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::InMemoryQuestionRepository;
    use crate::domain::entities::Exchange;

    fn exchange(owner_id: &str, chat_space: &str) -> Exchange {
        Exchange::new(
            owner_id.to_string(),
            chat_space.to_string(),
            "question".to_string(),
        )
    }

    #[tokio::test]
    async fn test_deletes_only_the_owners_chat_space() {
        let questions = Arc::new(InMemoryQuestionRepository::default());
        questions.seed(exchange("user-1", "space-1"));
        questions.seed(exchange("user-1", "space-1"));
        questions.seed(exchange("user-1", "space-2"));
        questions.seed(exchange("user-2", "space-1"));

        let deleted = DeleteChatSpaceUseCase::new(questions.clone())
            .execute("user-1", "space-1")
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(questions.all().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_chat_space_is_rejected() {
        let questions = Arc::new(InMemoryQuestionRepository::default());

        let error = DeleteChatSpaceUseCase::new(questions)
            .execute("user-1", "  ")
            .await
            .unwrap_err();

        assert!(matches!(error, DeleteChatSpaceError::ValidationError(_)));
    }
}
