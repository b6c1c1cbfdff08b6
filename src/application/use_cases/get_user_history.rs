use std::sync::Arc;

use crate::domain::entities::Exchange;
use crate::domain::repositories::{QuestionRepository, question_repository::QuestionRepositoryError};

#[derive(Debug)]
pub enum GetUserHistoryError {
    RepositoryError(String),
}

impl std::fmt::Display for GetUserHistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetUserHistoryError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GetUserHistoryError {}

impl From<QuestionRepositoryError> for GetUserHistoryError {
    fn from(error: QuestionRepositoryError) -> Self {
        GetUserHistoryError::RepositoryError(error.to_string())
    }
}

/// Exchanges come back newest first.
pub struct GetUserHistoryUseCase {
    question_repository: Arc<dyn QuestionRepository>,
}

impl GetUserHistoryUseCase {
    pub fn new(question_repository: Arc<dyn QuestionRepository>) -> Self {
        Self {
            question_repository,
        }
    }

    pub async fn history(&self, owner_id: &str) -> Result<Vec<Exchange>, GetUserHistoryError> {
        let exchanges = self.question_repository.find_by_owner(owner_id).await?;
        Ok(newest_first(exchanges))
    }

    pub async fn chat(
        &self,
        owner_id: &str,
        chat_space: &str,
    ) -> Result<Vec<Exchange>, GetUserHistoryError> {
        let exchanges = self
            .question_repository
            .find_by_chat_space(owner_id, chat_space)
            .await?;
        Ok(newest_first(exchanges))
    }
}

fn newest_first(mut exchanges: Vec<Exchange>) -> Vec<Exchange> {
    exchanges.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    exchanges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::InMemoryQuestionRepository;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn exchange(owner_id: &str, chat_space: &str, question: &str, age_minutes: i64) -> Exchange {
        Exchange::restore(
            Uuid::new_v4(),
            owner_id.to_string(),
            chat_space.to_string(),
            question.to_string(),
            None,
            Utc::now() - Duration::minutes(age_minutes),
            None,
        )
    }

    fn seeded() -> Arc<InMemoryQuestionRepository> {
        let questions = Arc::new(InMemoryQuestionRepository::default());
        questions.seed(exchange("user-1", "space-1", "oldest", 30));
        questions.seed(exchange("user-1", "space-2", "newest", 1));
        questions.seed(exchange("user-1", "space-1", "middle", 10));
        questions.seed(exchange("user-2", "space-1", "foreign", 5));
        questions
    }

    #[tokio::test]
    async fn test_history_is_owner_scoped_and_newest_first() {
        let history = GetUserHistoryUseCase::new(seeded())
            .history("user-1")
            .await
            .unwrap();

        let questions: Vec<&str> = history.iter().map(|e| e.question()).collect();
        assert_eq!(questions, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_chat_is_restricted_to_one_chat_space() {
        let chat = GetUserHistoryUseCase::new(seeded())
            .chat("user-1", "space-1")
            .await
            .unwrap();

        let questions: Vec<&str> = chat.iter().map(|e| e.question()).collect();
        assert_eq!(questions, vec!["middle", "oldest"]);
    }
}
