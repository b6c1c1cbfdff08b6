use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question asked inside a chat space and, once generation has
/// finished, its answer. The answer is attached at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    id: Uuid,
    owner_id: String,
    chat_space: String,
    question: String,
    response: Option<String>,
    created_at: DateTime<Utc>,
    answered_at: Option<DateTime<Utc>>,
}

impl Exchange {
    pub fn new(owner_id: String, chat_space: String, question: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            chat_space,
            question,
            response: None,
            created_at: Utc::now(),
            answered_at: None,
        }
    }

    pub fn restore(
        id: Uuid,
        owner_id: String,
        chat_space: String,
        question: String,
        response: Option<String>,
        created_at: DateTime<Utc>,
        answered_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            owner_id,
            chat_space,
            question,
            response,
            created_at,
            answered_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn chat_space(&self) -> &str {
        &self.chat_space
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn answered_at(&self) -> Option<DateTime<Utc>> {
        self.answered_at
    }

    pub fn is_answered(&self) -> bool {
        self.response.is_some()
    }

    pub fn attach_answer(&mut self, answer: String) -> Result<(), String> {
        if self.is_answered() {
            return Err(format!("Exchange {} already has an answer", self.id));
        }

        self.response = Some(answer);
        self.answered_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_exchange_is_unanswered() {
        let exchange = Exchange::new(
            "user-1".to_string(),
            "space-1".to_string(),
            "What is 2+2?".to_string(),
        );

        assert!(!exchange.is_answered());
        assert_eq!(exchange.response(), None);
        assert_eq!(exchange.answered_at(), None);
    }

    #[test]
    fn test_answer_is_attached_once() {
        let mut exchange = Exchange::new(
            "user-1".to_string(),
            "space-1".to_string(),
            "What is 2+2?".to_string(),
        );

        assert!(exchange.attach_answer("4".to_string()).is_ok());
        assert_eq!(exchange.response(), Some("4"));
        assert!(exchange.answered_at().is_some());

        assert!(exchange.attach_answer("5".to_string()).is_err());
        assert_eq!(exchange.response(), Some("4"));
    }
}
