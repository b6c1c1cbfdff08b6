use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::generation_service::Answer;
use crate::application::services::search_service::RetrievedPassage;
use crate::domain::entities::Exchange;

#[derive(Debug, Deserialize)]
pub struct AskRequestDto {
    pub question: String,
    #[serde(default)]
    pub file_names: Vec<String>,
    pub chat_space: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponseDto {
    pub question_id: Uuid,
    pub answer: String,
    pub context: Vec<RetrievedPassage>,
}

impl From<Answer> for AnswerResponseDto {
    fn from(answer: Answer) -> Self {
        Self {
            question_id: answer.question_id,
            answer: answer.text,
            context: answer.context,
        }
    }
}

/// Handed back with a `PARTIALLY_RECORDED` error so the answer is not lost.
#[derive(Debug, Serialize)]
pub struct UnsavedAnswerDto {
    pub question_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ExchangeDto {
    pub id: Uuid,
    pub chat_space: String,
    pub question: String,
    pub response: Option<String>,
    pub created_at: String,
    pub answered_at: Option<String>,
}

impl From<Exchange> for ExchangeDto {
    fn from(exchange: Exchange) -> Self {
        Self {
            id: exchange.id(),
            chat_space: exchange.chat_space().to_string(),
            question: exchange.question().to_string(),
            response: exchange.response().map(|s| s.to_string()),
            created_at: exchange.created_at().to_rfc3339(),
            answered_at: exchange.answered_at().map(|at| at.to_rfc3339()),
        }
    }
}
