use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Exchange;
use crate::infrastructure::database::schema::questions;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuestionModel {
    pub id: Uuid,
    pub owner_id: String,
    pub chat_space: String,
    pub question: String,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewQuestionModel {
    pub id: Uuid,
    pub owner_id: String,
    pub chat_space: String,
    pub question: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Exchange> for NewQuestionModel {
    fn from(exchange: &Exchange) -> Self {
        Self {
            id: exchange.id(),
            owner_id: exchange.owner_id().to_string(),
            chat_space: exchange.chat_space().to_string(),
            question: exchange.question().to_string(),
            created_at: exchange.created_at(),
        }
    }
}

impl From<QuestionModel> for Exchange {
    fn from(model: QuestionModel) -> Self {
        Exchange::restore(
            model.id,
            model.owner_id,
            model.chat_space,
            model.question,
            model.response,
            model.created_at,
            model.answered_at,
        )
    }
}
