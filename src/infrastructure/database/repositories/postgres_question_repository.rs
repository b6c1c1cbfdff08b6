use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Exchange;
use crate::domain::repositories::{QuestionRepository, question_repository::QuestionRepositoryError};
use crate::infrastructure::database::models::{NewQuestionModel, QuestionModel};
use crate::infrastructure::database::schema::questions::dsl::*;
use crate::infrastructure::database::{DbPool, with_connection};

pub struct PostgresQuestionRepository {
    pool: DbPool,
}

impl PostgresQuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionRepository for PostgresQuestionRepository {
    async fn insert(&self, exchange: &Exchange) -> Result<Uuid, QuestionRepositoryError> {
        let new_question = NewQuestionModel::from(exchange);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(questions)
                .values(&new_question)
                .returning(id)
                .get_result::<Uuid>(conn)
        })
        .await
        .map_err(|e| QuestionRepositoryError::DatabaseError(e.to_string()))
    }

    async fn attach_answer(
        &self,
        question_id: Uuid,
        answer: &str,
    ) -> Result<(), QuestionRepositoryError> {
        let answer = answer.to_string();

        // Only an unanswered row is updated; a zero count is then told apart
        // from a missing row with a second lookup.
        let (updated, exists) = with_connection(&self.pool, move |conn| {
            let updated = diesel::update(
                questions
                    .filter(id.eq(question_id))
                    .filter(response.is_null()),
            )
            .set((response.eq(Some(answer)), answered_at.eq(Some(Utc::now()))))
            .execute(conn)?;

            if updated > 0 {
                return Ok((updated, true));
            }

            let exists = questions
                .filter(id.eq(question_id))
                .count()
                .get_result::<i64>(conn)?
                > 0;
            Ok((updated, exists))
        })
        .await
        .map_err(|e| QuestionRepositoryError::DatabaseError(e.to_string()))?;

        match (updated, exists) {
            (0, true) => Err(QuestionRepositoryError::AlreadyAnswered(question_id)),
            (0, false) => Err(QuestionRepositoryError::NotFound(question_id)),
            _ => Ok(()),
        }
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Exchange>, QuestionRepositoryError> {
        let owner = owner.to_string();

        let models = with_connection(&self.pool, move |conn| {
            questions
                .filter(owner_id.eq(owner))
                .order(created_at.desc())
                .select(QuestionModel::as_select())
                .load(conn)
        })
        .await
        .map_err(|e| QuestionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Exchange::from).collect())
    }

    async fn find_by_chat_space(
        &self,
        owner: &str,
        space: &str,
    ) -> Result<Vec<Exchange>, QuestionRepositoryError> {
        let owner = owner.to_string();
        let space = space.to_string();

        let models = with_connection(&self.pool, move |conn| {
            questions
                .filter(owner_id.eq(owner))
                .filter(chat_space.eq(space))
                .order(created_at.desc())
                .select(QuestionModel::as_select())
                .load(conn)
        })
        .await
        .map_err(|e| QuestionRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Exchange::from).collect())
    }

    async fn delete_by_chat_space(
        &self,
        owner: &str,
        space: &str,
    ) -> Result<usize, QuestionRepositoryError> {
        let owner = owner.to_string();
        let space = space.to_string();

        with_connection(&self.pool, move |conn| {
            diesel::delete(
                questions
                    .filter(owner_id.eq(owner))
                    .filter(chat_space.eq(space)),
            )
            .execute(conn)
        })
        .await
        .map_err(|e| QuestionRepositoryError::DatabaseError(e.to_string()))
    }
}
