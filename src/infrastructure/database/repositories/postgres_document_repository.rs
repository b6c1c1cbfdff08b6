use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::documents::dsl::*;
use crate::infrastructure::database::{DbPool, with_connection};

pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<Uuid, DocumentRepositoryError> {
        let new_document = NewDocumentModel::from(document);

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(documents)
                .values(&new_document)
                .returning(id)
                .get_result::<Uuid>(conn)
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Document>, DocumentRepositoryError> {
        let owner = owner.to_string();

        let models = with_connection(&self.pool, move |conn| {
            documents
                .filter(owner_id.eq(owner))
                .order(created_at.desc())
                .select(DocumentModel::as_select())
                .load(conn)
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Document::from).collect())
    }

    async fn find_by_id_for_owner(
        &self,
        document_id: Uuid,
        owner: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let owner = owner.to_string();

        let model = with_connection(&self.pool, move |conn| {
            documents
                .filter(id.eq(document_id))
                .filter(owner_id.eq(owner))
                .select(DocumentModel::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(model.map(Document::from))
    }

    async fn find_by_ids_for_owner(
        &self,
        ids: &[Uuid],
        owner: &str,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let ids = ids.to_vec();
        let owner = owner.to_string();

        let models = with_connection(&self.pool, move |conn| {
            documents
                .filter(id.eq_any(ids))
                .filter(owner_id.eq(owner))
                .select(DocumentModel::as_select())
                .load(conn)
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Document::from).collect())
    }

    async fn delete_by_ids_for_owner(
        &self,
        ids: &[Uuid],
        owner: &str,
    ) -> Result<usize, DocumentRepositoryError> {
        let ids = ids.to_vec();
        let owner = owner.to_string();

        with_connection(&self.pool, move |conn| {
            diesel::delete(documents.filter(id.eq_any(ids)).filter(owner_id.eq(owner)))
                .execute(conn)
        })
        .await
        .map_err(|e| DocumentRepositoryError::DatabaseError(e.to_string()))
    }
}
