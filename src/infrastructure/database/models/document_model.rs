use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub size: i64,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub size: i64,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for NewDocumentModel {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id(),
            owner_id: document.owner_id().to_string(),
            name: document.name().to_string(),
            size: document.size(),
            media_type: document.media_type().to_string(),
            created_at: document.created_at(),
        }
    }
}

impl From<DocumentModel> for Document {
    fn from(model: DocumentModel) -> Self {
        Document::restore(
            model.id,
            model.owner_id,
            model.name,
            model.size,
            model.media_type,
            model.created_at,
        )
    }
}
