use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BLOB_PREFIX: &str = "user_docs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: Uuid,
    owner_id: String,
    name: String,
    size: i64,
    media_type: String,
    created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(owner_id: String, name: String, size: i64, media_type: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            size,
            media_type,
            created_at: Utc::now(),
        }
    }

    /// Rebuilds a document that already exists in the metadata store.
    pub fn restore(
        id: Uuid,
        owner_id: String,
        name: String,
        size: i64,
        media_type: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            size,
            media_type,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn blob_key(&self) -> String {
        Self::blob_key_for(self.id)
    }

    pub fn blob_key_for(document_id: Uuid) -> String {
        format!("{}/{}", BLOB_PREFIX, document_id)
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let document = Document::new(
            "user-1".to_string(),
            "notes.txt".to_string(),
            1024,
            "text/plain".to_string(),
        );

        assert_eq!(document.name(), "notes.txt");
        assert_eq!(document.size(), 1024);
        assert!(document.is_owned_by("user-1"));
        assert!(!document.is_owned_by("user-2"));
    }

    #[test]
    fn test_blob_key_is_derived_from_id() {
        let document = Document::new(
            "user-1".to_string(),
            "a.pdf".to_string(),
            10,
            "application/pdf".to_string(),
        );

        assert_eq!(document.blob_key(), format!("user_docs/{}", document.id()));
    }
}
