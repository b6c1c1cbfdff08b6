use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::EmbeddingVector;

/// Payload stored next to every vector. `text` is the exact chunk that was
/// embedded; `document_id` ties the point to its metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPayload {
    pub document_id: Uuid,
    pub file_name: String,
    pub text: String,
    pub owner_id: String,
    pub embedding_model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    id: Uuid,
    vector: EmbeddingVector,
    payload: VectorPayload,
}

impl VectorRecord {
    pub fn new(vector: EmbeddingVector, payload: VectorPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn vector(&self) -> &EmbeddingVector {
        &self.vector
    }

    pub fn payload(&self) -> &VectorPayload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &str) -> VectorPayload {
        VectorPayload {
            document_id: Uuid::nil(),
            file_name: "a.pdf".to_string(),
            text: text.to_string(),
            owner_id: "user-1".to_string(),
            embedding_model: "test-model".to_string(),
        }
    }

    #[test]
    fn test_records_get_unique_ids() {
        let first = VectorRecord::new(EmbeddingVector::from(vec![1.0]), payload("one"));
        let second = VectorRecord::new(EmbeddingVector::from(vec![1.0]), payload("one"));

        assert_ne!(first.id(), second.id());
        assert_eq!(first.payload(), second.payload());
    }
}
