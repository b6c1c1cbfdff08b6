use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::domain::entities::VectorRecord;
use crate::domain::value_objects::EmbeddingVector;

#[derive(Debug)]
pub enum VectorStoreError {
    CollectionSetup(String),
    DimensionMismatch { expected: usize, actual: usize },
    RequestFailed(String),
    InvalidResponse(String),
}

impl fmt::Display for VectorStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorStoreError::CollectionSetup(msg) => {
                write!(f, "Collection setup failed: {}", msg)
            }
            VectorStoreError::DimensionMismatch { expected, actual } => write!(
                f,
                "Vector dimension mismatch: expected {}, got {}",
                expected, actual
            ),
            VectorStoreError::RequestFailed(msg) => write!(f, "Vector store request failed: {}", msg),
            VectorStoreError::InvalidResponse(msg) => {
                write!(f, "Invalid vector store response: {}", msg)
            }
        }
    }
}

impl std::error::Error for VectorStoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    Cosine,
    Dot,
    Euclid,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::Dot => "Dot",
            DistanceMetric::Euclid => "Euclid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    Created,
    AlreadyExists,
}

/// Status reported by the store for a write. Only `Completed` means the
/// points are durable and searchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertStatus {
    Completed,
    Acknowledged,
    Other(String),
}

impl UpsertStatus {
    pub fn from_status(status: &str) -> Self {
        match status {
            "completed" => UpsertStatus::Completed,
            "acknowledged" => UpsertStatus::Acknowledged,
            other => UpsertStatus::Other(other.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, UpsertStatus::Completed)
    }
}

impl fmt::Display for UpsertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertStatus::Completed => f.write_str("completed"),
            UpsertStatus::Acknowledged => f.write_str("acknowledged"),
            UpsertStatus::Other(status) => f.write_str(status),
        }
    }
}

/// Restricts a query to points whose `file_name` is any of `file_names` and,
/// when set, whose `owner_id` matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub file_names: Vec<String>,
    pub owner_id: Option<String>,
}

impl SearchFilter {
    pub fn for_files(file_names: Vec<String>, owner_id: Option<String>) -> Self {
        Self {
            file_names,
            owner_id,
        }
    }
}

/// Selects every point written for one of `document_ids`, scoped to
/// `owner_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFilter {
    pub document_ids: Vec<Uuid>,
    pub owner_id: String,
}

impl DocumentFilter {
    pub fn new(document_ids: Vec<Uuid>, owner_id: impl Into<String>) -> Self {
        Self {
            document_ids,
            owner_id: owner_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub file_name: Option<String>,
    pub text: Option<String>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Idempotent: an existing collection yields `AlreadyExists` after its
    /// dimensionality has been checked against `dimension`.
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> Result<CollectionStatus, VectorStoreError>;

    async fn upsert(
        &self,
        collection: &str,
        records: &[VectorRecord],
    ) -> Result<UpsertStatus, VectorStoreError>;

    /// Hits ordered by descending similarity, at most `limit` of them.
    async fn search(
        &self,
        collection: &str,
        query: &EmbeddingVector,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError>;

    async fn delete(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<(), VectorStoreError>;
}
