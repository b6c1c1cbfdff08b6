use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::ports::blob_storage::{BlobStorage, BlobUploadOptions};
use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::application::ports::vector_store::VectorStore;
use crate::application::services::{EmbeddingService, TextChunker};
use crate::domain::entities::{Document, VectorPayload, VectorRecord};
use crate::domain::repositories::DocumentRepository;
use crate::domain::value_objects::MediaType;

/// Why a single file did not make it through ingestion. The first four
/// variants leave no trace in any store; the last two are partial outcomes
/// where vectors (and possibly the metadata row) were already written.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestionError {
    UnsupportedType(String),
    ExtractionFailed(String),
    EmbeddingFailed(String),
    EmbeddingsNotStored(String),
    MetadataNotRecorded { file_name: String, reason: String },
    BlobNotStored { document_id: Uuid, reason: String },
}

impl IngestionError {
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            IngestionError::MetadataNotRecorded { .. } | IngestionError::BlobNotStored { .. }
        )
    }

    /// Safe to resubmit the same file: nothing was written anywhere.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IngestionError::EmbeddingFailed(_) | IngestionError::EmbeddingsNotStored(_)
        )
    }
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::UnsupportedType(media_type) => {
                write!(f, "Unsupported file type: {}", media_type)
            }
            IngestionError::ExtractionFailed(msg) => write!(f, "Extraction failed: {}", msg),
            IngestionError::EmbeddingFailed(msg) => write!(f, "Embedding failed: {}", msg),
            IngestionError::EmbeddingsNotStored(msg) => {
                write!(f, "Embeddings not stored: {}", msg)
            }
            IngestionError::MetadataNotRecorded { file_name, reason } => write!(
                f,
                "Embeddings for {} were stored but the document record was not: {}",
                file_name, reason
            ),
            IngestionError::BlobNotStored {
                document_id,
                reason,
            } => write!(
                f,
                "Document {} was recorded but its original bytes were not uploaded: {}",
                document_id, reason
            ),
        }
    }
}

impl std::error::Error for IngestionError {}

impl From<DocumentExtractionError> for IngestionError {
    fn from(error: DocumentExtractionError) -> Self {
        match error {
            DocumentExtractionError::UnsupportedFormat(media_type) => {
                IngestionError::UnsupportedType(media_type)
            }
            DocumentExtractionError::ExtractionFailed(msg) => IngestionError::ExtractionFailed(msg),
        }
    }
}

/// A batch stopped at `index`, its lowest failing file. Every file that
/// had started by then was allowed to finish: `ingested` lists all of them
/// that succeeded and `other_failures` every other file that failed, so
/// partial writes are never hidden. Files never started were not touched.
#[derive(Debug, Clone)]
pub struct BatchIngestionError {
    pub index: usize,
    pub file_name: String,
    pub error: IngestionError,
    pub ingested: Vec<BatchIngested>,
    pub other_failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchIngested {
    pub index: usize,
    #[serde(flatten)]
    pub document: IngestedDocument,
}

#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub index: usize,
    pub file_name: String,
    pub error: IngestionError,
}

impl std::fmt::Display for BatchIngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "File #{} ({}) failed after {} file(s) were ingested: {}",
            self.index,
            self.file_name,
            self.ingested.len(),
            self.error
        )
    }
}

impl std::error::Error for BatchIngestionError {}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedDocument {
    pub document_id: Uuid,
    pub file_name: String,
    pub chunk_count: usize,
    pub blob_key: String,
}

pub struct IngestionService {
    document_extractor: Arc<dyn DocumentExtractor>,
    embedding_service: Arc<EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    document_repository: Arc<dyn DocumentRepository>,
    blob_storage: Arc<dyn BlobStorage>,
    chunker: TextChunker,
    collection: String,
    concurrency: usize,
}

impl IngestionService {
    pub fn new(
        document_extractor: Arc<dyn DocumentExtractor>,
        embedding_service: Arc<EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        document_repository: Arc<dyn DocumentRepository>,
        blob_storage: Arc<dyn BlobStorage>,
        collection: String,
    ) -> Self {
        Self {
            document_extractor,
            embedding_service,
            vector_store,
            document_repository,
            blob_storage,
            chunker: TextChunker::default(),
            collection,
            concurrency: 1,
        }
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// extract → chunk → embed → upsert → record metadata → upload bytes,
    /// stopping at the first failing step.
    pub async fn ingest(
        &self,
        file: &UploadedFile,
        owner_id: &str,
    ) -> Result<IngestedDocument, IngestionError> {
        let media_type = MediaType::parse(&file.media_type);
        info!(
            "Ingesting {} ({}, {} bytes)",
            file.file_name,
            media_type,
            file.data.len()
        );

        let text = self
            .document_extractor
            .extract_text_from_bytes(&file.data, &media_type)
            .await
            .map_err(|e| {
                warn!("Extraction of {} failed: {}", file.file_name, e);
                IngestionError::from(e)
            })?;

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(IngestionError::ExtractionFailed(format!(
                "No text could be extracted from {}",
                file.file_name
            )));
        }

        let vectors = self
            .embedding_service
            .embed_batch(&chunks)
            .await
            .map_err(|e| IngestionError::EmbeddingFailed(e.to_string()))?;

        let document = Document::new(
            owner_id.to_string(),
            file.file_name.clone(),
            file.data.len() as i64,
            media_type.as_str().to_string(),
        );

        let chunk_count = chunks.len();
        let embedding_model = self.embedding_service.model_name().to_string();
        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| {
                VectorRecord::new(
                    vector,
                    VectorPayload {
                        document_id: document.id(),
                        file_name: file.file_name.clone(),
                        text,
                        owner_id: owner_id.to_string(),
                        embedding_model: embedding_model.clone(),
                    },
                )
            })
            .collect();

        let status = self
            .vector_store
            .upsert(&self.collection, &records)
            .await
            .map_err(|e| IngestionError::EmbeddingsNotStored(e.to_string()))?;

        if !status.is_completed() {
            return Err(IngestionError::EmbeddingsNotStored(format!(
                "vector store reported status '{}'",
                status
            )));
        }

        let document_id = self
            .document_repository
            .insert(&document)
            .await
            .map_err(|e| {
                error!(
                    "{} chunks of {} are stored without a document record: {}",
                    chunk_count, file.file_name, e
                );
                IngestionError::MetadataNotRecorded {
                    file_name: file.file_name.clone(),
                    reason: e.to_string(),
                }
            })?;

        let blob_key = Document::blob_key_for(document_id);
        self.blob_storage
            .upload(&blob_key, &file.data, &BlobUploadOptions::new(media_type.as_str()))
            .await
            .map_err(|e| {
                error!(
                    "Document {} ({}) is recorded but its bytes were not uploaded: {}",
                    document_id, file.file_name, e
                );
                IngestionError::BlobNotStored {
                    document_id,
                    reason: e.to_string(),
                }
            })?;

        info!(
            "Ingested {} as document {} with {} chunks",
            file.file_name, document_id, chunk_count
        );

        Ok(IngestedDocument {
            document_id,
            file_name: file.file_name.clone(),
            chunk_count,
            blob_key,
        })
    }

    /// Runs up to `concurrency` files at once. After the first failure no
    /// new file is started, but the ones in flight are drained so their
    /// outcome is reported. Successes come back in input order.
    pub async fn ingest_many(
        &self,
        files: &[UploadedFile],
        owner_id: &str,
    ) -> Result<Vec<IngestedDocument>, BatchIngestionError> {
        let mut queued = files.iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut ingested = Vec::with_capacity(files.len());
        let mut failures: Vec<BatchFailure> = Vec::new();

        loop {
            while failures.is_empty() && in_flight.len() < self.concurrency {
                let Some((index, file)) = queued.next() else {
                    break;
                };
                in_flight.push(async move { (index, self.ingest(file, owner_id).await) });
            }

            let Some((index, result)) = in_flight.next().await else {
                break;
            };
            match result {
                Ok(document) => ingested.push(BatchIngested { index, document }),
                Err(error) => {
                    if failures.is_empty() && !in_flight.is_empty() {
                        warn!(
                            "File #{} failed; waiting for {} file(s) still in flight",
                            index,
                            in_flight.len()
                        );
                    }
                    failures.push(BatchFailure {
                        index,
                        file_name: files[index].file_name.clone(),
                        error,
                    });
                }
            }
        }

        ingested.sort_by_key(|item| item.index);
        if failures.is_empty() {
            return Ok(ingested.into_iter().map(|item| item.document).collect());
        }

        failures.sort_by_key(|failure| failure.index);
        let first = failures.remove(0);
        error!(
            "Batch ingestion stopped at file #{} ({}) with {} successes and {} other failures: {}",
            first.index,
            first.file_name,
            ingested.len(),
            failures.len(),
            first.error
        );

        Err(BatchIngestionError {
            index: first.index,
            file_name: first.file_name,
            error: first.error,
            ingested,
            other_failures: failures,
        })
    }
}
