//! In-memory stand-ins for every port, used by the service and use-case tests.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::application::ports::auth_provider::{AuthError, AuthProvider};
use crate::application::ports::blob_storage::{BlobStorage, BlobStorageError, BlobUploadOptions};
use crate::application::ports::document_extractor::{DocumentExtractionError, DocumentExtractor};
use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
};
use crate::application::ports::generation_provider::{
    GenerationError, GenerationProvider, TextStream,
};
use crate::application::ports::vector_store::{
    CollectionStatus, DistanceMetric, DocumentFilter, SearchFilter, SearchHit, UpsertStatus,
    VectorStore, VectorStoreError,
};
use crate::domain::entities::{Document, Exchange, VectorRecord};
use crate::domain::repositories::document_repository::{
    DocumentRepository, DocumentRepositoryError,
};
use crate::domain::repositories::question_repository::{
    QuestionRepository, QuestionRepositoryError,
};
use crate::domain::value_objects::{EmbeddingVector, MediaType};

pub const TEST_DIMENSION: usize = 16;
pub const TEST_COLLECTION: &str = "test_docs";

/// Decodes `text/plain` and rejects everything else as unsupported.
#[derive(Default)]
pub struct PlainTextExtractor {
    pub fail: AtomicBool,
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract_text_from_bytes(
        &self,
        data: &[u8],
        media_type: &MediaType,
    ) -> Result<String, DocumentExtractionError> {
        if !self.can_extract(media_type) {
            return Err(DocumentExtractionError::UnsupportedFormat(
                media_type.to_string(),
            ));
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DocumentExtractionError::ExtractionFailed(
                "corrupt file".to_string(),
            ));
        }

        String::from_utf8(data.to_vec())
            .map(|text| text.trim().to_string())
            .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))
    }

    fn supported_formats(&self) -> Vec<MediaType> {
        vec![MediaType::PlainText]
    }
}

/// Deterministic bag-of-words embedding: each word is hashed into one of
/// `TEST_DIMENSION` buckets.
#[derive(Default)]
pub struct HashEmbeddingProvider {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl HashEmbeddingProvider {
    pub fn embed(text: &str) -> EmbeddingVector {
        let mut values = vec![0.0f32; TEST_DIMENSION];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            values[(hasher.finish() % TEST_DIMENSION as u64) as usize] += 1.0;
        }
        EmbeddingVector::from(values)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingProviderError::ServiceUnavailable(
                "embedding service down".to_string(),
            ));
        }

        Ok(BatchEmbeddingResponse {
            embeddings: request.texts.iter().map(|text| Self::embed(text)).collect(),
            model_name: self.model_name().to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "hash-test-model"
    }

    fn embedding_dimension(&self) -> usize {
        TEST_DIMENSION
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

fn matches_filter(record: &VectorRecord, filter: &SearchFilter) -> bool {
    let payload = record.payload();
    filter.file_names.contains(&payload.file_name)
        && filter
            .owner_id
            .as_ref()
            .is_none_or(|owner| owner == &payload.owner_id)
}

pub struct InMemoryVectorStore {
    collections: Mutex<HashMap<String, Vec<VectorRecord>>>,
    dimensions: Mutex<HashMap<String, usize>>,
    pub upsert_status: Mutex<UpsertStatus>,
    pub upserts: AtomicUsize,
    pub fail: AtomicBool,
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            dimensions: Mutex::new(HashMap::new()),
            upsert_status: Mutex::new(UpsertStatus::Completed),
            upserts: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

impl InMemoryVectorStore {
    pub fn records(&self, collection: &str) -> Vec<VectorRecord> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn records_for_file(&self, collection: &str, file_name: &str) -> Vec<VectorRecord> {
        self.records(collection)
            .into_iter()
            .filter(|record| record.payload().file_name == file_name)
            .collect()
    }

    pub fn records_for_document(&self, collection: &str, document_id: Uuid) -> Vec<VectorRecord> {
        self.records(collection)
            .into_iter()
            .filter(|record| record.payload().document_id == document_id)
            .collect()
    }

    /// Stores a point with a bare payload, as an older writer would have.
    pub fn insert_without_text(&self, collection: &str, record: VectorRecord) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
        _distance: DistanceMetric,
    ) -> Result<CollectionStatus, VectorStoreError> {
        let mut dimensions = self.dimensions.lock().unwrap();
        match dimensions.get(collection) {
            Some(&existing) if existing != dimension => Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: existing,
            }),
            Some(_) => Ok(CollectionStatus::AlreadyExists),
            None => {
                dimensions.insert(collection.to_string(), dimension);
                Ok(CollectionStatus::Created)
            }
        }
    }

    async fn upsert(
        &self,
        collection: &str,
        records: &[VectorRecord],
    ) -> Result<UpsertStatus, VectorStoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(VectorStoreError::RequestFailed("connection refused".to_string()));
        }

        let status = self.upsert_status.lock().unwrap().clone();
        if status.is_completed() {
            self.collections
                .lock()
                .unwrap()
                .entry(collection.to_string())
                .or_default()
                .extend(records.iter().cloned());
        }
        Ok(status)
    }

    async fn search(
        &self,
        collection: &str,
        query: &EmbeddingVector,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VectorStoreError::RequestFailed("connection refused".to_string()));
        }

        let mut hits: Vec<SearchHit> = self
            .records(collection)
            .into_iter()
            .filter(|record| matches_filter(record, filter))
            .map(|record| SearchHit {
                id: record.id().to_string(),
                score: cosine_similarity(query.as_slice(), record.vector().as_slice()),
                file_name: Some(record.payload().file_name.clone()),
                text: (!record.payload().text.is_empty()).then(|| record.payload().text.clone()),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn delete(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<(), VectorStoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VectorStoreError::RequestFailed("connection refused".to_string()));
        }
        if let Some(records) = self.collections.lock().unwrap().get_mut(collection) {
            records.retain(|record| {
                let payload = record.payload();
                !(filter.document_ids.contains(&payload.document_id)
                    && payload.owner_id == filter.owner_id)
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<Document>>,
    pub fail: AtomicBool,
}

impl InMemoryDocumentRepository {
    pub fn all(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), DocumentRepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DocumentRepositoryError::DatabaseError(
                "metadata store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<Uuid, DocumentRepositoryError> {
        self.check()?;
        self.documents.lock().unwrap().push(document.clone());
        Ok(document.id())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Document>, DocumentRepositoryError> {
        self.check()?;
        Ok(self
            .all()
            .into_iter()
            .filter(|document| document.is_owned_by(owner_id))
            .collect())
    }

    async fn find_by_id_for_owner(
        &self,
        id: Uuid,
        owner_id: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        self.check()?;
        Ok(self
            .all()
            .into_iter()
            .find(|document| document.id() == id && document.is_owned_by(owner_id)))
    }

    async fn find_by_ids_for_owner(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        self.check()?;
        Ok(self
            .all()
            .into_iter()
            .filter(|document| ids.contains(&document.id()) && document.is_owned_by(owner_id))
            .collect())
    }

    async fn delete_by_ids_for_owner(
        &self,
        ids: &[Uuid],
        owner_id: &str,
    ) -> Result<usize, DocumentRepositoryError> {
        self.check()?;
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|document| !(ids.contains(&document.id()) && document.is_owned_by(owner_id)));
        Ok(before - documents.len())
    }
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    exchanges: Mutex<Vec<Exchange>>,
    pub fail_inserts: AtomicBool,
    pub fail_answers: AtomicBool,
}

impl InMemoryQuestionRepository {
    pub fn all(&self) -> Vec<Exchange> {
        self.exchanges.lock().unwrap().clone()
    }

    pub fn seed(&self, exchange: Exchange) {
        self.exchanges.lock().unwrap().push(exchange);
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn insert(&self, exchange: &Exchange) -> Result<Uuid, QuestionRepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(QuestionRepositoryError::DatabaseError(
                "insert rejected".to_string(),
            ));
        }
        self.exchanges.lock().unwrap().push(exchange.clone());
        Ok(exchange.id())
    }

    async fn attach_answer(&self, id: Uuid, answer: &str) -> Result<(), QuestionRepositoryError> {
        if self.fail_answers.load(Ordering::SeqCst) {
            return Err(QuestionRepositoryError::DatabaseError(
                "update rejected".to_string(),
            ));
        }
        let mut exchanges = self.exchanges.lock().unwrap();
        let exchange = exchanges
            .iter_mut()
            .find(|exchange| exchange.id() == id)
            .ok_or(QuestionRepositoryError::NotFound(id))?;
        exchange
            .attach_answer(answer.to_string())
            .map_err(|_| QuestionRepositoryError::AlreadyAnswered(id))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Exchange>, QuestionRepositoryError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|exchange| exchange.owner_id() == owner_id)
            .collect())
    }

    async fn find_by_chat_space(
        &self,
        owner_id: &str,
        chat_space: &str,
    ) -> Result<Vec<Exchange>, QuestionRepositoryError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|exchange| exchange.owner_id() == owner_id && exchange.chat_space() == chat_space)
            .collect())
    }

    async fn delete_by_chat_space(
        &self,
        owner_id: &str,
        chat_space: &str,
    ) -> Result<usize, QuestionRepositoryError> {
        let mut exchanges = self.exchanges.lock().unwrap();
        let before = exchanges.len();
        exchanges.retain(|exchange| {
            !(exchange.owner_id() == owner_id && exchange.chat_space() == chat_space)
        });
        Ok(before - exchanges.len())
    }
}

#[derive(Default)]
pub struct InMemoryBlobStorage {
    blobs: Mutex<HashMap<String, (Vec<u8>, BlobUploadOptions)>>,
    pub fail: AtomicBool,
}

impl InMemoryBlobStorage {
    pub fn get(&self, key: &str) -> Option<(Vec<u8>, BlobUploadOptions)> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        options: &BlobUploadOptions,
    ) -> Result<(), BlobStorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BlobStorageError::IoError("disk full".to_string()));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), options.clone()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<String, BlobStorageError> {
        Ok(format!("https://blobs.test/{}", key))
    }

    async fn remove(&self, keys: &[String]) -> Result<usize, BlobStorageError> {
        let mut blobs = self.blobs.lock().unwrap();
        Ok(keys.iter().filter(|key| blobs.remove(*key).is_some()).count())
    }
}

/// Answers every prompt with `answer`; streaming yields it word by word.
pub struct ScriptedGenerationProvider {
    answer: String,
    pub prompts: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl ScriptedGenerationProvider {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerationProvider {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::ApiError("quota exceeded".to_string()));
        }
        Ok(self.answer.clone())
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::ApiError("quota exceeded".to_string()));
        }

        let fragments: Vec<Result<String, GenerationError>> = self
            .answer
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(stream::iter(fragments).boxed())
    }
}

/// Accepts exactly the tokens it was built with.
pub struct StaticAuthProvider {
    tokens: HashMap<String, String>,
}

impl StaticAuthProvider {
    pub fn new(tokens: &[(&str, &str)]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(token, owner)| (token.to_string(), owner.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn verify(&self, bearer_token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(bearer_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidCredential("unknown token".to_string()))
    }
}

/// `count` distinct words, `w0 w1 w2 ...`.
pub fn words(count: usize) -> String {
    (0..count)
        .map(|i| format!("w{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}
