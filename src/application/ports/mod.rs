pub mod auth_provider;
pub mod blob_storage;
pub mod document_extractor;
pub mod embedding_provider;
pub mod generation_provider;
pub mod vector_store;

pub use auth_provider::AuthProvider;
pub use blob_storage::BlobStorage;
pub use document_extractor::DocumentExtractor;
pub use embedding_provider::EmbeddingProvider;
pub use generation_provider::GenerationProvider;
pub use vector_store::VectorStore;
