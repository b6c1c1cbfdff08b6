pub mod document_extractors;
pub mod gemini_client;
pub mod inference_client;
pub mod qdrant_store;
pub mod supabase_auth;

pub use document_extractors::CompositeDocumentExtractor;
pub use gemini_client::GeminiClient;
pub use inference_client::InferenceEmbeddingProvider;
pub use qdrant_store::QdrantVectorStore;
pub use supabase_auth::SupabaseAuthProvider;
