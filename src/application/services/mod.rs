pub mod chunker;
pub mod embedding_service;
pub mod generation_service;
pub mod ingestion_service;
pub mod search_service;

pub use chunker::TextChunker;
pub use embedding_service::EmbeddingService;
pub use generation_service::GenerationService;
pub use ingestion_service::IngestionService;
pub use search_service::SearchService;
