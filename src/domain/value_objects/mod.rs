pub mod embedding_vector;
pub mod media_type;

pub use embedding_vector::EmbeddingVector;
pub use media_type::MediaType;
