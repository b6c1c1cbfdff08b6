pub mod document;
pub mod exchange;
pub mod vector_record;

pub use document::Document;
pub use exchange::Exchange;
pub use vector_record::{VectorPayload, VectorRecord};
