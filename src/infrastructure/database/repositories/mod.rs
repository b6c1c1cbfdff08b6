pub mod postgres_document_repository;
pub mod postgres_question_repository;

pub use postgres_document_repository::PostgresDocumentRepository;
pub use postgres_question_repository::PostgresQuestionRepository;
