pub mod document_repository;
pub mod question_repository;

pub use document_repository::DocumentRepository;
pub use question_repository::QuestionRepository;
