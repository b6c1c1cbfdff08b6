pub mod document_dto;
pub mod question_dto;
pub mod response_dto;
pub mod search_dto;

pub use document_dto::*;
pub use question_dto::*;
pub use response_dto::*;
pub use search_dto::*;
