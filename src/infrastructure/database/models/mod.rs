pub mod document_model;
pub mod question_model;

pub use document_model::*;
pub use question_model::*;
