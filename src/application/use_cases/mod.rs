pub mod delete_chat_space;
pub mod delete_documents;
pub mod get_document_urls;
pub mod get_user_history;
pub mod list_user_documents;
pub mod semantic_search;

pub use delete_chat_space::DeleteChatSpaceUseCase;
pub use delete_documents::DeleteDocumentsUseCase;
pub use get_document_urls::GetDocumentUrlsUseCase;
pub use get_user_history::GetUserHistoryUseCase;
pub use list_user_documents::ListUserDocumentsUseCase;
pub use semantic_search::SemanticSearchUseCase;
