use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::{QuestionHandler, SearchHandler};

pub fn question_routes(question_handler: Arc<QuestionHandler>) -> Router {
    Router::new()
        .route("/questions", post(QuestionHandler::ask))
        .route("/questions/stream", post(QuestionHandler::ask_stream))
        .route("/history", get(QuestionHandler::history))
        .route(
            "/chats/{chat_space}",
            get(QuestionHandler::chat).delete(QuestionHandler::delete_chat_space),
        )
        .with_state(question_handler)
}

pub fn search_routes(search_handler: Arc<SearchHandler>) -> Router {
    Router::new()
        .route("/search", post(SearchHandler::search))
        .with_state(search_handler)
}
