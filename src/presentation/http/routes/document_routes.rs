use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route(
            "/documents",
            post(DocumentHandler::ingest)
                .get(DocumentHandler::list_documents)
                .delete(DocumentHandler::delete_documents),
        )
        .route("/documents/urls", get(DocumentHandler::document_urls))
        .route(
            "/documents/{document_id}/url",
            get(DocumentHandler::document_url),
        )
        .with_state(document_handler)
}
