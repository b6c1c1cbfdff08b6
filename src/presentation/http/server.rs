use axum::{Router, extract::DefaultBodyLimit};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::presentation::http::{
    handlers::{DocumentHandler, QuestionHandler, SearchHandler},
    routes::{document_routes, health_routes, question_routes, search_routes},
};

pub struct HttpServer {
    document_handler: Arc<DocumentHandler>,
    question_handler: Arc<QuestionHandler>,
    search_handler: Arc<SearchHandler>,
    blob_root: PathBuf,
    max_upload_bytes: usize,
    port: u16,
}

impl HttpServer {
    pub fn new(
        document_handler: Arc<DocumentHandler>,
        question_handler: Arc<QuestionHandler>,
        search_handler: Arc<SearchHandler>,
        blob_root: PathBuf,
        max_upload_bytes: usize,
        port: u16,
    ) -> Self {
        Self {
            document_handler,
            question_handler,
            search_handler,
            blob_root,
            max_upload_bytes,
            port,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .merge(health_routes())
            .merge(document_routes(self.document_handler.clone()))
            .merge(question_routes(self.question_handler.clone()))
            .merge(search_routes(self.search_handler.clone()))
            .nest_service("/blobs", ServeDir::new(&self.blob_root))
            .layer(cors)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.max_upload_bytes))
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            )
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
