use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        ports::{
            AuthProvider, BlobStorage, DocumentExtractor, EmbeddingProvider, GenerationProvider,
            VectorStore, vector_store::DistanceMetric,
        },
        services::{
            EmbeddingService, GenerationService, IngestionService, SearchService, TextChunker,
        },
        use_cases::{
            DeleteChatSpaceUseCase, DeleteDocumentsUseCase, GetDocumentUrlsUseCase,
            GetUserHistoryUseCase, ListUserDocumentsUseCase, SemanticSearchUseCase,
        },
    },
    domain::repositories::{DocumentRepository, QuestionRepository},
    infrastructure::{
        config::AppConfig,
        database::{
            create_connection_pool,
            repositories::{PostgresDocumentRepository, PostgresQuestionRepository},
            run_migrations,
        },
        external_services::{
            CompositeDocumentExtractor, GeminiClient, InferenceEmbeddingProvider,
            QdrantVectorStore, SupabaseAuthProvider,
        },
        file_system::LocalBlobStorage,
    },
    presentation::http::{
        HttpServer,
        handlers::{DocumentHandler, QuestionHandler, SearchHandler},
    },
};

pub struct AppContainer {
    // Repositories
    pub document_repository: Arc<dyn DocumentRepository>,
    pub question_repository: Arc<dyn QuestionRepository>,

    // External Services
    pub document_extractor: Arc<dyn DocumentExtractor>,
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub vector_store: Arc<dyn VectorStore>,
    pub blob_storage: Arc<dyn BlobStorage>,
    pub generation_provider: Arc<dyn GenerationProvider>,
    pub auth_provider: Arc<dyn AuthProvider>,

    // Application Services
    pub embedding_service: Arc<EmbeddingService>,
    pub search_service: Arc<SearchService>,
    pub ingestion_service: Arc<IngestionService>,
    pub generation_service: Arc<GenerationService>,

    // Use Cases
    pub delete_documents_use_case: Arc<DeleteDocumentsUseCase>,
    pub delete_chat_space_use_case: Arc<DeleteChatSpaceUseCase>,
    pub history_use_case: Arc<GetUserHistoryUseCase>,
    pub list_documents_use_case: Arc<ListUserDocumentsUseCase>,
    pub document_urls_use_case: Arc<GetDocumentUrlsUseCase>,
    pub semantic_search_use_case: Arc<SemanticSearchUseCase>,

    // HTTP Handlers
    pub document_handler: Arc<DocumentHandler>,
    pub question_handler: Arc<QuestionHandler>,
    pub search_handler: Arc<SearchHandler>,
}

impl AppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Metadata store
        let db_pool = create_connection_pool(&config.database_url)?;
        let migration_pool = db_pool.clone();
        tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
            .await
            .map_err(|e| format!("Migration task failed: {}", e))?
            .map_err(|e| format!("Failed to run database migrations: {}", e))?;

        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool.clone()));
        let question_repository: Arc<dyn QuestionRepository> =
            Arc::new(PostgresQuestionRepository::new(db_pool));

        // External services
        let document_extractor: Arc<dyn DocumentExtractor> = Arc::new(
            CompositeDocumentExtractor::new()
                .map_err(|e| format!("Failed to create document extractor: {}", e))?,
        );
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(
            InferenceEmbeddingProvider::from_config(&config.embedding)
                .map_err(|e| format!("Failed to create embeddings client: {}", e))?,
        );
        let vector_store: Arc<dyn VectorStore> = Arc::new(QdrantVectorStore::new(&config.qdrant)?);
        let generation_provider: Arc<dyn GenerationProvider> =
            Arc::new(GeminiClient::new(&config.gemini)?);
        let auth_provider: Arc<dyn AuthProvider> =
            Arc::new(SupabaseAuthProvider::new(&config.auth)?);

        let local_blobs = LocalBlobStorage::new(
            config.blobs.root.clone(),
            &config.blobs.public_base_url,
        );
        local_blobs.ensure_directory_exists().await?;
        let blob_storage: Arc<dyn BlobStorage> = Arc::new(local_blobs);

        // A collection built with another embedding dimension cannot be used.
        let status = vector_store
            .ensure_collection(
                &config.qdrant.collection,
                config.embedding.dimension,
                DistanceMetric::Cosine,
            )
            .await
            .map_err(|e| format!("Vector collection {} unusable: {}", config.qdrant.collection, e))?;
        info!("Vector collection {}: {:?}", config.qdrant.collection, status);

        // Application services
        let collection = config.qdrant.collection.clone();
        let embedding_service = Arc::new(EmbeddingService::new(
            embedding_provider.clone(),
            config.embedding.dimension,
        ));
        let search_service = Arc::new(SearchService::new(
            embedding_service.clone(),
            vector_store.clone(),
            collection.clone(),
        ));
        let ingestion_service = Arc::new(
            IngestionService::new(
                document_extractor.clone(),
                embedding_service.clone(),
                vector_store.clone(),
                document_repository.clone(),
                blob_storage.clone(),
                collection.clone(),
            )
            .with_chunker(TextChunker::new(config.pipeline.chunk_size))
            .with_concurrency(config.pipeline.ingest_concurrency),
        );
        let generation_service = Arc::new(
            GenerationService::new(
                search_service.clone(),
                generation_provider.clone(),
                question_repository.clone(),
            )
            .with_limits(
                config.pipeline.retrieval_top_k,
                config.pipeline.context_passages,
            ),
        );

        // Use cases
        let delete_documents_use_case = Arc::new(DeleteDocumentsUseCase::new(
            document_repository.clone(),
            vector_store.clone(),
            blob_storage.clone(),
            collection,
        ));
        let delete_chat_space_use_case =
            Arc::new(DeleteChatSpaceUseCase::new(question_repository.clone()));
        let history_use_case = Arc::new(GetUserHistoryUseCase::new(question_repository.clone()));
        let list_documents_use_case =
            Arc::new(ListUserDocumentsUseCase::new(document_repository.clone()));
        let document_urls_use_case = Arc::new(GetDocumentUrlsUseCase::new(
            document_repository.clone(),
            blob_storage.clone(),
        ));
        let semantic_search_use_case = Arc::new(SemanticSearchUseCase::new(
            search_service.clone(),
            config.pipeline.retrieval_top_k,
        ));

        // HTTP handlers
        let document_handler = Arc::new(DocumentHandler::new(
            ingestion_service.clone(),
            delete_documents_use_case.clone(),
            list_documents_use_case.clone(),
            document_urls_use_case.clone(),
            auth_provider.clone(),
        ));
        let question_handler = Arc::new(QuestionHandler::new(
            generation_service.clone(),
            history_use_case.clone(),
            delete_chat_space_use_case.clone(),
            auth_provider.clone(),
        ));
        let search_handler = Arc::new(SearchHandler::new(
            semantic_search_use_case.clone(),
            auth_provider.clone(),
        ));

        Ok(Self {
            document_repository,
            question_repository,
            document_extractor,
            embedding_provider,
            vector_store,
            blob_storage,
            generation_provider,
            auth_provider,
            embedding_service,
            search_service,
            ingestion_service,
            generation_service,
            delete_documents_use_case,
            delete_chat_space_use_case,
            history_use_case,
            list_documents_use_case,
            document_urls_use_case,
            semantic_search_use_case,
            document_handler,
            question_handler,
            search_handler,
        })
    }

    pub fn http_server(&self, config: &AppConfig) -> HttpServer {
        HttpServer::new(
            self.document_handler.clone(),
            self.question_handler.clone(),
            self.search_handler.clone(),
            config.blobs.root.clone(),
            config.max_upload_bytes,
            config.port,
        )
    }
}
