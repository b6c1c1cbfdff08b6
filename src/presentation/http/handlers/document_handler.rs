use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::application::ports::AuthProvider;
use crate::application::services::IngestionService;
use crate::application::services::ingestion_service::UploadedFile;
use crate::application::use_cases::delete_documents::DeleteDocumentsRequest;
use crate::application::use_cases::{
    DeleteDocumentsUseCase, GetDocumentUrlsUseCase, ListUserDocumentsUseCase,
};
use crate::presentation::http::auth::authenticate;
use crate::presentation::http::dto::{
    ApiResponse, DeleteDocumentsRequestDto, DeleteDocumentsResponseDto, DocumentResponseDto,
    IngestResponseDto,
};
use crate::presentation::http::errors::HttpError;

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

pub struct DocumentHandler {
    ingestion_service: Arc<IngestionService>,
    delete_documents_use_case: Arc<DeleteDocumentsUseCase>,
    list_documents_use_case: Arc<ListUserDocumentsUseCase>,
    document_urls_use_case: Arc<GetDocumentUrlsUseCase>,
    auth_provider: Arc<dyn AuthProvider>,
}

impl DocumentHandler {
    pub fn new(
        ingestion_service: Arc<IngestionService>,
        delete_documents_use_case: Arc<DeleteDocumentsUseCase>,
        list_documents_use_case: Arc<ListUserDocumentsUseCase>,
        document_urls_use_case: Arc<GetDocumentUrlsUseCase>,
        auth_provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            ingestion_service,
            delete_documents_use_case,
            list_documents_use_case,
            document_urls_use_case,
            auth_provider,
        }
    }

    /// Ingests every file part of the form. One file is ingested directly;
    /// several go through the batch path and stop at the first failure.
    pub async fn ingest(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let mut files = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::bad_request("INVALID_MULTIPART", e.body_text()))?
        {
            let Some(file_name) = field.file_name().map(|name| name.to_string()) else {
                continue;
            };
            let media_type = field
                .content_type()
                .unwrap_or(DEFAULT_MEDIA_TYPE)
                .to_string();

            let data = field
                .bytes()
                .await
                .map_err(|e| HttpError::bad_request("INVALID_MULTIPART", e.body_text()))?
                .to_vec();

            files.push(UploadedFile {
                file_name,
                media_type,
                data,
            });
        }

        let documents = match files.as_slice() {
            [] => {
                return Err(HttpError::bad_request(
                    "NO_FILE_PROVIDED",
                    "No file provided in the request",
                ));
            }
            [file] => vec![handler.ingestion_service.ingest(file, &owner_id).await?],
            files => handler.ingestion_service.ingest_many(files, &owner_id).await?,
        };

        info!("Ingested {} file(s) for {}", documents.len(), owner_id);
        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(IngestResponseDto { documents })),
        ))
    }

    pub async fn delete_documents(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        Json(body): Json<DeleteDocumentsRequestDto>,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let response = handler
            .delete_documents_use_case
            .execute(DeleteDocumentsRequest {
                document_ids: body.document_ids,
                owner_id,
            })
            .await?;

        Ok((
            StatusCode::OK,
            Json(ApiResponse::success(DeleteDocumentsResponseDto::from(response))),
        ))
    }

    pub async fn list_documents(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let documents: Vec<DocumentResponseDto> = handler
            .list_documents_use_case
            .execute(&owner_id)
            .await?
            .into_iter()
            .map(DocumentResponseDto::from)
            .collect();

        Ok((StatusCode::OK, Json(ApiResponse::success(documents))))
    }

    pub async fn document_url(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
        Path(document_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let url = handler
            .document_urls_use_case
            .single(document_id, &owner_id)
            .await?;

        Ok((StatusCode::OK, Json(ApiResponse::success(url))))
    }

    pub async fn document_urls(
        State(handler): State<Arc<DocumentHandler>>,
        headers: HeaderMap,
    ) -> Result<impl IntoResponse, HttpError> {
        let owner_id = authenticate(handler.auth_provider.as_ref(), &headers).await?;

        let urls = handler.document_urls_use_case.all(&owner_id).await?;

        Ok((StatusCode::OK, Json(ApiResponse::success(urls))))
    }
}
