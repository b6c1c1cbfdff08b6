use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::ports::vector_store::{
    CollectionStatus, DistanceMetric, DocumentFilter, SearchFilter, SearchHit, UpsertStatus,
    VectorStore, VectorStoreError,
};
use crate::domain::entities::VectorRecord;
use crate::domain::value_objects::EmbeddingVector;
use crate::infrastructure::config::QdrantConfig;

const INDEXED_PAYLOAD_FIELDS: [&str; 3] = ["document_id", "file_name", "owner_id"];

#[derive(Deserialize)]
struct QdrantEnvelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Deserialize)]
struct CollectionParams {
    vectors: VectorParams,
}

#[derive(Deserialize)]
struct VectorParams {
    size: usize,
}

#[derive(Deserialize)]
struct UpdateResult {
    status: String,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<Value>,
}

/// Qdrant over its REST API.
pub struct QdrantVectorStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantVectorStore {
    pub fn new(config: &QdrantConfig) -> Result<Self, VectorStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response, VectorStoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(VectorStoreError::RequestFailed(format!(
            "HTTP {}: {}",
            status, body
        )))
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, VectorStoreError> {
        response
            .json::<QdrantEnvelope<T>>()
            .await
            .map(|envelope| envelope.result)
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))
    }

    async fn existing_dimension(&self, collection: &str) -> Result<Option<usize>, VectorStoreError> {
        let response = self
            .request(Method::GET, &format!("/collections/{}", collection))
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.without_url().to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(VectorStoreError::CollectionSetup(format!(
                "HTTP {} while reading collection {}",
                response.status(),
                collection
            )));
        }

        let info: CollectionInfo = Self::parse(response).await?;
        Ok(Some(info.config.params.vectors.size))
    }

    /// `Some(AlreadyExists)` when the collection is there with the expected
    /// dimension, `None` when it is missing.
    async fn reuse_existing(
        &self,
        collection: &str,
        dimension: usize,
    ) -> Result<Option<CollectionStatus>, VectorStoreError> {
        let Some(actual) = self.existing_dimension(collection).await? else {
            return Ok(None);
        };
        if actual != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual,
            });
        }
        info!("Collection {} already exists ({} dims)", collection, actual);
        Ok(Some(CollectionStatus::AlreadyExists))
    }

    fn filter_json(filter: &SearchFilter) -> Value {
        let mut must = vec![json!({
            "key": "file_name",
            "match": { "any": filter.file_names }
        })];
        if let Some(owner_id) = &filter.owner_id {
            must.push(json!({
                "key": "owner_id",
                "match": { "value": owner_id }
            }));
        }
        json!({ "must": must })
    }

    fn document_filter_json(filter: &DocumentFilter) -> Value {
        let document_ids: Vec<String> = filter.document_ids.iter().map(Uuid::to_string).collect();
        json!({
            "must": [
                { "key": "document_id", "match": { "any": document_ids } },
                { "key": "owner_id", "match": { "value": filter.owner_id } }
            ]
        })
    }

    fn hit_from(point: ScoredPoint) -> SearchHit {
        let field = |name: &str| {
            point
                .payload
                .as_ref()
                .and_then(|payload| payload.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        SearchHit {
            id: match &point.id {
                Value::String(id) => id.clone(),
                other => other.to_string(),
            },
            score: point.score,
            file_name: field("file_name"),
            text: field("text"),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> Result<CollectionStatus, VectorStoreError> {
        if let Some(status) = self.reuse_existing(collection, dimension).await? {
            return Ok(status);
        }

        let body = json!({
            "vectors": { "size": dimension, "distance": distance.as_str() },
            "hnsw_config": { "m": 16, "ef_construct": 100 },
            "optimizers_config": { "default_segment_number": 2 }
        });

        let response = self
            .request(Method::PUT, &format!("/collections/{}", collection))
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::CollectionSetup(e.without_url().to_string()))?;

        // Another writer created it between our read and this PUT.
        if response.status() == StatusCode::CONFLICT {
            debug!("Collection {} was created concurrently", collection);
            return self
                .reuse_existing(collection, dimension)
                .await?
                .ok_or_else(|| {
                    VectorStoreError::CollectionSetup(format!(
                        "collection {} reported as existing but could not be read",
                        collection
                    ))
                });
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::CollectionSetup(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        for field in INDEXED_PAYLOAD_FIELDS {
            Self::send(
                self.request(Method::PUT, &format!("/collections/{}/index?wait=true", collection))
                    .json(&json!({ "field_name": field, "field_schema": "keyword" })),
            )
            .await
            .map_err(|e| VectorStoreError::CollectionSetup(e.to_string()))?;
        }

        info!(
            "Created collection {} ({} dims, {})",
            collection,
            dimension,
            distance.as_str()
        );
        Ok(CollectionStatus::Created)
    }

    async fn upsert(
        &self,
        collection: &str,
        records: &[VectorRecord],
    ) -> Result<UpsertStatus, VectorStoreError> {
        let points: Vec<Value> = records
            .iter()
            .map(|record| {
                json!({
                    "id": record.id().to_string(),
                    "vector": record.vector().as_slice(),
                    "payload": record.payload(),
                })
            })
            .collect();

        let response = Self::send(
            self.request(
                Method::PUT,
                &format!("/collections/{}/points?wait=true", collection),
            )
            .json(&json!({ "points": points })),
        )
        .await?;

        let result: UpdateResult = Self::parse(response).await?;
        debug!(
            "Upserted {} points into {}: {}",
            records.len(),
            collection,
            result.status
        );
        Ok(UpsertStatus::from_status(&result.status))
    }

    async fn search(
        &self,
        collection: &str,
        query: &EmbeddingVector,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        let body = json!({
            "vector": query.as_slice(),
            "filter": Self::filter_json(filter),
            "limit": limit,
            "with_payload": true
        });

        let response = Self::send(
            self.request(
                Method::POST,
                &format!("/collections/{}/points/search", collection),
            )
            .json(&body),
        )
        .await?;

        let points: Vec<ScoredPoint> = Self::parse(response).await?;
        Ok(points.into_iter().map(Self::hit_from).collect())
    }

    async fn delete(
        &self,
        collection: &str,
        filter: &DocumentFilter,
    ) -> Result<(), VectorStoreError> {
        Self::send(
            self.request(
                Method::POST,
                &format!("/collections/{}/points/delete?wait=true", collection),
            )
            .json(&json!({ "filter": Self::document_filter_json(filter) })),
        )
        .await?;
        Ok(())
    }
}
