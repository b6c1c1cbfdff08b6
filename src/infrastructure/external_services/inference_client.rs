use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
};
use crate::domain::value_objects::EmbeddingVector;
use crate::infrastructure::config::EmbeddingConfig;

#[derive(Serialize)]
pub struct EmbeddingsRequest {
    pub text: Vec<String>,
}

#[derive(Deserialize)]
pub struct EmbeddingsResponse {
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingsClientConfig {
    pub service_url: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

impl From<&EmbeddingConfig> for EmbeddingsClientConfig {
    fn from(config: &EmbeddingConfig) -> Self {
        Self {
            service_url: config.service_url.clone(),
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
            backoff_factor: config.backoff_factor,
        }
    }
}

#[derive(Debug)]
pub enum EmbeddingsError {
    /// Transport failure or a 5xx/429 answer.
    RequestError(String),
    /// Any other non-2xx answer; the same request will be rejected again.
    Rejected(String),
    ParseError(String),
    MaxRetriesExceeded(String),
}

impl EmbeddingsError {
    fn is_retryable(&self) -> bool {
        matches!(self, EmbeddingsError::RequestError(_))
    }
}

impl std::fmt::Display for EmbeddingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingsError::RequestError(msg) => write!(f, "Request error: {}", msg),
            EmbeddingsError::Rejected(msg) => write!(f, "Request rejected: {}", msg),
            EmbeddingsError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            EmbeddingsError::MaxRetriesExceeded(msg) => write!(f, "Max retries exceeded: {}", msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    config: EmbeddingsClientConfig,
}

impl InferenceClient {
    pub fn new(config: EmbeddingsClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn get_embeddings(
        &self,
        texts: &[String],
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let request = EmbeddingsRequest {
            text: texts.to_vec(),
        };

        self.send_request(request).await
    }

    async fn send_request(
        &self,
        request: EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.execute_request(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempts > self.config.max_retries {
                        return Err(EmbeddingsError::MaxRetriesExceeded(format!(
                            "{} attempts, last error: {}",
                            attempts, e
                        )));
                    }

                    let backoff_time = Duration::from_millis(
                        (self.config.backoff_factor.powi(attempts as i32 - 1) * 1000.0) as u64,
                    );
                    warn!(
                        "Embedding request attempt {} failed ({}), retrying in {:?}",
                        attempts, e, backoff_time
                    );

                    tokio::time::sleep(backoff_time).await;
                }
            }
        }
    }

    async fn execute_request(
        &self,
        request: &EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let response = self
            .client
            .post(&self.config.service_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingsError::RequestError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, body);
            return Err(
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    EmbeddingsError::RequestError(message)
                } else {
                    EmbeddingsError::Rejected(message)
                },
            );
        }

        response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::ParseError(e.to_string()))
    }
}

// Adapter to implement the EmbeddingProvider trait
pub struct InferenceEmbeddingProvider {
    client: InferenceClient,
    model_name: String,
    dimension: usize,
}

impl InferenceEmbeddingProvider {
    pub fn new(client: InferenceClient, model_name: String, dimension: usize) -> Self {
        Self {
            client,
            model_name,
            dimension,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, ReqwestError> {
        let client = InferenceClient::new(EmbeddingsClientConfig::from(config))?;
        Ok(Self::new(client, config.model.clone(), config.dimension))
    }
}

#[async_trait]
impl EmbeddingProvider for InferenceEmbeddingProvider {
    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if request.texts.is_empty() {
            return Err(EmbeddingProviderError::InvalidInput(
                "No texts to embed".to_string(),
            ));
        }

        let response = self
            .client
            .get_embeddings(&request.texts)
            .await
            .map_err(|e| match e {
                EmbeddingsError::RequestError(msg) => EmbeddingProviderError::NetworkError(msg),
                EmbeddingsError::Rejected(msg) | EmbeddingsError::ParseError(msg) => {
                    EmbeddingProviderError::ApiError(msg)
                }
                EmbeddingsError::MaxRetriesExceeded(msg) => {
                    EmbeddingProviderError::ServiceUnavailable(msg)
                }
            })?;

        Ok(BatchEmbeddingResponse {
            embeddings: response
                .embeddings
                .into_iter()
                .map(EmbeddingVector::from)
                .collect(),
            model_name: self.model_name.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }
}
