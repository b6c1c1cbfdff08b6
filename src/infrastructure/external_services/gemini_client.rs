use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::generation_provider::{
    GenerationError, GenerationProvider, TextStream,
};
use crate::infrastructure::config::GeminiConfig;

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// Gemini `generateContent` and its SSE streaming variant.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, action)
    }

    async fn post(&self, url: String, prompt: &str) -> Result<reqwest::Response, GenerationError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError(format!("HTTP {}: {}", status, body)));
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self.post(self.endpoint("generateContent"), prompt).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ApiError(e.to_string()))?;

        let text = body.text();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream, GenerationError> {
        let response = self
            .post(self.endpoint("streamGenerateContent?alt=sse"), prompt)
            .await?;

        debug!("Opened generation stream for model {}", self.model);
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(sse_text_fragments(body))
    }
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buffer: Vec<u8>,
    ready: VecDeque<String>,
    done: bool,
}

/// Splits an SSE body into `data:` payloads and yields the text of each
/// Gemini chunk in arrival order. Chunks without text are skipped.
fn sse_text_fragments(body: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> TextStream {
    let state = SseState {
        body,
        buffer: Vec::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.ready.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.extend_from_slice(&bytes);
                    if let Err(e) = drain_events(&mut state.buffer, &mut state.ready) {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((
                        Err(GenerationError::StreamInterrupted(e.to_string())),
                        state,
                    ));
                }
                None => {
                    state.buffer.push(b'\n');
                    let result = drain_events(&mut state.buffer, &mut state.ready);
                    state.done = true;
                    if let Err(e) = result {
                        return Some((Err(e), state));
                    }
                }
            }
        }
    })
    .boxed()
}

/// Moves every complete line out of `buffer`, parsing `data:` lines. A
/// trailing partial line stays buffered until more bytes arrive.
fn drain_events(buffer: &mut Vec<u8>, ready: &mut VecDeque<String>) -> Result<(), GenerationError> {
    while let Some(newline) = buffer.iter().position(|&byte| byte == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=newline).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            continue;
        }

        let chunk: GenerateContentResponse = serde_json::from_str(data)
            .map_err(|e| GenerationError::StreamInterrupted(format!("Bad stream chunk: {}", e)))?;
        let text = chunk.text();
        if !text.is_empty() {
            ready.push_back(text);
        }
    }
    Ok(())
}
