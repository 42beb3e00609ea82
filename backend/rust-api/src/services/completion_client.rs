use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::CompletionConfig;
use crate::metrics::COMPLETION_REQUEST_DURATION_SECONDS;
use crate::models::completion::{CompletionRequest, CompletionResponse};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode completion response: {0}")]
    Decode(String),
}

/// Outbound chat-completion API.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}

/// Client for OpenRouter-compatible `/chat/completions` endpoints.
pub struct OpenRouterClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
}

impl OpenRouterClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if config.api_key.is_none() {
            tracing::warn!("No completion API key configured; upstream calls will be unauthenticated");
        }

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, CompletionError> {
        let mut builder = self.http.post(&self.api_url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| CompletionError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let started = Instant::now();
        let result = self.send(request).await;

        COMPLETION_REQUEST_DURATION_SECONDS
            .with_label_values(&[&request.model])
            .observe(started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            tracing::debug!("Completion call to {} failed: {}", self.api_url, e);
        }

        result
    }
}
