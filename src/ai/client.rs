//! HTTP client for an OpenAI-compatible provider.
//!
//! Configuration comes from [`ProviderConfig`]:
//! - `EMOTION_CANVAS_API_URL` - Base URL (default: `https://api.openai.com/v1`)
//! - `OPENAI_API_KEY` - Bearer credential

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{CompletionsBody, CompletionsResponse, ImagesResponse};
use super::{CompletionRequest, CompletionService, ImageGenerationService, ImageRequest, ServiceError};
use crate::config::ProviderConfig;

/// Talks to `/completions` and `/images/generations`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a client with the configured endpoint, model and timeout.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.completion_model.clone(),
            client: config.http_client()?,
        })
    }

    /// Build a request with optional auth header.
    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Handle response, converting HTTP errors to ServiceError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::UNAUTHORIZED => Err(ServiceError::Unauthorized),
                _ => Err(ServiceError::Api {
                    status: status.as_u16(),
                    message: body,
                }),
            }
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Vec<String>, ServiceError> {
        debug!(model = %self.model, max_tokens = request.max_tokens, "complete: called");
        let body = CompletionsBody {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            n: request.n,
            temperature: request.temperature,
        };
        let response = self.request("/completions").json(&body).send().await?;
        let parsed: CompletionsResponse = self.handle_response(response).await?;
        debug!(choices = parsed.choices.len(), "complete: received");
        Ok(parsed.choices.into_iter().map(|c| c.text).collect())
    }
}

#[async_trait]
impl ImageGenerationService for OpenAiClient {
    async fn generate_images(&self, request: ImageRequest) -> Result<Vec<String>, ServiceError> {
        debug!(n = request.n, size = %request.size, "generate_images: called");
        let response = self
            .request("/images/generations")
            .json(&request)
            .send()
            .await?;
        let parsed: ImagesResponse = self.handle_response(response).await?;
        let urls: Vec<String> = parsed.data.into_iter().filter_map(|d| d.url).collect();
        debug!(count = urls.len(), "generate_images: received");
        Ok(urls)
    }
}
