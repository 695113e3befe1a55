//! Gemini / Imagen backend over the Generative Language REST API.

use crate::error::{parse_retry_after, sanitize_error_message, Result, VisionError};
use crate::image::provider::GenerationBackend;
use crate::image::request::ProviderRequest;
use crate::image::response::{ContentResponse, ProviderResponse, SynthesisResponse};
use crate::image::types::ModelTier;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Environment variable overriding the base URL.
const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Builder for GeminiBackend.
#[derive(Debug, Clone, Default)]
pub struct GeminiBackendBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    health_model: Option<ModelTier>,
}

impl GeminiBackendBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API base URL. Falls back to `GEMINI_BASE_URL`, then the
    /// public endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a transport timeout for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the model probed by [`GenerationBackend::health_check`].
    pub fn health_model(mut self, model: ModelTier) -> Self {
        self.health_model = Some(model);
        self
    }

    /// Builds the backend, resolving the API key.
    pub fn build(self) -> Result<GeminiBackend> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            })
            .ok_or_else(|| {
                VisionError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var(BASE_URL_VAR).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(GeminiBackend {
            client: client.build()?,
            api_key,
            base_url,
            health_model: self.health_model.unwrap_or_default(),
        })
    }
}

/// Backend for the Gemini image models and Imagen.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    health_model: ModelTier,
}

impl GeminiBackend {
    /// Creates a new `GeminiBackendBuilder`.
    pub fn builder() -> GeminiBackendBuilder {
        GeminiBackendBuilder::new()
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: ModelTier, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model.as_str(), method)
    }

    async fn post<T: Serialize + Sync, R: DeserializeOwned>(&self, url: &str, body: &T) -> Result<R> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn execute(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let start = Instant::now();
        let model = request.model();
        tracing::debug!(model = %model, "sending generation request");

        let response = match request {
            ProviderRequest::ImageSynthesis(body) => {
                let url = self.endpoint(model, "predict");
                let resp: SynthesisResponse = self.post(&url, body).await?;
                ProviderResponse::ImageSynthesis(resp)
            }
            ProviderRequest::ContentGeneration(body) => {
                let url = self.endpoint(model, "generateContent");
                let resp: ContentResponse = self.post(&url, body).await?;
                ProviderResponse::ContentGeneration(resp)
            }
        };

        tracing::debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis() as u64,
            "generation request complete"
        );
        Ok(response)
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!(
            "{}/v1beta/models/{}",
            self.base_url,
            self.health_model.as_str()
        );

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(VisionError::Auth("Invalid API key".into())),
            404 => Err(VisionError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(VisionError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

/// Maps an HTTP error response to a [`VisionError`].
fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> VisionError {
    let text = sanitize_error_message(&extract_error_message(text));
    if status == 404 {
        return VisionError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return VisionError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return VisionError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
        return VisionError::ContentBlocked(text);
    }
    VisionError::Api {
        status,
        message: text,
    }
}

/// Pulls `error.message` out of a Google API error body, if present.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
