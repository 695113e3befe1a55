//! Generation façade: adapter, backend call and normalizer behind one call.

use crate::error::Result;
use crate::image::provider::GenerationBackend;
use crate::image::request::ProviderRequest;
use crate::image::types::GenerationConfig;

/// Single entry point for generating an image from a config.
///
/// Makes exactly one backend call per [`generate`](Self::generate) and never
/// retries. Every failure comes back as
/// [`VisionError::GenerationFailed`](crate::VisionError::GenerationFailed).
pub struct ImageGenerator<B> {
    backend: B,
}

impl<B: GenerationBackend> ImageGenerator<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generates one image and returns it as a PNG data URL.
    ///
    /// Performs no validation; callers check the prompt and reference image
    /// beforehand.
    pub async fn generate(&self, config: &GenerationConfig) -> Result<String> {
        self.generate_inner(config).await.map_err(|e| {
            tracing::warn!(
                backend = self.backend.name(),
                model = %config.model,
                "image generation failed: {e}"
            );
            e.into_generation_failed()
        })
    }

    async fn generate_inner(&self, config: &GenerationConfig) -> Result<String> {
        let request = ProviderRequest::from_config(config);
        let response = self.backend.execute(&request).await?;
        response.into_data_url()
    }

    /// Checks that the backend is reachable and authenticated.
    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }
}

impl<B> std::fmt::Debug for ImageGenerator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGenerator").finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;
    use crate::error::VisionError;
    use crate::image::response::{ProviderResponse, SynthesisResponse};
    use crate::image::types::{AspectRatio, ModelTier};
    use std::sync::Arc;

    const IMAGE_REPLY: &str =
        r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#;

    #[tokio::test]
    async fn test_generate_returns_data_url() {
        let backend = Arc::new(ScriptedBackend::default().reply_json(IMAGE_REPLY));
        let generator = ImageGenerator::new(backend.clone());

        let config = GenerationConfig::new("a red cube")
            .with_model(ModelTier::Flash)
            .with_aspect_ratio(AspectRatio::Square);
        let url = generator.generate(&config).await.unwrap();

        assert_eq!(url, "data:image/png;base64,AAAA");
        assert_eq!(backend.request_count(), 1);
        assert!(matches!(
            backend.requests.lock().unwrap()[0],
            ProviderRequest::ContentGeneration(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_synthesis_becomes_generation_failed() {
        let backend = ScriptedBackend::default().reply(Ok(ProviderResponse::ImageSynthesis(
            SynthesisResponse::default(),
        )));
        let generator = ImageGenerator::new(backend);

        let config = GenerationConfig::new("a blue sphere")
            .with_model(ModelTier::ImagenFast)
            .with_aspect_ratio(AspectRatio::Wide);
        let err = generator.generate(&config).await.unwrap_err();

        match err {
            VisionError::GenerationFailed { detail } => {
                assert_eq!(detail, VisionError::EmptyResult.to_string())
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_becomes_generation_failed() {
        let backend = ScriptedBackend::default().reply(Err(VisionError::Auth("Invalid API key".into())));
        let generator = ImageGenerator::new(backend);

        let err = generator
            .generate(&GenerationConfig::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "authentication failed: Invalid API key");
    }

    #[tokio::test]
    async fn test_refusal_detail_is_verbatim() {
        let backend = ScriptedBackend::default()
            .reply_json(r#"{"candidates":[{"content":{"parts":[{"text":"I can't help with that"}]}}]}"#);
        let generator = ImageGenerator::new(backend);

        let err = generator
            .generate(&GenerationConfig::new("x"))
            .await
            .unwrap_err();
        assert_eq!(
            err.detail(),
            "Model returned text instead of image: I can't help with that"
        );
    }

    #[tokio::test]
    async fn test_health_check_delegates_to_backend() {
        let generator = ImageGenerator::new(ScriptedBackend::default());
        generator.health_check().await.unwrap();
        assert_eq!(generator.backend().name(), "scripted");
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let backend = Arc::new(
            ScriptedBackend::default()
                .reply(Err(VisionError::RateLimited { retry_after: None }))
                .reply_json(IMAGE_REPLY),
        );
        let generator = ImageGenerator::new(backend.clone());

        assert!(generator.generate(&GenerationConfig::new("x")).await.is_err());
        assert_eq!(backend.request_count(), 1);
    }
}
