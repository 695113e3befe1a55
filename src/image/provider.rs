//! Generation backend trait.

use crate::error::Result;
use crate::image::request::ProviderRequest;
use crate::image::response::ProviderResponse;
use async_trait::async_trait;

/// A remote capability that executes provider requests.
///
/// Implementations must answer an [`ProviderRequest::ImageSynthesis`] with a
/// [`ProviderResponse::ImageSynthesis`] and a
/// [`ProviderRequest::ContentGeneration`] with a
/// [`ProviderResponse::ContentGeneration`].
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Sends one request and returns the raw response.
    async fn execute(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Returns the name of this backend for display.
    fn name(&self) -> &str;

    /// Checks if the backend is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for std::sync::Arc<B> {
    async fn execute(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        (**self).execute(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> Result<()> {
        (**self).health_check().await
    }
}
