//! Image generation module.

pub mod data_url;
pub(crate) mod generator;
mod provider;
pub mod providers;
mod request;
mod response;
mod types;

pub use generator::ImageGenerator;
pub use provider::GenerationBackend;
pub use request::{
    Content, ContentConfig, ContentRequest, ImageConfig, InlineData, OutputOptions, ProviderRequest,
    RequestPart, SynthesisInstance, SynthesisParameters, SynthesisRequest, PRO_IMAGE_SIZE,
};
pub use response::{
    Candidate, CandidateContent, ContentResponse, Prediction, PromptFeedback, ProviderResponse,
    ResponseInlineData, ResponsePart, SynthesisResponse,
};
pub use types::{
    AspectRatio, GeneratedImage, GenerationConfig, GenerationMode, ImageFormat, ModelTier,
};
