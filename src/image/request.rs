//! Request adapter: turns a [`GenerationConfig`] into one of the two
//! provider request shapes.

use crate::image::data_url;
use crate::image::types::{GenerationConfig, ImageFormat, ModelTier};
use serde::Serialize;

/// Size hint sent to the Pro tier.
pub const PRO_IMAGE_SIZE: &str = "1K";

/// Modalities requested from the content generation endpoint.
const RESPONSE_MODALITIES: [&str; 2] = ["TEXT", "IMAGE"];

/// A request ready to hand to a generation backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRequest {
    /// Imagen `predict` call.
    ImageSynthesis(SynthesisRequest),
    /// Gemini `generateContent` call.
    ContentGeneration(ContentRequest),
}

impl ProviderRequest {
    /// Adapts a config to the request shape its model tier needs.
    pub fn from_config(config: &GenerationConfig) -> Self {
        match config.model {
            ModelTier::ImagenFast => Self::ImageSynthesis(SynthesisRequest::from_config(config)),
            ModelTier::Flash | ModelTier::Pro => {
                Self::ContentGeneration(ContentRequest::from_config(config))
            }
        }
    }

    /// Model the request is addressed to.
    pub fn model(&self) -> ModelTier {
        match self {
            Self::ImageSynthesis(req) => req.model,
            Self::ContentGeneration(req) => req.model,
        }
    }
}

/// Body of an Imagen `predict` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    /// Addressed model; part of the URL, not the body.
    #[serde(skip)]
    pub model: ModelTier,
    /// Prompt instances (always one).
    pub instances: Vec<SynthesisInstance>,
    /// Output parameters.
    pub parameters: SynthesisParameters,
}

/// One prompt in a synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisInstance {
    /// Prompt text.
    pub prompt: String,
}

/// Output parameters of a synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisParameters {
    /// Number of images to produce.
    pub sample_count: u32,
    /// Encoding of the produced image.
    pub output_options: OutputOptions,
    /// Aspect ratio, e.g. `"16:9"`.
    pub aspect_ratio: String,
}

/// Output encoding of a synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    /// Output MIME type.
    pub mime_type: String,
}

impl SynthesisRequest {
    fn from_config(config: &GenerationConfig) -> Self {
        // Imagen takes no image input, so any reference image is ignored.
        Self {
            model: config.model,
            instances: vec![SynthesisInstance {
                prompt: config.prompt.clone(),
            }],
            parameters: SynthesisParameters {
                sample_count: 1,
                output_options: OutputOptions {
                    mime_type: ImageFormat::Png.mime_type().to_string(),
                },
                aspect_ratio: config.aspect_ratio.as_str().to_string(),
            },
        }
    }

    /// Prompt carried by the request.
    pub fn prompt(&self) -> &str {
        self.instances
            .first()
            .map(|i| i.prompt.as_str())
            .unwrap_or_default()
    }
}

/// Body of a Gemini `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    /// Addressed model; part of the URL, not the body.
    #[serde(skip)]
    pub model: ModelTier,
    /// Conversation contents (always one turn).
    pub contents: Vec<Content>,
    /// Generation options.
    pub generation_config: ContentConfig,
}

/// A single content turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    /// Ordered parts: optional image first, prompt text last.
    pub parts: Vec<RequestPart>,
}

/// A part in a content request - either inline image data or text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    /// Base64 image data.
    InlineData {
        /// The image payload.
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Prompt text.
    Text {
        /// The text.
        text: String,
    },
}

/// Base64 image payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload.
    pub mime_type: String,
    /// Base64 data without any data-URL header.
    pub data: String,
}

/// Generation options of a content request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentConfig {
    /// Requested output modalities.
    pub response_modalities: Vec<String>,
    /// Image output options.
    pub image_config: ImageConfig,
}

/// Image output options of a content request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Aspect ratio, e.g. `"1:1"`.
    pub aspect_ratio: String,
    /// Resolution hint; only sent to the Pro tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

impl ContentRequest {
    fn from_config(config: &GenerationConfig) -> Self {
        let mut parts = Vec::with_capacity(2);

        if let Some(ref reference) = config.reference_image {
            parts.push(RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: data_url::detect_mime_type(reference),
                    data: data_url::strip_prefix(reference).to_string(),
                },
            });
        }

        parts.push(RequestPart::Text {
            text: config.prompt.clone(),
        });

        let image_size = match config.model {
            ModelTier::Pro => Some(PRO_IMAGE_SIZE.to_string()),
            ModelTier::Flash | ModelTier::ImagenFast => None,
        };

        Self {
            model: config.model,
            contents: vec![Content { parts }],
            generation_config: ContentConfig {
                response_modalities: RESPONSE_MODALITIES.iter().map(|m| m.to_string()).collect(),
                image_config: ImageConfig {
                    aspect_ratio: config.aspect_ratio.as_str().to_string(),
                    image_size,
                },
            },
        }
    }

    /// Ordered parts of the single content turn.
    pub fn parts(&self) -> &[RequestPart] {
        self.contents
            .first()
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }
}
