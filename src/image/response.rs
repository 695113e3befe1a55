//! Response normalizer: extracts one data URL from a provider response.

use crate::error::{Result, VisionError};
use crate::image::data_url;
use serde::Deserialize;

/// A raw provider response, tagged by the request shape that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// Reply to an Imagen `predict` call.
    ImageSynthesis(SynthesisResponse),
    /// Reply to a Gemini `generateContent` call.
    ContentGeneration(ContentResponse),
}

impl ProviderResponse {
    /// Extracts the image as a PNG data URL.
    pub fn into_data_url(self) -> Result<String> {
        match self {
            Self::ImageSynthesis(resp) => resp.into_data_url(),
            Self::ContentGeneration(resp) => resp.into_data_url(),
        }
    }
}

/// Reply to an Imagen `predict` call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResponse {
    /// Generated images; omitted entirely when everything was filtered.
    #[serde(default)]
    pub predictions: Option<Vec<Prediction>>,
}

/// One generated image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Base64 image bytes.
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
    /// MIME type of the bytes.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Why the image was filtered, when it was.
    #[serde(default)]
    pub rai_filtered_reason: Option<String>,
}

impl SynthesisResponse {
    fn into_data_url(self) -> Result<String> {
        let first = self
            .predictions
            .and_then(|p| p.into_iter().next())
            .ok_or(VisionError::EmptyResult)?;

        match first.bytes_base64_encoded {
            Some(bytes) if !bytes.is_empty() => Ok(data_url::png_data_url(&bytes)),
            _ => {
                if let Some(reason) = first.rai_filtered_reason {
                    tracing::debug!(%reason, "imagen result filtered");
                }
                Err(VisionError::MissingImageData)
            }
        }
    }
}

/// Reply to a Gemini `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    /// Prompt-level feedback, present when the prompt was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One response candidate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandidateContent {
    /// Ordered parts, possibly mixing text and images.
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

/// A part of a candidate's content.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text, when the part is textual.
    #[serde(default)]
    pub text: Option<String>,
    /// Image data, when the part is an image.
    #[serde(default)]
    pub inline_data: Option<ResponseInlineData>,
}

/// Image data in a response part.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInlineData {
    /// MIME type reported by the model.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Base64 image bytes.
    #[serde(default)]
    pub data: Option<String>,
}

/// Prompt-level feedback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason, e.g. `SAFETY`.
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl ContentResponse {
    fn into_data_url(self) -> Result<String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let candidate = self
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or(VisionError::NoCandidates { block_reason })?;

        if let Some(ref reason) = candidate.finish_reason {
            tracing::debug!(finish_reason = %reason, "gemini candidate finished");
        }

        let parts = candidate
            .content
            .and_then(|c| c.parts)
            .ok_or(VisionError::NoContentParts)?;

        // First image wins; models may interleave commentary and images.
        if let Some(data) = parts
            .iter()
            .filter_map(|p| p.inline_data.as_ref()?.data.as_deref())
            .find(|d| !d.is_empty())
        {
            return Ok(data_url::png_data_url(data));
        }

        match parts
            .into_iter()
            .filter_map(|p| p.text)
            .find(|t| !t.is_empty())
        {
            Some(text) => Err(VisionError::ModelReturnedText(text)),
            None => Err(VisionError::NoImageInResponse),
        }
    }
}
