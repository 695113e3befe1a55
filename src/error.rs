//! Error types for image generation and the session gallery.

use std::time::Duration;

/// Detail used when a failure carries no message of its own.
pub(crate) const GENERIC_FAILURE: &str = "Failed to generate image";

/// Upper bound on provider error text surfaced to users.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while generating or managing images.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// Caller-side input check failed before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Image synthesis returned no results.
    #[error("No images returned from Imagen model.")]
    EmptyResult,

    /// The first synthesis result carried no image bytes.
    #[error("Image data is missing in the response.")]
    MissingImageData,

    /// Content generation returned no candidates.
    #[error("No candidates returned from the model.{}", block_suffix(.block_reason))]
    NoCandidates {
        /// Prompt block reason reported alongside the empty response, if any.
        block_reason: Option<String>,
    },

    /// The first candidate had no parts list.
    #[error("No content parts returned.")]
    NoContentParts,

    /// The model answered with text only (usually a refusal).
    #[error("Model returned text instead of image: {0}")]
    ModelReturnedText(String),

    /// Neither image nor text was present in the parts list.
    #[error("Model response did not contain an image.")]
    NoImageInResponse,

    /// Uniform failure returned by the generation façade.
    #[error("{detail}")]
    GenerationFailed {
        /// Human-readable reason, shown verbatim to the user.
        detail: String,
    },

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested delay, if provided.
        retry_after: Option<Duration>,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an upload or saving a file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An image with this id is already in the gallery.
    #[error("duplicate image id: {0}")]
    DuplicateImage(String),

    /// No image with this id is in the gallery.
    #[error("image not found: {0}")]
    ImageNotFound(String),
}

fn block_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" Prompt blocked: {reason}"),
        None => String::new(),
    }
}

impl VisionError {
    /// Collapses any error into [`VisionError::GenerationFailed`].
    ///
    /// An error that is already `GenerationFailed` is returned unchanged.
    pub fn into_generation_failed(self) -> Self {
        if let Self::GenerationFailed { .. } = self {
            return self;
        }
        let detail = self.to_string();
        let detail = if detail.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            detail
        };
        Self::GenerationFailed { detail }
    }

    /// Returns the user-facing detail text.
    pub fn detail(&self) -> String {
        match self {
            Self::GenerationFailed { detail } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Redacts API keys and truncates provider error text.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut cleaned = text
        .split_inclusive(|c: char| c.is_whitespace() || c == '"' || c == '&' || c == '?')
        .map(|token| {
            if let Some(pos) = token.find("key=") {
                let end = token
                    .find(|c: char| c.is_whitespace() || c == '"' || c == '&')
                    .filter(|&e| e > pos)
                    .unwrap_or(token.len());
                format!("{}key=[REDACTED]{}", &token[..pos], &token[end..])
            } else if token.starts_with("AIza") {
                let end = token
                    .find(|c: char| c.is_whitespace() || c == '"')
                    .unwrap_or(token.len());
                format!("[REDACTED]{}", &token[end..])
            } else {
                token.to_string()
            }
        })
        .collect::<String>();

    if cleaned.chars().count() > MAX_ERROR_MESSAGE_LEN {
        cleaned = cleaned.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        cleaned.push_str("...");
    }
    cleaned
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, VisionError>;
