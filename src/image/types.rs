//! Core types for image generation.

use crate::error::{Result, VisionError};
use crate::image::data_url;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Looks up a format by MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Model tiers offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelTier {
    /// Nano Banana - Gemini 2.5 Flash Image (fast).
    #[default]
    #[serde(rename = "gemini-2.5-flash-image")]
    Flash,
    /// Nano Banana Pro - Gemini 3 Pro Image (HD).
    #[serde(rename = "gemini-3-pro-image-preview")]
    Pro,
    /// Imagen 4 Fast.
    #[serde(rename = "imagen-4.0-fast-generate-001")]
    ImagenFast,
}

impl ModelTier {
    /// Every tier, in menu order.
    pub const ALL: [ModelTier; 3] = [Self::Flash, Self::Pro, Self::ImagenFast];

    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
            Self::ImagenFast => "imagen-4.0-fast-generate-001",
        }
    }

    /// Returns the display name for menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Flash => "Nano Banana (Fast)",
            Self::Pro => "Nano Banana Pro (HD)",
            Self::ImagenFast => "Imagen 4 Fast",
        }
    }

    /// Returns true for tiers served by the image synthesis endpoint.
    pub fn is_imagen(&self) -> bool {
        matches!(self, Self::ImagenFast)
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aspect ratios accepted by every tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 3:4 portrait.
    #[serde(rename = "3:4")]
    Portrait,
    /// 4:3 landscape.
    #[serde(rename = "4:3")]
    Landscape,
    /// 16:9 widescreen.
    #[serde(rename = "16:9")]
    Wide,
    /// 9:16 tall.
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    /// Every ratio, in menu order.
    pub const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Wide,
        Self::Tall,
        Self::Portrait,
        Self::Landscape,
    ];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Landscape => "4:3",
            Self::Wide => "16:9",
            Self::Tall => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| VisionError::InvalidRequest(format!("unsupported aspect ratio: {s}")))
    }
}

/// Whether the user is creating from scratch or editing a reference image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Text-to-image.
    #[default]
    Create,
    /// Image + text to image.
    Edit,
}

/// Input to a single generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// The text prompt describing the desired image or edit.
    pub prompt: String,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Model tier to generate with.
    pub model: ModelTier,
    /// Reference image as a data URL or bare base64 payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
}

impl GenerationConfig {
    /// Creates a config with the default tier and ratio.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            model: ModelTier::default(),
            reference_image: None,
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Sets the model tier.
    pub fn with_model(mut self, model: ModelTier) -> Self {
        self.model = model;
        self
    }

    /// Attaches a reference image for editing.
    pub fn with_reference_image(mut self, image: impl Into<String>) -> Self {
        self.reference_image = Some(image.into());
        self
    }

    /// Returns the mode implied by the presence of a reference image.
    pub fn mode(&self) -> GenerationMode {
        if self.reference_image.is_some() {
            GenerationMode::Edit
        } else {
            GenerationMode::Create
        }
    }
}

/// A generated image as kept in the session gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Unique id within the session.
    pub id: String,
    /// Image as a data URL.
    pub url: String,
    /// Prompt that produced the image.
    pub prompt: String,
    /// Creation instant, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Tier that produced the image.
    pub model: ModelTier,
    /// Ratio the image was requested at.
    pub aspect_ratio: AspectRatio,
}

impl GeneratedImage {
    /// Builds a record for a successful generation.
    pub fn from_config(config: &GenerationConfig, url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            prompt: config.prompt.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            model: config.model,
            aspect_ratio: config.aspect_ratio,
        }
    }

    /// Suggested file name for downloads.
    pub fn download_name(&self) -> String {
        format!("banana-vision-{}.png", self.id)
    }

    /// Short model label for captions.
    pub fn model_label(&self) -> String {
        self.model
            .as_str()
            .replace("gemini-", "")
            .replace("imagen-", "")
            .replace("-preview", "")
    }

    /// Creation time as an RFC 3339 string.
    pub fn created_at(&self) -> Option<String> {
        chrono::DateTime::from_timestamp_millis(self.timestamp).map(|t| t.to_rfc3339())
    }

    /// Decodes the image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        data_url::decode(&self.url)
    }

    /// Saves the decoded image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = self.bytes()?;
        if data.is_empty() {
            return Err(VisionError::Decode("image has no data".into()));
        }
        std::fs::write(path, &data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"short"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(ImageFormat::from_mime_type("image/jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime_type("IMAGE/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime_type("text/plain"), None);
    }

    #[test]
    fn test_model_tier_ids() {
        assert_eq!(ModelTier::Flash.as_str(), "gemini-2.5-flash-image");
        assert_eq!(ModelTier::Pro.as_str(), "gemini-3-pro-image-preview");
        assert_eq!(ModelTier::ImagenFast.as_str(), "imagen-4.0-fast-generate-001");
        assert_eq!(ModelTier::default(), ModelTier::Flash);
    }

    #[test]
    fn test_model_tier_serde_uses_model_id() {
        let json = serde_json::to_string(&ModelTier::ImagenFast).unwrap();
        assert_eq!(json, "\"imagen-4.0-fast-generate-001\"");
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Wide);
        assert_eq!("3:4".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert!("21:9".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::default().as_str(), "1:1");
    }

    #[test]
    fn test_config_mode() {
        let config = GenerationConfig::new("a red cube");
        assert_eq!(config.mode(), GenerationMode::Create);
        let config = config.with_reference_image("data:image/png;base64,AAAA");
        assert_eq!(config.mode(), GenerationMode::Edit);
    }

    #[test]
    fn test_generated_image_from_config() {
        let config = GenerationConfig::new("a red cube")
            .with_model(ModelTier::Pro)
            .with_aspect_ratio(AspectRatio::Tall);
        let a = GeneratedImage::from_config(&config, "data:image/png;base64,AAAA");
        let b = GeneratedImage::from_config(&config, "data:image/png;base64,AAAA");

        assert_ne!(a.id, b.id);
        assert_eq!(a.prompt, "a red cube");
        assert_eq!(a.model, ModelTier::Pro);
        assert_eq!(a.aspect_ratio, AspectRatio::Tall);
        assert!(a.timestamp > 0);
        assert!(a.created_at().is_some());
    }

    #[test]
    fn test_model_label() {
        let config = GenerationConfig::new("x").with_model(ModelTier::Pro);
        let image = GeneratedImage::from_config(&config, "AAAA");
        assert_eq!(image.model_label(), "3-pro-image");

        let config = GenerationConfig::new("x").with_model(ModelTier::ImagenFast);
        let image = GeneratedImage::from_config(&config, "AAAA");
        assert_eq!(image.model_label(), "4.0-fast-generate-001");
    }

    #[test]
    fn test_download_name() {
        let config = GenerationConfig::new("x");
        let image = GeneratedImage::from_config(&config, "AAAA");
        assert_eq!(image.download_name(), format!("banana-vision-{}.png", image.id));
    }

    #[test]
    fn test_save_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let config = GenerationConfig::new("x");
        let url = data_url::encode(&PNG_MAGIC, ImageFormat::Png);
        let image = GeneratedImage::from_config(&config, url);

        image.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC);
    }
}
