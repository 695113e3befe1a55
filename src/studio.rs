//! Interactive session state: form fields, uploads, and the gallery.

use crate::error::{Result, VisionError};
use crate::gallery::SessionGallery;
use crate::image::{
    data_url, AspectRatio, GeneratedImage, GenerationBackend, GenerationConfig, GenerationMode,
    ImageFormat, ImageGenerator, ModelTier,
};
use std::path::Path;

/// Largest accepted reference upload, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const EMPTY_PROMPT: &str = "Please enter a prompt description.";
const MISSING_UPLOAD: &str = "Please upload an image to edit.";
const UPLOAD_TOO_LARGE: &str = "File size too large. Please upload an image under 5MB.";

/// One user session: the current form plus everything generated so far.
///
/// [`submit`](Self::submit) borrows the studio mutably, so only one
/// generation can be in flight per session.
#[derive(Debug)]
pub struct Studio<B> {
    generator: ImageGenerator<B>,
    gallery: SessionGallery,
    mode: GenerationMode,
    prompt: String,
    aspect_ratio: AspectRatio,
    model: ModelTier,
    uploaded_image: Option<String>,
    error: Option<String>,
}

impl<B: GenerationBackend> Studio<B> {
    /// Starts an empty session.
    pub fn new(generator: ImageGenerator<B>) -> Self {
        Self {
            generator,
            gallery: SessionGallery::new(),
            mode: GenerationMode::Create,
            prompt: String::new(),
            aspect_ratio: AspectRatio::default(),
            model: ModelTier::default(),
            uploaded_image: None,
            error: None,
        }
    }

    /// Images generated so far, newest first.
    pub fn gallery(&self) -> &SessionGallery {
        &self.gallery
    }

    /// Current mode.
    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Current prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Selected aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Selected model tier.
    pub fn model(&self) -> ModelTier {
        self.model
    }

    /// Uploaded reference image, as a data URL.
    pub fn uploaded_image(&self) -> Option<&str> {
        self.uploaded_image.as_deref()
    }

    /// Message from the last failed action, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The newest generated image.
    pub fn latest(&self) -> Option<&GeneratedImage> {
        self.gallery.latest()
    }

    /// Switches between create and edit.
    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.mode = mode;
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Selects the aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// Selects the model tier.
    pub fn set_model(&mut self, model: ModelTier) {
        self.model = model;
    }

    /// Stores an uploaded reference image and switches to edit mode.
    ///
    /// `size_bytes` is the size of the uploaded file.
    pub fn upload_reference(&mut self, image: impl Into<String>, size_bytes: u64) -> Result<()> {
        check_upload_size(size_bytes).map_err(|e| self.fail(e))?;
        self.set_reference(image.into());
        Ok(())
    }

    /// Reads an image file and uploads it as the reference.
    pub fn upload_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = load_reference_file(path).map_err(|e| self.fail(e))?;
        self.set_reference(image);
        Ok(())
    }

    /// Drops the uploaded reference image.
    pub fn clear_upload(&mut self) {
        self.uploaded_image = None;
    }

    /// Loads a gallery image as the reference for a variation.
    pub fn select_for_edit(&mut self, id: &str) -> Result<()> {
        let Some(image) = self.gallery.select(id) else {
            return Err(self.fail(VisionError::ImageNotFound(id.to_string())));
        };
        let (url, prompt) = (image.url.clone(), format!("Variation of: {}", image.prompt));
        self.set_reference(url);
        self.prompt = prompt;
        Ok(())
    }

    /// Removes an image from the gallery. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> Option<GeneratedImage> {
        self.gallery.delete(id)
    }

    /// Validates the form and builds the config for the next generation.
    pub fn build_config(&self) -> Result<GenerationConfig> {
        if self.prompt.trim().is_empty() {
            return Err(VisionError::Validation(EMPTY_PROMPT.into()));
        }

        let reference_image = match self.mode {
            GenerationMode::Create => None,
            GenerationMode::Edit => Some(
                self.uploaded_image
                    .clone()
                    .ok_or_else(|| VisionError::Validation(MISSING_UPLOAD.into()))?,
            ),
        };

        Ok(GenerationConfig {
            prompt: self.prompt.clone(),
            aspect_ratio: self.aspect_ratio,
            model: self.model,
            reference_image,
        })
    }

    /// Generates an image from the current form and adds it to the gallery.
    ///
    /// On failure the error is recorded and the gallery is left untouched.
    pub async fn submit(&mut self) -> Result<GeneratedImage> {
        let config = self.build_config().map_err(|e| self.fail(e))?;
        self.error = None;

        let url = match self.generator.generate(&config).await {
            Ok(url) => url,
            Err(e) => return Err(self.fail(e)),
        };

        let image = GeneratedImage::from_config(&config, url);
        self.gallery
            .insert(image.clone())
            .map_err(|e| self.fail(e))?;
        tracing::debug!(id = %image.id, model = %image.model, "added image to gallery");
        Ok(image)
    }

    fn set_reference(&mut self, image: String) {
        self.uploaded_image = Some(image);
        self.mode = GenerationMode::Edit;
        self.error = None;
    }

    fn fail(&mut self, err: VisionError) -> VisionError {
        self.error = Some(err.detail());
        err
    }
}

/// Reads an image file and encodes it as a data URL, enforcing
/// [`MAX_UPLOAD_BYTES`].
pub fn load_reference_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let size = std::fs::metadata(path)?.len();
    check_upload_size(size)?;
    let data = std::fs::read(path)?;
    let format = ImageFormat::from_magic_bytes(&data).unwrap_or_default();
    tracing::debug!(path = %path.display(), size, format = format.mime_type(), "loaded reference image");
    Ok(data_url::encode(&data, format))
}

fn check_upload_size(size_bytes: u64) -> Result<()> {
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(VisionError::Validation(UPLOAD_TOO_LARGE.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::generator::testing::ScriptedBackend;
    use std::sync::Arc;

    const IMAGE_REPLY: &str =
        r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#;
    const REFUSAL_REPLY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"no"}]}}]}"#;

    fn studio(backend: ScriptedBackend) -> (Studio<Arc<ScriptedBackend>>, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        (Studio::new(ImageGenerator::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn test_submit_adds_to_gallery() {
        let (mut studio, backend) = studio(ScriptedBackend::default().reply_json(IMAGE_REPLY));
        studio.set_prompt("a red cube");

        let image = studio.submit().await.unwrap();

        assert_eq!(image.url, "data:image/png;base64,AAAA");
        assert_eq!(image.prompt, "a red cube");
        assert_eq!(studio.gallery().len(), 1);
        assert_eq!(studio.latest(), Some(&image));
        assert!(studio.error().is_none());
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_before_request() {
        let (mut studio, backend) = studio(ScriptedBackend::default());
        studio.set_prompt("   ");

        let err = studio.submit().await.unwrap_err();

        assert!(matches!(err, VisionError::Validation(_)));
        assert_eq!(studio.error(), Some(EMPTY_PROMPT));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_without_upload_is_rejected() {
        let (mut studio, backend) = studio(ScriptedBackend::default());
        studio.set_prompt("make it blue");
        studio.set_mode(GenerationMode::Edit);

        assert!(studio.submit().await.is_err());
        assert_eq!(studio.error(), Some(MISSING_UPLOAD));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_leaves_gallery_untouched() {
        let (mut studio, _) = studio(
            ScriptedBackend::default()
                .reply_json(IMAGE_REPLY)
                .reply_json(REFUSAL_REPLY),
        );
        studio.set_prompt("first");
        let first = studio.submit().await.unwrap();

        studio.set_prompt("second");
        let err = studio.submit().await.unwrap_err();

        assert!(matches!(err, VisionError::GenerationFailed { .. }));
        assert_eq!(
            studio.error(),
            Some("Model returned text instead of image: no")
        );
        assert_eq!(studio.gallery().len(), 1);
        assert_eq!(studio.latest(), Some(&first));
    }

    #[tokio::test]
    async fn test_create_mode_ignores_upload() {
        let (mut studio, backend) = studio(ScriptedBackend::default().reply_json(IMAGE_REPLY));
        studio.upload_reference("data:image/png;base64,REF", 10).unwrap();
        studio.set_mode(GenerationMode::Create);
        studio.set_prompt("fresh");

        studio.submit().await.unwrap();

        let requests = backend.requests.lock().unwrap();
        match &requests[0] {
            crate::image::ProviderRequest::ContentGeneration(req) => {
                assert_eq!(req.parts().len(), 1)
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_edit_sends_reference_first() {
        let (mut studio, backend) = studio(ScriptedBackend::default().reply_json(IMAGE_REPLY));
        studio.upload_reference("data:image/png;base64,REF", 10).unwrap();
        studio.set_prompt("make it blue");

        studio.submit().await.unwrap();

        let requests = backend.requests.lock().unwrap();
        let crate::image::ProviderRequest::ContentGeneration(req) = &requests[0] else {
            panic!("expected content generation");
        };
        assert_eq!(req.parts().len(), 2);
    }

    #[test]
    fn test_upload_switches_to_edit_mode() {
        let (mut studio, _) = studio(ScriptedBackend::default());
        studio.upload_reference("data:image/png;base64,AAAA", 1024).unwrap();
        assert_eq!(studio.mode(), GenerationMode::Edit);
        assert_eq!(studio.uploaded_image(), Some("data:image/png;base64,AAAA"));

        studio.clear_upload();
        assert!(studio.uploaded_image().is_none());
    }

    #[test]
    fn test_upload_too_large() {
        let (mut studio, _) = studio(ScriptedBackend::default());
        let err = studio
            .upload_reference("data:image/png;base64,AAAA", MAX_UPLOAD_BYTES + 1)
            .unwrap_err();
        assert!(matches!(err, VisionError::Validation(_)));
        assert_eq!(studio.error(), Some(UPLOAD_TOO_LARGE));
        assert!(studio.uploaded_image().is_none());
        assert_eq!(studio.mode(), GenerationMode::Create);
    }

    #[test]
    fn test_upload_file_encodes_with_sniffed_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.jpg");
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];
        std::fs::write(&path, jpeg).unwrap();

        let (mut studio, _) = studio(ScriptedBackend::default());
        studio.upload_file(&path).unwrap();

        let uploaded = studio.uploaded_image().unwrap();
        assert!(uploaded.starts_with("data:image/jpeg;base64,"));
        assert_eq!(data_url::decode(uploaded).unwrap(), jpeg);
    }

    #[test]
    fn test_upload_missing_file_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut studio, _) = studio(ScriptedBackend::default());

        let err = studio.upload_file(dir.path().join("missing.png")).unwrap_err();

        assert!(matches!(err, VisionError::Io(_)));
        assert_eq!(studio.error(), Some(err.to_string().as_str()));
        assert!(studio.uploaded_image().is_none());
        assert_eq!(studio.mode(), GenerationMode::Create);
    }

    #[test]
    fn test_load_reference_file_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::File::create(&path)
            .unwrap()
            .set_len(MAX_UPLOAD_BYTES + 1)
            .unwrap();

        let err = load_reference_file(&path).unwrap_err();
        assert_eq!(err.to_string(), UPLOAD_TOO_LARGE);

        let (mut studio, _) = studio(ScriptedBackend::default());
        assert!(studio.upload_file(&path).is_err());
        assert_eq!(studio.error(), Some(UPLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn test_select_for_edit_loads_variation() {
        let (mut studio, _) = studio(ScriptedBackend::default().reply_json(IMAGE_REPLY));
        studio.set_prompt("a castle");
        let image = studio.submit().await.unwrap();

        studio.select_for_edit(&image.id).unwrap();

        assert_eq!(studio.mode(), GenerationMode::Edit);
        assert_eq!(studio.prompt(), "Variation of: a castle");
        assert_eq!(studio.uploaded_image(), Some(image.url.as_str()));
        assert!(matches!(
            studio.select_for_edit("missing"),
            Err(VisionError::ImageNotFound(_))
        ));
        assert_eq!(studio.error(), Some("image not found: missing"));
    }

    #[tokio::test]
    async fn test_delete() {
        let (mut studio, _) = studio(ScriptedBackend::default().reply_json(IMAGE_REPLY));
        studio.set_prompt("x");
        let image = studio.submit().await.unwrap();

        assert!(studio.delete("missing").is_none());
        assert_eq!(studio.gallery().len(), 1);
        assert_eq!(studio.delete(&image.id), Some(image));
        assert!(studio.gallery().is_empty());
    }
}
