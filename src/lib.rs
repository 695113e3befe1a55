#![warn(missing_docs)]
//! BananaVision - prompt-to-image generation with Gemini and Imagen.
//!
//! This crate turns a small generation config (prompt, model tier, aspect
//! ratio, optional reference image) into the right Google API call, and
//! normalizes whatever comes back into a single PNG data URL.
//!
//! # Quick Start
//!
//! ```no_run
//! use bananavision::{GeminiBackend, GenerationConfig, ImageGenerator, ModelTier};
//!
//! #[tokio::main]
//! async fn main() -> bananavision::Result<()> {
//!     let generator = ImageGenerator::new(GeminiBackend::builder().build()?);
//!     let config = GenerationConfig::new("A golden retriever puppy").with_model(ModelTier::Pro);
//!     let data_url = generator.generate(&config).await?;
//!     println!("{}", &data_url[..40]);
//!     Ok(())
//! }
//! ```
//!
//! # Sessions
//!
//! [`Studio`] keeps the form state of an interactive session and a
//! [`SessionGallery`] of everything generated so far:
//!
//! ```no_run
//! use bananavision::{GeminiBackend, ImageGenerator, Studio};
//!
//! # async fn run() -> bananavision::Result<()> {
//! let mut studio = Studio::new(ImageGenerator::new(GeminiBackend::builder().build()?));
//! studio.set_prompt("A lighthouse at dusk");
//! let image = studio.submit().await?;
//! studio.select_for_edit(&image.id)?;
//! studio.submit().await?;
//! assert_eq!(studio.gallery().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `bananavision` command-line front-end

mod error;
pub mod gallery;
pub mod image;
pub mod studio;

// Re-export error types at crate root
pub use error::{Result, VisionError};

pub use gallery::SessionGallery;
pub use image::providers::{GeminiBackend, GeminiBackendBuilder};
pub use image::{
    AspectRatio, GeneratedImage, GenerationBackend, GenerationConfig, GenerationMode, ImageFormat,
    ImageGenerator, ModelTier, ProviderRequest, ProviderResponse,
};
pub use studio::Studio;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, VisionError};
    pub use crate::gallery::SessionGallery;
    pub use crate::image::providers::GeminiBackend;
    pub use crate::image::{
        AspectRatio, GeneratedImage, GenerationBackend, GenerationConfig, ImageGenerator,
        ModelTier,
    };
    pub use crate::studio::Studio;
}
