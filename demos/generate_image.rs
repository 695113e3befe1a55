//! Basic image generation example.
//!
//! Run with: `cargo run --example generate_image`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use bananavision::{
    AspectRatio, GeminiBackend, GeneratedImage, GenerationConfig, ImageGenerator, ModelTier,
};

#[tokio::main]
async fn main() -> bananavision::Result<()> {
    let generator = ImageGenerator::new(GeminiBackend::builder().build()?);

    let config = GenerationConfig::new("A golden retriever puppy playing in snow")
        .with_model(ModelTier::ImagenFast)
        .with_aspect_ratio(AspectRatio::Wide);
    let url = generator.generate(&config).await?;

    let image = GeneratedImage::from_config(&config, url);
    image.save("output.png")?;
    println!("Generated image {} with {}", image.id, image.model_label());

    Ok(())
}
