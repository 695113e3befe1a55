//! Image editing example - modifies an existing image with a text prompt,
//! then asks for a variation of the result.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use bananavision::{GeminiBackend, ImageGenerator, ModelTier, Studio};

#[tokio::main]
async fn main() -> bananavision::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit_image <input_image.png>");

    let mut studio = Studio::new(ImageGenerator::new(GeminiBackend::builder().build()?));
    studio.set_model(ModelTier::Pro);
    studio.upload_file(&input_path)?;
    studio.set_prompt("Make the colors more vibrant and add a warm sunset glow");

    let edited = studio.submit().await?;
    edited.save("edited.png")?;
    println!("Edited image saved to edited.png");

    studio.select_for_edit(&edited.id)?;
    let variation = studio.submit().await?;
    variation.save(variation.download_name())?;
    println!("Variation saved to {}", variation.download_name());

    Ok(())
}
