pub mod worker;

use crate::{error::Result, models::GeneratorPayload};
use async_trait::async_trait;
use rand::Rng;

pub use worker::WorkerGenerator;

pub const STYLE_SUFFIX: &str =
    "pop art style, vibrant colors, comic book style, halftone dots, bold outlines";
pub const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, ugly, text, watermark";

/// Builds the generator payload for a user prompt. Every call draws a fresh
/// seed so identical prompts still produce different images.
pub fn build_payload(prompt: &str) -> GeneratorPayload {
    GeneratorPayload {
        prompt: format!("{}, {}", prompt.trim(), STYLE_SUFFIX),
        negative_prompt: NEGATIVE_PROMPT.to_string(),
        seed: rand::thread_rng().gen(),
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Fails with a configuration error when the generator cannot be reached
    /// at all. Checked before the request body is looked at.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the raw image bytes produced for `payload`.
    async fn generate(&self, payload: &GeneratorPayload) -> Result<Vec<u8>>;
}
