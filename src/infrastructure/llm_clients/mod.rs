pub mod gemini;

use async_trait::async_trait;

use crate::domain::error::Result;

pub use gemini::GeminiClient;

/// A text-generation backend: one free-text prompt in, one completion out.
#[async_trait]
pub trait LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
