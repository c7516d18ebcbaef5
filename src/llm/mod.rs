//! Text generation backends and prompt templates.

mod client;
pub mod prompts;

use async_trait::async_trait;

pub use client::{LlmClient, LlmConfig, LlmError, LlmProvider};
pub use prompts::{PromptError, PromptSet};

/// Something that turns a prompt into generated text.
///
/// Implemented by [`LlmClient`]; tests substitute scripted generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, bounded by `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}
