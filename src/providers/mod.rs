//! Upstream text generation

pub mod gemini;

use async_trait::async_trait;

// Re-export for convenience
pub use gemini::GeminiClient;

/// Anything that turns a prompt into generated text.
/// Implementations are shared across concurrent requests.
#[async_trait]
pub trait TextGenerator: Send + Sync
{   /// Generate the full (non-streaming) text for a prompt
    async fn generate(&self, prompt: &str) -> crate::GenerateReply;

    /// Model identifier, for logs
    fn model(&self) -> &str;
}
