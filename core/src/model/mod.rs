pub mod error;
mod groq;
mod ollama;

pub use groq::{GroqClient, DEFAULT_GROQ_API_URL, GROQ_API_KEY_VAR};
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_ENDPOINT};

use crate::types::ChatMessage;
use error::ModelError;

/// Text-classification capability consumed by the guard engine.
#[async_trait::async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Ask the judge model for a raw free-text judgment. Output shape is not
    /// guaranteed; callers run it through the verdict normalizer.
    async fn classify(
        &self,
        system_prompt: &str,
        user_content: &str,
        model_id: &str,
    ) -> Result<String, ModelError>;
}

/// Upstream generation capability that produces the reply to be checked.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError>;

    fn model_name(&self) -> String;
}
