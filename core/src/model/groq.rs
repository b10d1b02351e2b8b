use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::error::ModelError;
use super::GenerationClient;
use crate::types::ChatMessage;

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for Groq's OpenAI-compatible chat completions API.
///
/// The API key is read from the environment at construction; a missing key
/// surfaces as an error on the first completion, not at startup, so the
/// server can come up and report the problem through /health.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl GroqClient {
    pub fn new(api_url: Option<String>, model: String) -> Self {
        let api_key = std::env::var(GROQ_API_KEY_VAR)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            client: Client::new(),
            api_url: api_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GROQ_API_URL.to_string()),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GenerationClient for GroqClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ModelError::MissingApiKey("Groq"))?;

        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        tracing::info!(model = %self.model, messages = messages.len(), "groq chat completion");
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Auth(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        tracing::info!(elapsed = ?started.elapsed(), len = text.len(), "groq response");
        Ok(text.trim().to_string())
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
