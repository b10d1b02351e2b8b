use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ModelError;
use super::ClassifierClient;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Message format of Ollama's native /api/chat API.
#[derive(Debug, Serialize, Deserialize)]
struct OllamaApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaApiMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    #[serde(alias = "name")]
    model: String,
}

/// Client for a local Ollama instance, used to run the judge models.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ModelError> {
        let base = self.endpoint.trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|e| ModelError::InvalidEndpoint(e.to_string()))
    }

    /// Names of the models installed on the Ollama instance.
    pub async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let url = self.url("/api/tags")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::UpstreamStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let tags: OllamaTagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.model).collect())
    }
}

#[async_trait]
impl ClassifierClient for OllamaClient {
    async fn classify(
        &self,
        system_prompt: &str,
        user_content: &str,
        model_id: &str,
    ) -> Result<String, ModelError> {
        let url = self.url("/api/chat")?;
        let body = json!({
            "model": model_id,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
            "stream": false,
        });

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response.json().await?;
        let text = parsed.message.map(|m| m.content).unwrap_or_default();
        Ok(text.trim().to_string())
    }
}
