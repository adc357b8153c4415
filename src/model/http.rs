use super::{ModelClient, ModelOutput, TokenUsage, extract_json};
use crate::error::ModelError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value as JsonValue, json};
use tracing::debug;

/// A [`ModelClient`] for OpenAI-compatible `/chat/completions` endpoints.
pub struct HttpModelClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl HttpModelClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            temperature: 0.7,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn chat(&self, prompt: &str, json_mode: bool) -> Result<ModelOutput<String>, ModelError> {
        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(url = %url, json_mode, "sending model request");
        let response = request
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: JsonValue = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidJson(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)?
            .to_string();

        let usage = payload.get("usage").map(|usage| TokenUsage {
            prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0),
            response_tokens: usage["completion_tokens"].as_u64().unwrap_or(0),
        });

        Ok(ModelOutput {
            data: content,
            usage,
        })
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate_json(&self, prompt: &str) -> Result<ModelOutput<JsonValue>, ModelError> {
        let reply = self.chat(prompt, true).await?;
        Ok(ModelOutput {
            data: extract_json(&reply.data)?,
            usage: reply.usage,
        })
    }

    async fn generate_text(&self, prompt: &str) -> Result<ModelOutput<String>, ModelError> {
        self.chat(prompt, false).await
    }
}
