//! The generative model collaborator.
//!
//! The pipeline treats the model as an opaque, possibly slow, possibly failing
//! black box behind [`ModelClient`]. An OpenAI-compatible HTTP implementation
//! is available with the `http-client` feature.

use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[cfg(feature = "http-client")]
mod http;

#[cfg(feature = "http-client")]
pub use http::HttpModelClient;

/// Token accounting reported by a model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub response_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.response_tokens)
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.response_tokens = self.response_tokens.saturating_add(other.response_tokens);
    }
}

/// A successful model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput<T> {
    pub data: T,
    pub usage: Option<TokenUsage>,
}

impl<T> ModelOutput<T> {
    pub fn new(data: T) -> Self {
        Self { data, usage: None }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A client for the external generative model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Requests a JSON-shaped response.
    async fn generate_json(
        &self,
        prompt: &str,
    ) -> Result<ModelOutput<serde_json::Value>, ModelError>;

    /// Requests unstructured prose.
    async fn generate_text(&self, prompt: &str) -> Result<ModelOutput<String>, ModelError>;
}

/// Extracts the JSON object from a model reply that may be wrapped in a
/// Markdown code fence or surrounded by prose.
pub fn extract_json(reply: &str) -> Result<serde_json::Value, ModelError> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&trimmed[start..=end])
            .map_err(|e| ModelError::InvalidJson(e.to_string())),
        _ => Err(ModelError::InvalidJson(
            "no JSON object found in model reply".to_string(),
        )),
    }
}
