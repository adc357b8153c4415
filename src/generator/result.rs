use crate::document::UiSpecDocument;
use crate::model::TokenUsage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Widget,
    Text,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetrics {
    pub prompt_tokens: u64,
    pub response_tokens: u64,
    pub total_tokens: u64,
    pub processing_time_ms: u64,
}

impl GenerationMetrics {
    pub fn new(usage: TokenUsage, elapsed: Duration) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            response_tokens: usage.response_tokens,
            total_tokens: usage.total(),
            processing_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Outcome of one generation call.
///
/// `ui_spec` is set only for a successful widget-mode result and
/// `text_summary` only for a successful text-mode result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub mode: GenerationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_spec: Option<UiSpecDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_summary: Option<String>,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<GenerationMetrics>,
}

impl GenerationResult {
    pub fn widget(document: UiSpecDocument, retry_count: u32, metrics: GenerationMetrics) -> Self {
        Self {
            success: true,
            mode: GenerationMode::Widget,
            ui_spec: Some(document),
            text_summary: None,
            retry_count,
            error: None,
            metrics: Some(metrics),
        }
    }

    pub fn text(summary: String, metrics: GenerationMetrics) -> Self {
        Self {
            success: true,
            mode: GenerationMode::Text,
            ui_spec: None,
            text_summary: Some(summary),
            retry_count: 0,
            error: None,
            metrics: Some(metrics),
        }
    }

    pub fn failure(
        mode: GenerationMode,
        retry_count: u32,
        error: impl Into<String>,
        metrics: GenerationMetrics,
    ) -> Self {
        Self {
            success: false,
            mode,
            ui_spec: None,
            text_summary: None,
            retry_count,
            error: Some(error.into()),
            metrics: Some(metrics),
        }
    }
}
