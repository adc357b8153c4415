use super::prompt;
use super::{GenerationMetrics, GenerationMode, GenerationRequest, GenerationResult};
use crate::model::{ModelClient, TokenUsage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, warn};

/// Single-shot free-text path.
///
/// There is no retry loop and no validation: any non-blank reply is accepted.
#[derive(Clone)]
pub struct TextFallbackGenerator {
    client: Arc<dyn ModelClient>,
    attempt_timeout: Duration,
}

impl TextFallbackGenerator {
    pub fn new(client: Arc<dyn ModelClient>, attempt_timeout: Duration) -> Self {
        Self {
            client,
            attempt_timeout,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let started = Instant::now();
        let prompt = prompt::text_prompt(request);

        let reply = match timeout(self.attempt_timeout, self.client.generate_text(&prompt)).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(session = %request.session_id, "text generation timed out");
                return GenerationResult::failure(
                    GenerationMode::Text,
                    0,
                    format!(
                        "Model call exceeded the attempt deadline of {:?}",
                        self.attempt_timeout
                    ),
                    GenerationMetrics::new(TokenUsage::default(), started.elapsed()),
                );
            }
        };

        match reply {
            Ok(output) => {
                let metrics =
                    GenerationMetrics::new(output.usage.unwrap_or_default(), started.elapsed());
                let text = output.data.trim();
                if text.is_empty() {
                    warn!(session = %request.session_id, "model returned blank text");
                    return GenerationResult::failure(
                        GenerationMode::Text,
                        0,
                        "Model returned an empty response",
                        metrics,
                    );
                }
                info!(session = %request.session_id, stage = %request.stage, "text summary generated");
                GenerationResult::text(text.to_string(), metrics)
            }
            Err(error) => {
                warn!(session = %request.session_id, error = %error, "text generation failed");
                GenerationResult::failure(
                    GenerationMode::Text,
                    0,
                    error.to_string(),
                    GenerationMetrics::new(TokenUsage::default(), started.elapsed()),
                )
            }
        }
    }
}
