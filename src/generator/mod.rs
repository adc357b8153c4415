//! The specification generator.
//!
//! A [`SpecificationGenerator`] turns a [`GenerationRequest`] into a
//! [`GenerationResult`]. Widget mode runs a bounded retry loop in which every
//! attempt goes through the same steps:
//!
//! 1. call the model for JSON, under the attempt deadline
//! 2. fill omitted optional fields with defaults
//! 3. validate against the stage's eligible widgets
//!
//! A model failure, a timeout and a set of violations are all equally
//! retry-worthy. The first clean attempt wins. When every attempt fails, the
//! result carries `success: false` and the last recorded error.
//!
//! Text mode is used when the caller asks for it or when the stage has no
//! eligible widgets. It is a single model call with no validation.

mod prompt;
mod request;
mod result;
mod text;

pub use prompt::{MAX_WIDGETS, MIN_WIDGETS, stage_instruction};
pub use request::*;
pub use result::*;
pub use text::TextFallbackGenerator;

use crate::catalog::StageCatalog;
use crate::config::GeneratorConfig;
use crate::document::{UiSpecDocument, accept_document};
use crate::error::{AttemptError, ConfigError, RequestError};
use crate::metrics::{MetricsRecord, MetricsStore};
use crate::model::{ModelClient, TokenUsage};
use crate::store::SpecStore;
use rand::Rng;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub struct SpecificationGenerator {
    client: Arc<dyn ModelClient>,
    catalog: StageCatalog,
    config: GeneratorConfig,
    metrics: Arc<MetricsStore>,
    store: Option<Arc<dyn SpecStore>>,
    text: TextFallbackGenerator,
}

impl SpecificationGenerator {
    pub fn builder(client: Arc<dyn ModelClient>) -> SpecificationGeneratorBuilder {
        SpecificationGeneratorBuilder::new(client)
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    /// Runs one generation call.
    ///
    /// # Errors
    ///
    /// Only request-shape problems are returned as `Err`, before any model
    /// call. Generation failures are reported inside the [`GenerationResult`].
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, RequestError> {
        request.validate()?;

        let eligible = self
            .catalog
            .eligible_widgets(request.stage, request.options.restrict_to_implemented);

        let result = if request.options.text_only_mode || eligible.is_empty() {
            info!(
                session = %request.session_id,
                stage = %request.stage,
                requested = request.options.text_only_mode,
                "using text fallback"
            );
            self.text.generate(request).await
        } else {
            self.generate_widgets(request, &eligible).await
        };

        if let Some(metrics) = result.metrics {
            self.metrics.record(
                &request.session_id,
                MetricsRecord {
                    mode: result.mode,
                    success: result.success,
                    retry_count: result.retry_count,
                    metrics,
                },
            );
        }

        Ok(result)
    }

    async fn generate_widgets(
        &self,
        request: &GenerationRequest,
        eligible: &[&str],
    ) -> GenerationResult {
        let started = Instant::now();
        let base_prompt = prompt::widget_prompt(request, &self.catalog.describe(eligible), eligible);
        let max_retries = self.config.max_retries;

        let mut usage = TokenUsage::default();
        let mut last_error: Option<AttemptError> = None;

        for attempt in 1..=max_retries {
            if attempt > 1 {
                self.back_off().await;
            }

            let prompt: Cow<'_, str> = match &last_error {
                Some(AttemptError::Validation(violations)) if self.config.feedback_violations => {
                    Cow::Owned(prompt::with_feedback(&base_prompt, violations))
                }
                _ => Cow::Borrowed(base_prompt.as_str()),
            };

            debug!(session = %request.session_id, attempt, max_retries, "starting attempt");
            match self.attempt(&prompt, eligible, &mut usage).await {
                Ok(document) => {
                    info!(
                        session = %request.session_id,
                        attempt,
                        widgets = document.widgets.len(),
                        "ui specification accepted"
                    );
                    self.persist(&document).await;
                    let metrics = GenerationMetrics::new(usage, started.elapsed());
                    return GenerationResult::widget(document, attempt - 1, metrics);
                }
                Err(error) => {
                    warn!(
                        session = %request.session_id,
                        attempt,
                        max_retries,
                        error = %error,
                        "generation attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        let error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no generation attempt was made".to_string());
        GenerationResult::failure(
            GenerationMode::Widget,
            max_retries,
            error,
            GenerationMetrics::new(usage, started.elapsed()),
        )
    }

    async fn attempt(
        &self,
        prompt: &str,
        eligible: &[&str],
        usage: &mut TokenUsage,
    ) -> Result<UiSpecDocument, AttemptError> {
        let deadline = self.config.attempt_timeout();
        let output = timeout(deadline, self.client.generate_json(prompt))
            .await
            .map_err(|_| AttemptError::Timeout(deadline))??;

        if let Some(reported) = output.usage {
            *usage += reported;
        }

        if !output.data.is_object() {
            return Err(AttemptError::MalformedPayload(
                json_kind(&output.data).to_string(),
            ));
        }

        accept_document(output.data, Some(eligible)).map_err(AttemptError::Validation)
    }

    async fn back_off(&self) {
        let Some(base) = self.config.retry_backoff() else {
            return;
        };
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let jitter = rand::rng().random_range(0..=base_ms / 2);
        tokio::time::sleep(base + Duration::from_millis(jitter)).await;
    }

    async fn persist(&self, document: &UiSpecDocument) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(error) = store.save(document).await {
            warn!(session = %document.session_id, error = %error, "failed to persist ui specification");
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Assembles a [`SpecificationGenerator`].
///
/// Without an explicit metrics store, one sized from the configuration is
/// created. The spec store is optional.
pub struct SpecificationGeneratorBuilder {
    client: Arc<dyn ModelClient>,
    catalog: StageCatalog,
    config: GeneratorConfig,
    metrics: Option<Arc<MetricsStore>>,
    store: Option<Arc<dyn SpecStore>>,
}

impl SpecificationGeneratorBuilder {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            catalog: StageCatalog::default(),
            config: GeneratorConfig::default(),
            metrics: None,
            store: None,
        }
    }

    pub fn catalog(mut self, catalog: StageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metrics(mut self, metrics: Arc<MetricsStore>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(mut self, store: Arc<dyn SpecStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<SpecificationGenerator, ConfigError> {
        self.config.validate()?;

        let metrics = self.metrics.unwrap_or_else(|| {
            Arc::new(MetricsStore::new(
                self.config.metrics_max_sessions,
                self.config.metrics_max_entries,
            ))
        });
        let text = TextFallbackGenerator::new(self.client.clone(), self.config.attempt_timeout());

        Ok(SpecificationGenerator {
            client: self.client,
            catalog: self.catalog,
            config: self.config,
            metrics,
            store: self.store,
            text,
        })
    }
}
