//! # uispec - Stage-Scoped UI Specification Generation
//!
//! **uispec** turns a free-text concern into a validated UI specification
//! document by querying a generative model and checking its output against a
//! stage-scoped widget catalog. It also ships the small formula language that
//! consumers of those documents use to decide field visibility, enablement and
//! computed values at render time.
//!
//! ## Core Workflow
//!
//! 1.  **Describe the Catalog**: [`catalog::StageCatalog`] maps each [`catalog::Stage`] to the
//!     widget kinds eligible there, optionally limited to the kinds that are actually implemented.
//! 2.  **Plug in a Model**: implement [`model::ModelClient`] for your backend, or enable the
//!     `http-client` feature and use `HttpModelClient` for OpenAI-compatible endpoints.
//! 3.  **Generate**: build a [`generator::SpecificationGenerator`] and call `generate`. Invalid
//!     model output is retried up to `max_retries` times; stages without eligible widgets fall back
//!     to a free-text summary.
//! 4.  **Evaluate Formulas**: at render time, run `visibleWhen`/`enabledWhen`/`computed` formulas
//!     with [`evaluator::evaluate_condition`] (fail-open) and [`evaluator::evaluate_expression`]
//!     (fail-closed).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use uispec::prelude::*;
//! use async_trait::async_trait;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct CannedModel;
//!
//! #[async_trait]
//! impl ModelClient for CannedModel {
//!     async fn generate_json(&self, _prompt: &str) -> std::result::Result<ModelOutput<serde_json::Value>, ModelError> {
//!         Ok(ModelOutput::new(json!({
//!             "sessionId": "s-1",
//!             "stage": "summary",
//!             "widgets": [{ "component": "structured_summary" }]
//!         })))
//!     }
//!
//!     async fn generate_text(&self, _prompt: &str) -> std::result::Result<ModelOutput<String>, ModelError> {
//!         Ok(ModelOutput::new("A short summary.".to_string()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let generator = SpecificationGenerator::builder(Arc::new(CannedModel)).build()?;
//!
//!     let request = GenerationRequest::new("s-1", "Should I change jobs?", Stage::Summary);
//!     let result = generator.generate(&request).await?;
//!     println!("success: {}, retries: {}", result.success, result.retry_count);
//!
//!     let data = json!({ "items": [{ "amount": 2 }, { "amount": 3 }] });
//!     assert!(evaluate_condition("count(items) > 1", &data));
//!     println!("{:?}", evaluate_expression("sum(items, 'amount')", &data));
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod prelude;
pub mod store;
