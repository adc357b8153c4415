//! Prelude module for convenient imports
//!
//! Re-exports the types needed to generate specifications and evaluate formulas.
//!
//! # Example
//!
//! ```rust,no_run
//! use uispec::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let formula = Formula::parse("tasks[done == true].length")?;
//! let data = serde_json::json!({ "tasks": [{ "done": true }, { "done": false }] });
//! println!("{:?}", formula.evaluate_json(&data));
//! # Ok(())
//! # }
//! ```

// Generation
pub use crate::catalog::{Stage, StageCatalog, WidgetDescriptor};
pub use crate::config::GeneratorConfig;
pub use crate::document::{UiSpecDocument, WidgetSpecEntry, fill_required_fields};
pub use crate::generator::{
    GenerationMode, GenerationOptions, GenerationRequest, GenerationResult,
    SpecificationGenerator, TextFallbackGenerator,
};
pub use crate::metrics::MetricsStore;
pub use crate::model::{ModelClient, ModelOutput, TokenUsage};
pub use crate::store::SpecStore;

// Formulas
pub use crate::ast::{Expression, ExpressionTree, Value};
pub use crate::evaluator::{
    ExpressionContext, FieldFormulas, Formula, evaluate, evaluate_condition, evaluate_expression,
};

// Error types
pub use crate::error::{
    ConfigError, EvaluationError, ExpressionError, ModelError, ParseError, RequestError,
    StoreError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
