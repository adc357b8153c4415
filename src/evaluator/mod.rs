//! Evaluation of formulas against a data record.
//!
//! Two entry points wrap the same tree-walking engine with different failure
//! policies:
//!
//! * [`evaluate_condition`] is **fail-open**: any parse or evaluation error
//!   yields `true`, so a broken `visibleWhen`/`enabledWhen` never hides a field.
//! * [`evaluate_expression`] is **fail-closed**: any error yields `None`, so a
//!   broken `computed` formula shows no value rather than a wrong one.
//!
//! Formula text is never turned into host code. The only names a formula can
//! reach are the record's fields and the fixed helper table in `builtins::lookup`,
//! which is why the hot path
//! does not run the [`is_safe_expression`] denylist.

use crate::ast::{Expression, Value};
use crate::error::{EvaluationError, ExpressionError, ParseError};
use crate::parser;
use std::collections::HashSet;
use tracing::debug;

mod builtins;
mod context;
mod engine;
mod fields;
mod safety;

pub use context::ExpressionContext;
pub use fields::{FieldFormulas, FieldState};
pub use safety::{DENYLIST, is_safe_expression, validate_syntax};

use engine::AstEngine;

/// A parsed formula that can be evaluated repeatedly against different records.
///
/// `Formula` is immutable and `Send + Sync`; one instance can serve concurrent
/// renders without synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expression: Expression,
}

impl Formula {
    /// Parses formula text.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let expression = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expression,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The top-level record fields this formula reads.
    pub fn referenced_fields(&self) -> HashSet<String> {
        let mut fields = HashSet::new();
        self.expression.referenced_fields(&mut fields);
        fields
    }

    /// Evaluates against an already-built context.
    pub fn evaluate(&self, context: &ExpressionContext) -> Result<Value, EvaluationError> {
        AstEngine::new(context).evaluate(&self.expression)
    }

    /// Evaluates against a JSON record, building a fresh context for the call.
    pub fn evaluate_json(&self, data: &serde_json::Value) -> Result<Value, EvaluationError> {
        self.evaluate(&ExpressionContext::from_json(data))
    }

    /// Fail-open condition check on a parsed formula.
    pub fn condition(&self, context: &ExpressionContext) -> bool {
        match self.evaluate(context) {
            Ok(value) => value.is_truthy(),
            Err(e) => {
                debug!(formula = %self.source, error = %e, "condition failed, defaulting to true");
                true
            }
        }
    }

    /// Fail-closed value computation on a parsed formula.
    pub fn value(&self, context: &ExpressionContext) -> Option<Value> {
        match self.evaluate(context) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(formula = %self.source, error = %e, "expression failed, yielding no value");
                None
            }
        }
    }
}

/// Parses and evaluates `expr` against `data`, surfacing any error.
pub fn evaluate(expr: &str, data: &serde_json::Value) -> Result<Value, ExpressionError> {
    let formula = Formula::parse(expr)?;
    Ok(formula.evaluate_json(data)?)
}

/// Evaluates a visibility/enablement condition. Any error yields `true`.
pub fn evaluate_condition(expr: &str, data: &serde_json::Value) -> bool {
    match evaluate(expr, data) {
        Ok(value) => value.is_truthy(),
        Err(e) => {
            debug!(expression = expr, error = %e, "condition failed, defaulting to true");
            true
        }
    }
}

/// Evaluates a computed value. Any error yields `None`.
pub fn evaluate_expression(expr: &str, data: &serde_json::Value) -> Option<Value> {
    match evaluate(expr, data) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(expression = expr, error = %e, "expression failed, yielding no value");
            None
        }
    }
}

/// [`evaluate_condition`] against a prebuilt context.
pub fn evaluate_condition_in(expr: &str, context: &ExpressionContext) -> bool {
    match Formula::parse(expr) {
        Ok(formula) => formula.condition(context),
        Err(e) => {
            debug!(expression = expr, error = %e, "condition failed to parse, defaulting to true");
            true
        }
    }
}

/// [`evaluate_expression`] against a prebuilt context.
pub fn evaluate_expression_in(expr: &str, context: &ExpressionContext) -> Option<Value> {
    match Formula::parse(expr) {
        Ok(formula) => formula.value(context),
        Err(e) => {
            debug!(expression = expr, error = %e, "expression failed to parse, yielding no value");
            None
        }
    }
}
