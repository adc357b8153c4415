use super::{ExpressionContext, evaluate_condition_in, evaluate_expression_in};
use crate::ast::Value;
use serde::{Deserialize, Serialize};

/// The formula fields an externally authored field specification may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFormulas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
}

/// What the rendering layer needs to know about one field for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub visible: bool,
    pub enabled: bool,
    pub value: Option<Value>,
}

impl FieldFormulas {
    /// Resolves all three formulas against `data`.
    ///
    /// Absent conditions mean visible and enabled; an absent `computed`
    /// formula means no value.
    pub fn resolve(&self, data: &serde_json::Value) -> FieldState {
        let context = ExpressionContext::from_json(data);
        FieldState {
            visible: self
                .visible_when
                .as_deref()
                .is_none_or(|expr| evaluate_condition_in(expr, &context)),
            enabled: self
                .enabled_when
                .as_deref()
                .is_none_or(|expr| evaluate_condition_in(expr, &context)),
            value: self
                .computed
                .as_deref()
                .and_then(|expr| evaluate_expression_in(expr, &context)),
        }
    }
}
