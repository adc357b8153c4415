use serde_json::Value as JsonValue;
use thiserror::Error;

/// One problem found in a generated document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("missing sessionId")]
    MissingSessionId,

    #[error("missing stage")]
    MissingStage,

    #[error("missing widgets array")]
    MissingWidgets,

    #[error("widgets array is empty")]
    EmptyWidgets,

    #[error("widget {index} is missing 'component'")]
    MissingComponent { index: usize },

    #[error("widget {index} uses component '{component}', which is not eligible at this stage")]
    IneligibleComponent { index: usize, component: String },

    #[error("document does not match the expected shape: {0}")]
    Malformed(String),
}

/// Collects every violation in a filled document instead of stopping at the first.
///
/// When `eligible` is `Some`, each widget's `component` must be one of its ids.
pub fn validate_document(doc: &JsonValue, eligible: Option<&[&str]>) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !is_present_string(doc.get("sessionId")) {
        violations.push(Violation::MissingSessionId);
    }
    if !is_present_string(doc.get("stage")) {
        violations.push(Violation::MissingStage);
    }

    match doc.get("widgets") {
        Some(JsonValue::Array(widgets)) if widgets.is_empty() => {
            violations.push(Violation::EmptyWidgets);
        }
        Some(JsonValue::Array(widgets)) => {
            for (index, widget) in widgets.iter().enumerate() {
                match widget.get("component").and_then(JsonValue::as_str) {
                    Some(component) if !component.trim().is_empty() => {
                        if let Some(eligible) = eligible {
                            if !eligible.contains(&component) {
                                violations.push(Violation::IneligibleComponent {
                                    index,
                                    component: component.to_string(),
                                });
                            }
                        }
                    }
                    _ => violations.push(Violation::MissingComponent { index }),
                }
            }
        }
        _ => violations.push(Violation::MissingWidgets),
    }

    violations
}

fn is_present_string(value: Option<&JsonValue>) -> bool {
    value
        .and_then(JsonValue::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}
