//! The UI specification document: typed model, default filling and validation.
//!
//! Model output goes through three steps, in order: [`fill_required_fields`]
//! on the raw JSON, [`validate_document`] on the filled JSON, and finally
//! deserialization into [`UiSpecDocument`]. [`accept_document`] runs all three.

mod fill;
mod types;
mod validate;

pub use fill::*;
pub use types::*;
pub use validate::*;

use serde_json::Value as JsonValue;

/// Fills, validates and deserializes a raw model payload.
///
/// # Errors
///
/// Every violation found, or a single [`Violation::Malformed`] when the filled
/// document passes the membership checks but still has the wrong shape (for
/// example an unknown stage name or a non-numeric position).
pub fn accept_document(
    mut raw: JsonValue,
    eligible: Option<&[&str]>,
) -> Result<UiSpecDocument, Vec<Violation>> {
    fill_required_fields(&mut raw);
    let violations = validate_document(&raw, eligible);
    if !violations.is_empty() {
        return Err(violations);
    }
    serde_json::from_value(raw).map_err(|e| vec![Violation::Malformed(e.to_string())])
}
