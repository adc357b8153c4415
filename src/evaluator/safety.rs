use crate::error::ExpressionError;
use crate::parser;

/// Tokens rejected by the authoring-time safety check.
pub const DENYLIST: &[&str] = &[
    "eval(",
    "Function(",
    "setTimeout",
    "setInterval",
    "XMLHttpRequest",
    "fetch(",
    "import(",
    "require(",
    "__proto__",
    "constructor",
    "prototype",
];

/// Scans raw formula text against [`DENYLIST`].
///
/// This is an admission check for formulas entering a catalog. It is not run
/// by [`evaluate_condition`](super::evaluate_condition) or
/// [`evaluate_expression`](super::evaluate_expression): the interpreter cannot
/// reach anything outside the record and the helper table, so the denylist
/// guards authoring hygiene only.
pub fn is_safe_expression(expr: &str) -> bool {
    forbidden_token(expr).is_none()
}

/// Runs the denylist scan and then parses the formula.
///
/// # Errors
///
/// [`ExpressionError::Forbidden`] for a denylisted token, otherwise
/// [`ExpressionError::Parse`] if the text is not a valid formula.
pub fn validate_syntax(expr: &str) -> Result<(), ExpressionError> {
    if let Some(token) = forbidden_token(expr) {
        return Err(ExpressionError::Forbidden(token));
    }
    parser::parse(expr)?;
    Ok(())
}

fn forbidden_token(expr: &str) -> Option<&'static str> {
    DENYLIST.iter().copied().find(|token| expr.contains(token))
}
