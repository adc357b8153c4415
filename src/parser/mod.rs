//! Tokenizer and parser for the formula language.
//!
//! Formulas are parsed once into an [`Expression`] tree; nothing is ever
//! rewritten textually or compiled to host code.

use crate::ast::Expression;
use crate::error::ParseError;

mod grammar;
mod lexer;

/// Maximum height of a parsed expression tree. Operator chains, postfix
/// chains, parentheses and unary operators all count toward it.
pub const MAX_DEPTH: usize = 64;

/// Maximum formula length in bytes.
pub const MAX_LENGTH: usize = 4096;

/// Parses formula text into an AST.
///
/// # Errors
///
/// Returns a [`ParseError`] for empty input, input over [`MAX_LENGTH`], nesting
/// beyond [`MAX_DEPTH`], or anything the grammar does not accept.
pub fn parse(source: &str) -> Result<Expression, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if source.len() > MAX_LENGTH {
        return Err(ParseError::TooLong {
            len: source.len(),
            max: MAX_LENGTH,
        });
    }
    let tokens = lexer::tokenize(source)?;
    let expression = grammar::Parser::new(tokens).parse_formula()?;
    // Chains that close before a fold starts escape the parser's counter.
    if expression.depth() > MAX_DEPTH {
        return Err(ParseError::TooDeep { max: MAX_DEPTH });
    }
    Ok(expression)
}
