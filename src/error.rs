use crate::document::Violation;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while tokenizing or parsing a formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expression is empty")]
    Empty,

    #[error("Expression is {len} bytes long, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Expression nesting exceeds the maximum depth of {max}")]
    TooDeep { max: usize },

    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid number literal '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("Expected {expected} at position {position}, but found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("Expected {expected}, but the expression ended")]
    UnexpectedEnd { expected: String },

    #[error("Only named functions can be called (position {position})")]
    NotCallable { position: usize },
}

/// Errors that can occur while walking a parsed formula against a data record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("'{0}' is not defined in the data record")]
    UnknownIdentifier(String),

    #[error("'{0}' is not a known function")]
    UnknownFunction(String),

    #[error("Function '{function}' expects {expected} argument(s), but received {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("Type mismatch during '{operation}': expected {expected}, but found {found}")]
    TypeMismatch {
        operation: String,
        expected: String,
        found: String,
    },

    #[error("Cannot read property '{property}' of null")]
    NullAccess { property: String },

    #[error("Arrow functions are only allowed as arguments of filter()")]
    LambdaOutsideCall,
}

/// The combined error surfaced by the fallible expression entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Expression contains the forbidden token '{0}'")]
    Forbidden(&'static str),
}

/// Errors reported by a model client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model transport failed: {0}")]
    Transport(String),

    #[error("Model endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model response is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Why a single generation attempt did not produce an accepted document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model call exceeded the attempt deadline of {0:?}")]
    Timeout(Duration),

    #[error("Model payload is not a JSON object (found {0})")]
    MalformedPayload(String),

    #[error("Generated document failed validation: {}", format_violations(.0))]
    Validation(Vec<Violation>),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Request-shape errors, rejected before any model call is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Request is missing 'sessionId'")]
    MissingSessionId,

    #[error("Request is missing 'concernText'")]
    MissingConcernText,

    #[error("Request is missing 'stage'")]
    MissingStage,

    #[error("Unrecognized stage '{0}'")]
    UnknownStage(String),
}

/// Errors raised by a spec store implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Spec store is unavailable: {0}")]
    Unavailable(String),

    #[error("Spec store rejected the document: {0}")]
    Rejected(String),
}

/// Errors that can occur while loading generator configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
