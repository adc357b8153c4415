//! Unit tests for values, errors, configuration, metrics and model helpers.
use serde_json::json;
use std::time::Duration;
use uispec::document::Violation;
use uispec::error::AttemptError;
use uispec::generator::{GenerationMetrics, GenerationMode};
use uispec::metrics::MetricsRecord;
use uispec::model::extract_json;
use uispec::prelude::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(2.5)), "2.5");
    assert_eq!(format!("{}", Value::Number(f64::NAN)), "NaN");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
    assert_eq!(format!("{}", Value::from("hi")), "\"hi\"");
}

#[test]
fn test_value_conversions() {
    let value = Value::from(json!({ "a": [1, "x", null], "b": 1.5 }));
    assert_eq!(value.field("b"), Value::Number(1.5));
    assert_eq!(value.field("missing"), Value::Null);
    assert_eq!(
        serde_json::Value::from(value),
        json!({ "a": [1, "x", null], "b": 1.5 })
    );

    assert_eq!(Value::from("  7 ").to_number(), 7.0);
    assert!(Value::from("seven").to_number().is_nan());
    assert_eq!(Value::Array(vec![]).to_display_string(), "");
    assert!(!Value::Number(f64::NAN).is_truthy());
}

#[test]
fn test_error_messages() {
    let err = ParseError::UnexpectedCharacter {
        ch: '=',
        position: 2,
    };
    assert_eq!(err.to_string(), "Unexpected character '=' at position 2");

    let err = EvaluationError::UnknownIdentifier("score".to_string());
    assert_eq!(err.to_string(), "'score' is not defined in the data record");

    let err = AttemptError::Validation(vec![
        Violation::MissingSessionId,
        Violation::MissingComponent { index: 1 },
    ]);
    assert_eq!(
        err.to_string(),
        "Generated document failed validation: missing sessionId; widget 1 is missing 'component'"
    );

    let err = AttemptError::from(ModelError::Status {
        status: 503,
        body: "overloaded".to_string(),
    });
    assert_eq!(err.to_string(), "Model endpoint returned status 503: overloaded");

    let err = RequestError::UnknownStage("launch".to_string());
    assert_eq!(err.to_string(), "Unrecognized stage 'launch'");
}

#[test]
fn test_config_defaults_and_partial_json() {
    let config = GeneratorConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.attempt_timeout(), Duration::from_secs(60));
    assert!(!config.feedback_violations);
    assert_eq!(config.retry_backoff(), None);

    let config = GeneratorConfig::from_json(r#"{ "max_retries": 5, "retry_backoff_ms": 200 }"#).unwrap();
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_backoff(), Some(Duration::from_millis(200)));
    assert_eq!(config.attempt_timeout_ms, 60_000);
}

#[test]
fn test_config_rejects_invalid_values() {
    assert!(matches!(
        GeneratorConfig::from_json(r#"{ "max_retries": 0 }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        GeneratorConfig::from_json("{ not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        GeneratorConfig::from_file("/definitely/not/here.json"),
        Err(ConfigError::Io(_))
    ));
}

fn record(success: bool) -> MetricsRecord {
    MetricsRecord {
        mode: GenerationMode::Widget,
        success,
        retry_count: 0,
        metrics: GenerationMetrics::default(),
    }
}

#[test]
fn test_metrics_store_bounds_sessions() {
    let store = MetricsStore::new(2, 8);
    store.record("a", record(true));
    store.record("b", record(true));
    store.record("a", record(false));
    store.record("c", record(true));

    assert_eq!(store.session_count(), 2);
    assert!(store.session("a").is_empty(), "oldest session is evicted first");
    assert_eq!(store.session("b").len(), 1);
    assert_eq!(store.session("c").len(), 1);
}

#[test]
fn test_metrics_store_bounds_entries_per_session() {
    let store = MetricsStore::new(4, 2);
    store.record("s", record(true));
    store.record("s", record(false));
    store.record("s", record(false));

    let entries = store.session("s");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| !entry.success));
}

#[test]
fn test_metrics_store_eviction() {
    let store = MetricsStore::default();
    store.record("s", record(true));
    assert!(store.evict("s"));
    assert!(!store.evict("s"));

    store.record("t", record(true));
    store.clear();
    assert_eq!(store.session_count(), 0);
}

#[test]
fn test_generation_metrics_from_usage() {
    let usage = TokenUsage {
        prompt_tokens: 100,
        response_tokens: 40,
    };
    let metrics = GenerationMetrics::new(usage, Duration::from_millis(1500));
    assert_eq!(metrics.total_tokens, 140);
    assert_eq!(metrics.processing_time_ms, 1500);
}

#[test]
fn test_token_usage_saturates() {
    let mut usage = TokenUsage {
        prompt_tokens: u64::MAX,
        response_tokens: 10,
    };
    assert_eq!(usage.total(), u64::MAX);

    usage += TokenUsage {
        prompt_tokens: 1,
        response_tokens: u64::MAX,
    };
    assert_eq!(usage.prompt_tokens, u64::MAX);
    assert_eq!(usage.response_tokens, u64::MAX);
}

#[test]
fn test_extract_json() {
    assert_eq!(extract_json(r#"{"a":1}"#).unwrap(), json!({ "a": 1 }));
    assert_eq!(
        extract_json("```json\n{\"a\": {\"b\": 2}}\n```").unwrap(),
        json!({ "a": { "b": 2 } })
    );
    assert_eq!(
        extract_json("Here you go: {\"ok\": true} Hope it helps.").unwrap(),
        json!({ "ok": true })
    );
    assert!(matches!(extract_json("   "), Err(ModelError::EmptyResponse)));
    assert!(matches!(
        extract_json("no json here"),
        Err(ModelError::InvalidJson(_))
    ));
}
