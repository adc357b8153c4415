//! Tests for formula evaluation and its fail-open / fail-closed boundaries.
use serde_json::json;
use uispec::evaluator::{
    FieldFormulas, evaluate_condition_in, evaluate_expression_in, is_safe_expression,
    validate_syntax,
};
use uispec::prelude::*;

fn number(expr: &str, data: serde_json::Value) -> f64 {
    match evaluate_expression(expr, &data) {
        Some(Value::Number(n)) => n,
        other => panic!("'{}' did not yield a number: {:?}", expr, other),
    }
}

#[test]
fn test_malformed_condition_fails_open() {
    assert!(evaluate_condition("!!!malformed(((", &json!({})));
    assert!(evaluate_condition("", &json!({})));
    assert!(evaluate_condition("a = 1", &json!({ "a": 1 })));
    assert!(evaluate_condition("missing_field > 3", &json!({})));
}

#[test]
fn test_malformed_expression_fails_closed() {
    assert_eq!(evaluate_expression("!!!malformed(((", &json!({})), None);
    assert_eq!(evaluate_expression("missing_field * 2", &json!({})), None);
    assert_eq!(evaluate_expression("a.b.c", &json!({ "a": {} })), None);
    assert_eq!(evaluate_expression("fetchAll(items)", &json!({ "items": [] })), None);
}

#[test]
fn test_condition_uses_truthiness() {
    let data = json!({ "name": "", "age": 0, "tags": [], "flag": true });
    assert!(!evaluate_condition("name", &data));
    assert!(!evaluate_condition("age", &data));
    assert!(evaluate_condition("tags", &data));
    assert!(evaluate_condition("flag && age == 0", &data));
    assert!(!evaluate_condition("!flag", &data));
}

#[test]
fn test_sum_with_key() {
    let data = json!({ "items": [{ "amount": 2 }, { "amount": 3 }] });
    assert_eq!(number("sum(items,'amount')", data), 5.0);
}

#[test]
fn test_length_of_missing_field_is_zero() {
    assert_eq!(number("tasks.length", json!({})), 0.0);
    assert_eq!(number("tasks.length", json!({ "tasks": null })), 0.0);
    assert_eq!(number("title.length", json!({ "title": "héllo" })), 5.0);
}

#[test]
fn test_bracket_filter_shorthand() {
    let data = json!({ "tasks": [{ "done": true }, { "done": false }] });
    match evaluate_expression("tasks[done==true]", &data) {
        Some(Value::Array(items)) => assert_eq!(items.len(), 1),
        other => panic!("expected an array, got {:?}", other),
    }
    assert_eq!(number("tasks[done].length", data.clone()), 1.0);
    assert_eq!(number("count(tasks[!done])", data), 1.0);
}

#[test]
fn test_bracket_filter_reads_outer_fields() {
    let data = json!({
        "threshold": 5,
        "scores": [{ "value": 3 }, { "value": 7 }, { "value": 9 }]
    });
    assert_eq!(number("scores[value > threshold].length", data), 2.0);
}

#[test]
fn test_bracket_filter_leading_name_comes_from_item() {
    // The record's own `done` must not stand in for items that lack it.
    let data = json!({ "done": true, "tasks": [{ "x": 1 }, { "done": false }] });
    assert_eq!(
        evaluate_expression("tasks[done == true]", &data),
        Some(Value::Array(vec![]))
    );
    assert_eq!(
        evaluate_expression("tasks[done == true]", &data),
        evaluate_expression("filter(tasks, item => item.done == true)", &data)
    );

    let data = json!({ "limit": 2, "words": ["a", "abc", "abcd"] });
    assert_eq!(number("words[length > limit].length", data), 2.0);
}

#[test]
fn test_bracket_filter_unknown_outer_name_is_an_error() {
    let data = json!({ "scores": [{ "value": 3 }] });
    assert_eq!(evaluate_expression("scores[value > threshhold]", &data), None);
    assert!(evaluate_condition("scores[value > threshhold].length == 0", &data));
}

#[test]
fn test_projection_shorthand() {
    let data = json!({ "people": [{ "age": 30 }, { "age": 40 }, { "name": "x" }] });
    let projected = evaluate_expression("people.*.age", &data).unwrap();
    assert_eq!(
        serde_json::Value::from(projected),
        json!([30, 40, null])
    );
    assert_eq!(number("max(people.*.age)", data.clone()), 40.0);
    assert_eq!(
        evaluate_expression("people.*.age", &data),
        evaluate_expression("map(people, 'age')", &data)
    );
}

#[test]
fn test_helpers_tolerate_non_arrays() {
    let data = json!({ "text": "abc", "n": 4 });
    assert_eq!(number("count(text)", data.clone()), 0.0);
    assert_eq!(number("sum(n)", data.clone()), 0.0);
    assert_eq!(number("avg(missing)", data.clone()), 0.0);
    assert_eq!(number("min(missing, 'k')", data.clone()), 0.0);
    assert_eq!(number("max(text)", data.clone()), 0.0);
    assert_eq!(
        evaluate_expression("map(n, 'k')", &data),
        Some(Value::Array(vec![]))
    );
    assert_eq!(
        evaluate_expression("filter(missing, x => x.done)", &data),
        Some(Value::Array(vec![]))
    );
}

#[test]
fn test_aggregate_helpers() {
    let data = json!({ "xs": [4, 1, "7", null, 8] });
    assert_eq!(number("count(xs)", data.clone()), 5.0);
    assert_eq!(number("sum(xs)", data.clone()), 20.0);
    assert_eq!(number("min(xs)", data.clone()), 1.0);
    assert_eq!(number("max(xs)", data.clone()), 8.0);
    assert_eq!(number("avg(xs)", data), 4.0);
}

#[test]
fn test_filter_with_arrow_function() {
    let data = json!({ "limit": 10, "orders": [{ "total": 5 }, { "total": 15 }, { "total": 25 }] });
    assert_eq!(
        number("count(filter(orders, o => o.total > limit))", data.clone()),
        2.0
    );
    assert_eq!(
        number("sum(filter(orders, o => o.total < 20), 'total')", data),
        20.0
    );
}

#[test]
fn test_safe_constructors_and_math() {
    let data = json!({ "price": "12.5", "qty": 3 });
    assert_eq!(number("Number(price) * qty", data.clone()), 37.5);
    assert_eq!(number("Math.round(2.5)", data.clone()), 3.0);
    assert_eq!(number("Math.max(1, qty, 2)", data.clone()), 3.0);
    assert_eq!(number("Math.pow(2, 10)", data.clone()), 1024.0);
    assert_eq!(
        evaluate_expression("String(qty) + 'x'", &data),
        Some(Value::String("3x".to_string()))
    );
    assert_eq!(
        evaluate_expression("Boolean(0)", &data),
        Some(Value::Bool(false))
    );
    assert!(evaluate_condition("Math.PI > 3.14", &data));
}

#[test]
fn test_javascript_like_operators() {
    let data = json!({ "a": 2, "s": "2", "name": "Ada", "none": null });
    assert!(evaluate_condition("a == s", &data));
    assert!(!evaluate_condition("a === s", &data));
    assert!(evaluate_condition("a !== s", &data));
    assert!(evaluate_condition("none == null", &data));
    assert!(!evaluate_condition("none == 0", &data));
    assert_eq!(
        evaluate_expression("'Hi ' + name", &data),
        Some(Value::String("Hi Ada".to_string()))
    );
    assert_eq!(
        evaluate_expression("none || 'fallback'", &data),
        Some(Value::String("fallback".to_string()))
    );
    assert_eq!(number("a > 1 ? a * 10 : 0", data.clone()), 20.0);
    assert_eq!(number("-a + 7 % 4", data.clone()), 1.0);
    assert_eq!(number("1 + 2 * 3", data), 7.0);
}

#[test]
fn test_short_circuit_skips_errors() {
    let data = json!({ "enabled": false });
    // The right-hand side would fail on an unknown identifier.
    assert_eq!(
        evaluate_expression("enabled && unknown_thing", &data),
        Some(Value::Bool(false))
    );
}

#[test]
fn test_helper_names_do_not_collide_with_fields() {
    let data = json!({ "count": 3, "items": [1, 2] });
    assert_eq!(number("count + count(items)", data), 5.0);
}

#[test]
fn test_index_access() {
    let data = json!({ "xs": [10, 20], "obj": { "k": "v" } });
    assert_eq!(number("xs[1]", data.clone()), 20.0);
    assert_eq!(
        evaluate_expression("obj['k']", &data),
        Some(Value::String("v".to_string()))
    );
    assert_eq!(evaluate_expression("xs[5]", &data), Some(Value::Null));
    assert_eq!(evaluate_expression("xs[-1]", &data), Some(Value::Null));
}

#[test]
fn test_deep_formulas_degrade_instead_of_crashing() {
    let data = json!({ "a": {} });
    let additions = "1+".repeat(400) + "1";
    let members = "a".to_string() + &".b".repeat(2000);
    let nested = (0..20).fold("a".to_string(), |inner, _| {
        format!("({}){}", inner, ".b".repeat(40))
    });

    for formula in [&additions, &members, &nested] {
        assert!(evaluate_condition(formula, &data));
        assert_eq!(evaluate_expression(formula, &data), None);
    }

    let short = "1+".repeat(20) + "1";
    assert_eq!(number(&short, data), 21.0);
}

#[test]
fn test_numeric_text_follows_number_semantics() {
    let data = json!({ "big": "1e3", "inf": "inf", "nan": "NaN", "pos": "Infinity" });
    assert_eq!(number("1e3 + 1", data.clone()), 1001.0);
    assert_eq!(number("Number(big)", data.clone()), 1000.0);
    assert!(number("Number(inf)", data.clone()).is_nan());
    assert!(number("Number(nan)", data.clone()).is_nan());
    assert_eq!(number("Number(pos)", data.clone()), f64::INFINITY);
    assert_eq!(number("sum([1, nan, inf, '2'])", data), 3.0);
}

#[test]
fn test_evaluate_surfaces_errors() {
    let err = evaluate("missing + 1", &json!({})).unwrap_err();
    assert!(matches!(
        err,
        ExpressionError::Evaluation(EvaluationError::UnknownIdentifier(ref name)) if name == "missing"
    ));

    let err = evaluate("a +", &json!({ "a": 1 })).unwrap_err();
    assert!(matches!(err, ExpressionError::Parse(_)));

    let err = evaluate("x => x", &json!({})).unwrap_err();
    assert!(matches!(
        err,
        ExpressionError::Evaluation(EvaluationError::LambdaOutsideCall)
    ));
}

#[test]
fn test_formula_reuse_against_context() {
    let formula = Formula::parse("sum(lines, 'qty') >= minimum").unwrap();
    let low = ExpressionContext::from_json(&json!({ "lines": [{ "qty": 1 }], "minimum": 2 }));
    let high = ExpressionContext::new()
        .with_field("lines", Value::from(json!([{ "qty": 2 }, { "qty": 3 }])))
        .with_field("minimum", 2.0);

    assert!(!formula.condition(&low));
    assert!(formula.condition(&high));
    assert_eq!(formula.value(&high), Some(Value::Bool(true)));

    let fields = formula.referenced_fields();
    assert!(fields.contains("lines"));
    assert!(fields.contains("minimum"));
    assert_eq!(fields.len(), 2);
}

#[test]
fn test_in_context_entry_points_keep_policies() {
    let context = ExpressionContext::new();
    assert!(evaluate_condition_in("((", &context));
    assert_eq!(evaluate_expression_in("((", &context), None);
}

#[test]
fn test_field_formulas_resolve() {
    let formulas: FieldFormulas = serde_json::from_value(json!({
        "visibleWhen": "answers.length > 0",
        "enabledWhen": "broken((",
        "computed": "avg(answers, 'score')"
    }))
    .unwrap();
    let state = formulas.resolve(&json!({ "answers": [{ "score": 4 }, { "score": 2 }] }));

    assert!(state.visible);
    assert!(state.enabled);
    assert_eq!(state.value, Some(Value::Number(3.0)));

    let empty = FieldFormulas::default().resolve(&json!({}));
    assert!(empty.visible && empty.enabled);
    assert_eq!(empty.value, None);
}

#[test]
fn test_safety_check_is_separate_from_evaluation() {
    assert!(!is_safe_expression("constructor.constructor('x')()"));
    assert!(!is_safe_expression("fetch('http://x')"));
    assert!(is_safe_expression("sum(items, 'amount') > 3"));

    assert!(matches!(
        validate_syntax("items.__proto__"),
        Err(ExpressionError::Forbidden("__proto__"))
    ));
    assert!(matches!(
        validate_syntax("sum(items"),
        Err(ExpressionError::Parse(_))
    ));
    assert!(validate_syntax("tasks[done].length > 0").is_ok());

    // The hot path does not consult the denylist; the name is just unknown.
    assert!(evaluate_condition("prototype", &json!({})));
    assert_eq!(
        evaluate_expression("prototype", &json!({ "prototype": 1 })),
        Some(Value::Number(1.0))
    );
}

#[test]
fn test_concurrent_evaluation() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let data = json!({ "xs": (0..=i).collect::<Vec<_>>() });
                evaluate_expression("sum(xs)", &data)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = (0..=i).sum::<usize>() as f64;
        assert_eq!(handle.join().unwrap(), Some(Value::Number(expected)));
    }
}
