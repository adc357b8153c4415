//! Tests for the formula tokenizer, grammar and tree printer.
use uispec::ast::{BinaryOp, FILTER_ITEM, UnaryOp};
use uispec::parser::{MAX_DEPTH, MAX_LENGTH, parse};
use uispec::prelude::*;

fn ident(name: &str) -> Box<Expression> {
    Box::new(Expression::Identifier(name.to_string()))
}

#[test]
fn test_shorthand_parses_into_dedicated_nodes() {
    assert_eq!(
        parse("people.*.age").unwrap(),
        Expression::Projection {
            source: ident("people"),
            key: "age".to_string(),
        }
    );
    assert_eq!(
        parse("tasks.length").unwrap(),
        Expression::Length(ident("tasks"))
    );
    assert_eq!(
        parse("tasks[done]").unwrap(),
        Expression::Filter {
            source: ident("tasks"),
            predicate: Box::new(Expression::Member {
                object: ident(FILTER_ITEM),
                property: "done".to_string(),
            }),
        }
    );
    assert_eq!(
        parse("tasks[0]").unwrap(),
        Expression::Index {
            object: ident("tasks"),
            index: Box::new(Expression::Literal(Value::Number(0.0))),
        }
    );
}

#[test]
fn test_shorthand_rules_compose() {
    // Filter, projection and length on one chain.
    let expr = parse("orders[paid].*.total.length").unwrap();
    let Expression::Length(inner) = expr else {
        panic!("expected a length node");
    };
    let Expression::Projection { source, key } = *inner else {
        panic!("expected a projection node");
    };
    assert_eq!(key, "total");
    assert!(matches!(*source, Expression::Filter { .. }));
}

#[test]
fn test_operator_precedence() {
    let expr = parse("a || b && c == 1 + 2 * 3").unwrap();
    let Expression::Binary(BinaryOp::Or, _, right) = expr else {
        panic!("|| should bind loosest");
    };
    let Expression::Binary(BinaryOp::And, _, right) = *right else {
        panic!("&& should bind looser than ==");
    };
    let Expression::Binary(BinaryOp::Equal, _, right) = *right else {
        panic!("== should bind looser than +");
    };
    assert!(matches!(*right, Expression::Binary(BinaryOp::Add, _, _)));
}

#[test]
fn test_left_associativity() {
    let expr = parse("10 - 4 - 3").unwrap();
    let Expression::Binary(BinaryOp::Subtract, left, _) = expr else {
        panic!("expected subtraction");
    };
    assert!(matches!(*left, Expression::Binary(BinaryOp::Subtract, _, _)));
}

#[test]
fn test_unary_and_conditional() {
    assert_eq!(
        parse("!done").unwrap(),
        Expression::Unary(UnaryOp::Not, ident("done"))
    );
    assert!(matches!(
        parse("a ? b : c ? d : e").unwrap(),
        Expression::Conditional { alternate, .. } if matches!(*alternate, Expression::Conditional { .. })
    ));
}

#[test]
fn test_calls_and_lambdas() {
    let expr = parse("filter(items, x => x.ok)").unwrap();
    let Expression::Call { callee, args } = expr else {
        panic!("expected a call");
    };
    assert_eq!(callee, "filter");
    assert_eq!(args.len(), 2);
    assert!(matches!(&args[1], Expression::Lambda { param, .. } if param == "x"));

    assert!(matches!(
        parse("Math.floor(1.5)").unwrap(),
        Expression::Call { ref callee, .. } if callee == "Math.floor"
    ));
}

#[test]
fn test_literals() {
    assert_eq!(
        parse("'it\\'s'").unwrap(),
        Expression::Literal(Value::String("it's".to_string()))
    );
    assert_eq!(parse("undefined").unwrap(), Expression::Literal(Value::Null));
    assert_eq!(parse("3.25").unwrap(), Expression::Literal(Value::Number(3.25)));
    assert!(matches!(parse("[1, 'a', true]").unwrap(), Expression::Array(items) if items.len() == 3));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse("   "), Err(ParseError::Empty)));
    assert!(matches!(
        parse("a = 1"),
        Err(ParseError::UnexpectedCharacter { ch: '=', position: 2 })
    ));
    assert!(matches!(
        parse("'open"),
        Err(ParseError::UnterminatedString { position: 0 })
    ));
    assert!(matches!(parse("a +"), Err(ParseError::UnexpectedEnd { .. })));
    assert!(matches!(
        parse("a b"),
        Err(ParseError::UnexpectedToken { position: 2, .. })
    ));
    assert!(matches!(
        parse("(a + b)(1)"),
        Err(ParseError::NotCallable { position: 7 })
    ));
    assert!(matches!(parse("a;b"), Err(ParseError::UnexpectedCharacter { ch: ';', .. })));
    assert!(matches!(parse("`x`"), Err(ParseError::UnexpectedCharacter { .. })));
}

#[test]
fn test_input_limits() {
    let long = "1+".repeat(MAX_LENGTH / 2) + "1";
    assert!(matches!(parse(&long), Err(ParseError::TooLong { .. })));

    let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
    assert!(matches!(parse(&deep), Err(ParseError::TooDeep { .. })));

    let negations = format!("{}1", "!".repeat(MAX_DEPTH * 2));
    assert!(matches!(parse(&negations), Err(ParseError::TooDeep { .. })));

    let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
    assert!(parse(&shallow).is_ok());
}

#[test]
fn test_operator_and_postfix_chains_are_depth_limited() {
    let additions = "1+".repeat(400) + "1";
    assert!(additions.len() < MAX_LENGTH);
    assert!(matches!(parse(&additions), Err(ParseError::TooDeep { .. })));

    let members = "a".to_string() + &".b".repeat(2000);
    assert!(members.len() < MAX_LENGTH);
    assert!(matches!(parse(&members), Err(ParseError::TooDeep { .. })));

    let filters = "a".to_string() + &"[b]".repeat(500);
    assert!(matches!(parse(&filters), Err(ParseError::TooDeep { .. })));

    // Each parenthesised group stays shallow on its own; the whole tree does not.
    let nested = (0..20).fold("a".to_string(), |inner, _| {
        format!("({}){}", inner, ".b".repeat(40))
    });
    assert!(nested.len() < MAX_LENGTH);
    assert!(matches!(parse(&nested), Err(ParseError::TooDeep { .. })));

    let chain = "1+".repeat(30) + "1";
    let parsed = parse(&chain).unwrap();
    assert!(parsed.depth() <= MAX_DEPTH);
}

#[test]
fn test_bracket_index_forms() {
    let negative = parse("items[-1]").unwrap();
    assert_eq!(
        negative,
        Expression::Index {
            object: ident("items"),
            index: Box::new(Expression::Literal(Value::Number(-1.0))),
        }
    );
    assert!(matches!(
        parse("items[-n]").unwrap(),
        Expression::Filter { .. }
    ));
    assert!(matches!(
        parse("items['key']").unwrap(),
        Expression::Index { .. }
    ));
}

#[test]
fn test_filter_predicate_reads_leading_name_from_item() {
    let Expression::Filter { predicate, .. } = parse("scores[value > threshold]").unwrap() else {
        panic!("expected a filter node");
    };
    let Expression::Binary(BinaryOp::GreaterThan, left, right) = *predicate else {
        panic!("expected a comparison");
    };
    assert_eq!(
        *left,
        Expression::Member {
            object: ident(FILTER_ITEM),
            property: "value".to_string(),
        }
    );
    assert_eq!(right, ident("threshold"));

    let Expression::Filter { predicate, .. } = parse("words[length > 3]").unwrap() else {
        panic!("expected a filter node");
    };
    assert!(matches!(*predicate, Expression::Binary(_, ref left, _) if matches!(**left, Expression::Length(_))));
}

#[test]
fn test_number_literals_with_exponents() {
    assert_eq!(
        parse("1e3").unwrap(),
        Expression::Literal(Value::Number(1000.0))
    );
    assert_eq!(
        parse("2.5E-1").unwrap(),
        Expression::Literal(Value::Number(0.25))
    );
    // Without exponent digits the `e` starts an identifier.
    assert!(parse("1e").is_err());
}

#[test]
fn test_expression_tree_display() {
    let expr = parse("count(tasks[done]) > 1").unwrap();
    let rendered = ExpressionTree::new(&expr).to_string();

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "└── Binary (>)");
    assert!(lines[1].contains("├── Call count()"));
    assert!(rendered.contains("Filter"));
    assert!(rendered.contains("Field: tasks"));
    assert!(lines.last().unwrap().contains("Literal: 1"));
}
