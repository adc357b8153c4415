use crate::ast::Value;
use crate::error::EvaluationError;

pub(super) type BuiltinFn = fn(&[Value]) -> Result<Value, EvaluationError>;

/// Resolves a callee name to its implementation. This match is the whole
/// callable surface of the language, aggregate helpers and constructors
/// (`Math` included) alike. `filter` is evaluated by the engine
/// itself because its second argument is an arrow function.
pub(super) fn lookup(name: &str) -> Option<BuiltinFn> {
    let f: BuiltinFn = match name {
        "count" => count,
        "sum" => sum,
        "avg" => avg,
        "min" => min,
        "max" => max,
        "map" => map,
        "String" => |args| {
            arity("String", args, 0, 1)?;
            Ok(Value::String(
                args.first().map(Value::to_display_string).unwrap_or_default(),
            ))
        },
        "Number" => |args| {
            arity("Number", args, 0, 1)?;
            Ok(Value::Number(args.first().map_or(0.0, Value::to_number)))
        },
        "Boolean" => |args| {
            arity("Boolean", args, 0, 1)?;
            Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
        },
        "Math.abs" => |args| math_unary("Math.abs", args, f64::abs),
        "Math.floor" => |args| math_unary("Math.floor", args, f64::floor),
        "Math.ceil" => |args| math_unary("Math.ceil", args, f64::ceil),
        "Math.round" => |args| math_unary("Math.round", args, |n| (n + 0.5).floor()),
        "Math.sqrt" => |args| math_unary("Math.sqrt", args, f64::sqrt),
        "Math.pow" => |args| {
            arity("Math.pow", args, 2, 2)?;
            Ok(Value::Number(args[0].to_number().powf(args[1].to_number())))
        },
        "Math.min" => |args| {
            Ok(Value::Number(
                args.iter().map(Value::to_number).fold(f64::INFINITY, nan_min),
            ))
        },
        "Math.max" => |args| {
            Ok(Value::Number(
                args.iter()
                    .map(Value::to_number)
                    .fold(f64::NEG_INFINITY, nan_max),
            ))
        },
        _ => return None,
    };
    Some(f)
}

/// Constants reachable as `Namespace.NAME`.
pub(super) fn constant(path: &str) -> Option<Value> {
    match path {
        "Math.PI" => Some(Value::Number(std::f64::consts::PI)),
        "Math.E" => Some(Value::Number(std::f64::consts::E)),
        _ => None,
    }
}

fn arity(function: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvaluationError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{}-{}", min, max)
    };
    Err(EvaluationError::Arity {
        function: function.to_string(),
        expected,
        found: args.len(),
    })
}

fn math_unary(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, EvaluationError> {
    arity(name, args, 1, 1)?;
    Ok(Value::Number(f(args[0].to_number())))
}

fn nan_min(acc: f64, n: f64) -> f64 {
    if acc.is_nan() || n.is_nan() {
        f64::NAN
    } else {
        acc.min(n)
    }
}

fn nan_max(acc: f64, n: f64) -> f64 {
    if acc.is_nan() || n.is_nan() {
        f64::NAN
    } else {
        acc.max(n)
    }
}

// --- Aggregate helpers ---
// Every helper tolerates a non-array first argument instead of failing.

fn key_argument(args: &[Value]) -> Option<String> {
    match args.get(1) {
        None | Some(Value::Null) => None,
        Some(Value::String(key)) => Some(key.clone()),
        Some(other) => Some(other.to_display_string()),
    }
}

/// The numeric view of each item (or of `item[key]`), skipping non-numbers.
fn numbers(args: &[Value]) -> Vec<f64> {
    let Some(Value::Array(items)) = args.first() else {
        return Vec::new();
    };
    let key = key_argument(args);
    items
        .iter()
        .filter_map(|item| match &key {
            Some(key) => item.field(key).as_aggregate_number(),
            None => item.as_aggregate_number(),
        })
        .collect()
}

fn count(args: &[Value]) -> Result<Value, EvaluationError> {
    arity("count", args, 1, 1)?;
    let n = match &args[0] {
        Value::Array(items) => items.len(),
        _ => 0,
    };
    Ok(Value::Number(n as f64))
}

fn sum(args: &[Value]) -> Result<Value, EvaluationError> {
    arity("sum", args, 1, 2)?;
    Ok(Value::Number(numbers(args).iter().sum()))
}

fn avg(args: &[Value]) -> Result<Value, EvaluationError> {
    arity("avg", args, 1, 2)?;
    let len = match &args[0] {
        Value::Array(items) if !items.is_empty() => items.len(),
        _ => return Ok(Value::Number(0.0)),
    };
    Ok(Value::Number(numbers(args).iter().sum::<f64>() / len as f64))
}

fn min(args: &[Value]) -> Result<Value, EvaluationError> {
    arity("min", args, 1, 2)?;
    let values = numbers(args);
    Ok(Value::Number(
        values.into_iter().reduce(f64::min).unwrap_or(0.0),
    ))
}

fn max(args: &[Value]) -> Result<Value, EvaluationError> {
    arity("max", args, 1, 2)?;
    let values = numbers(args);
    Ok(Value::Number(
        values.into_iter().reduce(f64::max).unwrap_or(0.0),
    ))
}

fn map(args: &[Value]) -> Result<Value, EvaluationError> {
    arity("map", args, 2, 2)?;
    let Value::Array(items) = &args[0] else {
        return Ok(Value::Array(Vec::new()));
    };
    let key = args[1].to_display_string();
    Ok(Value::Array(items.iter().map(|item| item.field(&key)).collect()))
}
