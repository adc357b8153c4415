use super::builtins;
use super::context::{ExpressionContext, Scope};
use crate::ast::{BinaryOp, Expression, FILTER_ITEM, UnaryOp, Value};
use crate::error::EvaluationError;
use std::cmp::Ordering;

// This macro generates the evaluation of a numeric or ordering binary operation.
macro_rules! eval_op {
    ($l:expr, $r:expr, number, $op_fn:expr) => {
        Value::Number(($op_fn)($l.to_number(), $r.to_number()))
    };
    ($l:expr, $r:expr, ordering, $accept:pat) => {
        Value::Bool(matches!(compare(&$l, &$r), Some($accept)))
    };
}

/// The recursive tree-walking engine for one parsed formula.
pub(super) struct AstEngine<'a> {
    context: &'a ExpressionContext,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(context: &'a ExpressionContext) -> Self {
        Self { context }
    }

    pub(super) fn evaluate(&self, expression: &Expression) -> Result<Value, EvaluationError> {
        self.eval(expression, &Scope::Root(self.context))
    }

    fn eval(&self, expr: &Expression, scope: &Scope<'_>) -> Result<Value, EvaluationError> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Identifier(name) => scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvaluationError::UnknownIdentifier(name.clone())),
            Expression::Array(items) => items
                .iter()
                .map(|item| self.eval(item, scope))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),

            // --- Access ---
            Expression::Member { object, property } => {
                if let Expression::Identifier(base) = object.as_ref() {
                    if scope.lookup(base).is_none() {
                        if let Some(value) = builtins::constant(&format!("{}.{}", base, property))
                        {
                            return Ok(value);
                        }
                    }
                }
                match self.eval(object, scope)? {
                    Value::Null => Err(EvaluationError::NullAccess {
                        property: property.clone(),
                    }),
                    value => Ok(value.field(property)),
                }
            }
            Expression::Index { object, index } => {
                let target = self.eval(object, scope)?;
                let index = self.eval(index, scope)?;
                index_value(target, &index)
            }

            // --- Shorthand notations ---
            Expression::Projection { source, key } => match self.eval_lenient(source, scope)? {
                Value::Array(items) => Ok(Value::Array(
                    items.iter().map(|item| item.field(key)).collect(),
                )),
                _ => Ok(Value::Array(Vec::new())),
            },
            Expression::Filter { source, predicate } => {
                let Value::Array(items) = self.eval_lenient(source, scope)? else {
                    return Ok(Value::Array(Vec::new()));
                };
                let mut kept = Vec::new();
                for item in items {
                    let item_scope = Scope::Binding {
                        name: FILTER_ITEM,
                        value: &item,
                        parent: scope,
                    };
                    if self.eval(predicate, &item_scope)?.is_truthy() {
                        kept.push(item);
                    }
                }
                Ok(Value::Array(kept))
            }
            Expression::Length(operand) => {
                let value = self.eval_lenient(operand, scope)?;
                match value {
                    Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                    Value::Array(items) => Ok(Value::Number(items.len() as f64)),
                    falsy if !falsy.is_truthy() => Ok(Value::Number(0.0)),
                    other => Err(EvaluationError::TypeMismatch {
                        operation: "length".to_string(),
                        expected: "string or array".to_string(),
                        found: other.type_name().to_string(),
                    }),
                }
            }

            // --- Functions ---
            Expression::Call { callee, args } if callee == "filter" => {
                self.eval_filter_call(args, scope)
            }
            Expression::Call { callee, args } => {
                let function = builtins::lookup(callee)
                    .ok_or_else(|| EvaluationError::UnknownFunction(callee.clone()))?;
                let values = args
                    .iter()
                    .map(|arg| self.eval_lenient(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                function(&values)
            }
            Expression::Lambda { .. } => Err(EvaluationError::LambdaOutsideCall),

            // --- Operators ---
            Expression::Unary(op, operand) => {
                let value = self.eval(operand, scope)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Negate => Value::Number(-value.to_number()),
                })
            }
            Expression::Binary(BinaryOp::And, l, r) => {
                let left = self.eval(l, scope)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(r, scope)
            }
            Expression::Binary(BinaryOp::Or, l, r) => {
                let left = self.eval(l, scope)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(r, scope)
            }
            Expression::Binary(op, l, r) => {
                let left = self.eval(l, scope)?;
                let right = self.eval(r, scope)?;
                Ok(apply_binary(*op, left, right))
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(consequent, scope)
                } else {
                    self.eval(alternate, scope)
                }
            }
        }
    }

    /// Like `eval`, but a bare identifier missing from the record reads as `null`.
    /// Used where the language promises tolerance of missing input: the
    /// operand of `.length`, the source of projections and filters, and
    /// function arguments.
    fn eval_lenient(&self, expr: &Expression, scope: &Scope<'_>) -> Result<Value, EvaluationError> {
        if let Expression::Identifier(name) = expr {
            return Ok(scope.lookup(name).cloned().unwrap_or(Value::Null));
        }
        self.eval(expr, scope)
    }

    fn eval_filter_call(
        &self,
        args: &[Expression],
        scope: &Scope<'_>,
    ) -> Result<Value, EvaluationError> {
        let [source, predicate] = args else {
            return Err(EvaluationError::Arity {
                function: "filter".to_string(),
                expected: "2".to_string(),
                found: args.len(),
            });
        };
        let Expression::Lambda { param, body } = predicate else {
            return Err(EvaluationError::TypeMismatch {
                operation: "filter".to_string(),
                expected: "an arrow function".to_string(),
                found: "expression".to_string(),
            });
        };
        let Value::Array(items) = self.eval_lenient(source, scope)? else {
            return Ok(Value::Array(Vec::new()));
        };

        let mut kept = Vec::new();
        for item in items {
            let binding = Scope::Binding {
                name: param,
                value: &item,
                parent: scope,
            };
            if self.eval(body, &binding)?.is_truthy() {
                kept.push(item);
            }
        }
        Ok(Value::Array(kept))
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Value {
    match op {
        BinaryOp::Add => {
            let concatenates = |v: &Value| {
                matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_))
            };
            if concatenates(&left) || concatenates(&right) {
                Value::String(left.to_display_string() + &right.to_display_string())
            } else {
                eval_op!(left, right, number, |a: f64, b: f64| a + b)
            }
        }
        BinaryOp::Subtract => eval_op!(left, right, number, |a: f64, b: f64| a - b),
        BinaryOp::Multiply => eval_op!(left, right, number, |a: f64, b: f64| a * b),
        BinaryOp::Divide => eval_op!(left, right, number, |a: f64, b: f64| a / b),
        BinaryOp::Remainder => eval_op!(left, right, number, |a: f64, b: f64| a % b),

        BinaryOp::GreaterThan => eval_op!(left, right, ordering, Ordering::Greater),
        BinaryOp::GreaterThanOrEqual => {
            eval_op!(left, right, ordering, Ordering::Greater | Ordering::Equal)
        }
        BinaryOp::SmallerThan => eval_op!(left, right, ordering, Ordering::Less),
        BinaryOp::SmallerThanOrEqual => {
            eval_op!(left, right, ordering, Ordering::Less | Ordering::Equal)
        }

        BinaryOp::Equal => Value::Bool(loose_equals(&left, &right)),
        BinaryOp::NotEqual => Value::Bool(!loose_equals(&left, &right)),
        // Arrays and objects compare structurally, not by identity.
        BinaryOp::StrictEqual => Value::Bool(left == right),
        BinaryOp::StrictNotEqual => Value::Bool(left != right),

        // Short-circuiting operators are handled before both sides are evaluated.
        BinaryOp::And => {
            if left.is_truthy() {
                right
            } else {
                left
            }
        }
        BinaryOp::Or => {
            if left.is_truthy() {
                left
            } else {
                right
            }
        }
    }
}

/// Strings compare lexicographically with each other; everything else numerically.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_))
        | (Value::Bool(_), _)
        | (_, Value::Bool(_)) => left.to_number() == right.to_number(),
        _ => left == right,
    }
}

fn index_value(target: Value, index: &Value) -> Result<Value, EvaluationError> {
    let position = match index {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        _ => None,
    };
    Ok(match (target, position) {
        (Value::Null, _) => {
            return Err(EvaluationError::NullAccess {
                property: index.to_display_string(),
            });
        }
        (Value::Array(items), Some(i)) => items.get(i).cloned().unwrap_or(Value::Null),
        (Value::String(s), Some(i)) => s
            .chars()
            .nth(i)
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null),
        (object @ Value::Object(_), _) => object.field(&index.to_display_string()),
        _ => Value::Null,
    })
}
