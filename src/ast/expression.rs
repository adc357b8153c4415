use super::Value;
use std::collections::HashSet;
use std::fmt;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

/// Binary operators, including the short-circuiting logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,

    // Comparison
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    SmallerThan,
    SmallerThanOrEqual,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::SmallerThan => "<",
            BinaryOp::SmallerThanOrEqual => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding power used by the parser; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::StrictEqual
            | BinaryOp::StrictNotEqual => 3,
            BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual
            | BinaryOp::SmallerThan
            | BinaryOp::SmallerThanOrEqual => 4,
            BinaryOp::Add | BinaryOp::Subtract => 5,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => 6,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Name bound to the current element inside a bracket filter. Not a valid
/// identifier in formula text, so it never collides with a record field.
pub const FILTER_ITEM: &str = "@item";

/// The Abstract Syntax Tree of a parsed formula.
///
/// The shorthand notations of the formula language each get their own node:
/// `items.*.price` is a [`Expression::Projection`], `items[done == true]` a
/// [`Expression::Filter`] and `items.length` a null-safe [`Expression::Length`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Leaf nodes
    Literal(Value),
    Identifier(String),

    // Structure
    Array(Vec<Expression>),
    Member {
        object: Box<Expression>,
        property: String,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },

    // Shorthand notations
    Projection {
        source: Box<Expression>,
        key: String,
    },
    Filter {
        source: Box<Expression>,
        predicate: Box<Expression>,
    },
    Length(Box<Expression>),

    // Functions
    Call {
        callee: String,
        args: Vec<Expression>,
    },
    Lambda {
        param: String,
        body: Box<Expression>,
    },

    // Operators
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
}

impl Expression {
    /// Collects the top-level data fields a formula reads.
    ///
    /// The item read of a bracket filter and lambda parameters are bound
    /// names, not record fields.
    /// Height of the tree, measured without recursion so an oversized tree
    /// can be rejected before anything walks it recursively.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(expr.children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::Identifier(_) => Vec::new(),
            Expression::Array(items) | Expression::Call { args: items, .. } => {
                items.iter().collect()
            }
            Expression::Member { object, .. }
            | Expression::Projection { source: object, .. }
            | Expression::Length(object)
            | Expression::Unary(_, object)
            | Expression::Lambda { body: object, .. } => vec![object.as_ref()],
            Expression::Index { object: a, index: b }
            | Expression::Filter {
                source: a,
                predicate: b,
            }
            | Expression::Binary(_, a, b) => vec![a.as_ref(), b.as_ref()],
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => vec![test.as_ref(), consequent.as_ref(), alternate.as_ref()],
        }
    }

    pub fn referenced_fields(&self, fields: &mut HashSet<String>) {
        self.collect_fields(fields, &[]);
    }

    fn collect_fields(&self, fields: &mut HashSet<String>, bound: &[&str]) {
        match self {
            Expression::Identifier(name) => {
                if !bound.contains(&name.as_str()) {
                    fields.insert(name.clone());
                }
            }
            Expression::Literal(_) => {}
            Expression::Array(items) => {
                for item in items {
                    item.collect_fields(fields, bound);
                }
            }
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.collect_fields(fields, bound);
                }
            }
            Expression::Member { object, .. }
            | Expression::Projection { source: object, .. }
            | Expression::Length(object)
            | Expression::Unary(_, object) => object.collect_fields(fields, bound),
            Expression::Filter { source, predicate } => {
                source.collect_fields(fields, bound);
                let mut inner: Vec<&str> = bound.to_vec();
                inner.push(FILTER_ITEM);
                predicate.collect_fields(fields, &inner);
            }
            Expression::Index { object, index } => {
                object.collect_fields(fields, bound);
                index.collect_fields(fields, bound);
            }
            Expression::Lambda { param, body } => {
                let mut inner: Vec<&str> = bound.to_vec();
                inner.push(param.as_str());
                body.collect_fields(fields, &inner);
            }
            Expression::Binary(_, l, r) => {
                l.collect_fields(fields, bound);
                r.collect_fields(fields, bound);
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.collect_fields(fields, bound);
                consequent.collect_fields(fields, bound);
                alternate.collect_fields(fields, bound);
            }
        }
    }
}
