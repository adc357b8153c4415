use super::Expression;
use std::fmt;

/// A wrapper to display an expression as an indented tree.
///
/// Used by the CLI `check` command to show how a formula was understood,
/// which is the quickest way to debug shorthand like `a.*.b` or `a[b]`.
pub struct ExpressionTree<'a> {
    pub expr: &'a Expression,
}

impl<'a> ExpressionTree<'a> {
    pub fn new(expr: &'a Expression) -> Self {
        Self { expr }
    }
}

impl fmt::Display for ExpressionTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_as_tree(self.expr, f, "", true)
    }
}

/// Recursively formats the AST with box-drawing connectors.
fn fmt_as_tree(
    expr: &Expression,
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    is_last: bool,
) -> fmt::Result {
    let node_marker = if is_last { "└── " } else { "├── " };
    write!(f, "{}{}", prefix, node_marker)?;

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

    match expr {
        Expression::Literal(v) => writeln!(f, "Literal: {}", v)?,
        Expression::Identifier(name) => writeln!(f, "Field: {}", name)?,
        Expression::Array(items) => {
            writeln!(f, "Array [{}]", items.len())?;
            fmt_children(items.iter(), f, &child_prefix)?;
        }
        Expression::Member { object, property } => {
            writeln!(f, "Member .{}", property)?;
            fmt_as_tree(object, f, &child_prefix, true)?;
        }
        Expression::Index { object, index } => {
            writeln!(f, "Index []")?;
            fmt_children([object.as_ref(), index.as_ref()].into_iter(), f, &child_prefix)?;
        }
        Expression::Projection { source, key } => {
            writeln!(f, "Projection .*.{}", key)?;
            fmt_as_tree(source, f, &child_prefix, true)?;
        }
        Expression::Filter { source, predicate } => {
            writeln!(f, "Filter [item => ...]")?;
            fmt_children(
                [source.as_ref(), predicate.as_ref()].into_iter(),
                f,
                &child_prefix,
            )?;
        }
        Expression::Length(v) => {
            writeln!(f, "Length (null-safe)")?;
            fmt_as_tree(v, f, &child_prefix, true)?;
        }
        Expression::Call { callee, args } => {
            writeln!(f, "Call {}()", callee)?;
            fmt_children(args.iter(), f, &child_prefix)?;
        }
        Expression::Lambda { param, body } => {
            writeln!(f, "Lambda {} =>", param)?;
            fmt_as_tree(body, f, &child_prefix, true)?;
        }
        Expression::Unary(op, v) => {
            writeln!(f, "Unary ({})", op.symbol())?;
            fmt_as_tree(v, f, &child_prefix, true)?;
        }
        Expression::Binary(op, l, r) => {
            writeln!(f, "Binary ({})", op)?;
            fmt_children([l.as_ref(), r.as_ref()].into_iter(), f, &child_prefix)?;
        }
        Expression::Conditional {
            test,
            consequent,
            alternate,
        } => {
            writeln!(f, "Conditional (?:)")?;
            fmt_children(
                [test.as_ref(), consequent.as_ref(), alternate.as_ref()].into_iter(),
                f,
                &child_prefix,
            )?;
        }
    }
    Ok(())
}

fn fmt_children<'e>(
    children: impl ExactSizeIterator<Item = &'e Expression>,
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
) -> fmt::Result {
    let count = children.len();
    for (i, child) in children.enumerate() {
        fmt_as_tree(child, f, prefix, i + 1 == count)?;
    }
    Ok(())
}
