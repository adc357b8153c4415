use super::MAX_DEPTH;
use super::lexer::{Token, TokenKind};
use crate::ast::{BinaryOp, Expression, FILTER_ITEM, UnaryOp, Value};
use crate::error::ParseError;

/// Maps an operator token to its binary operator, if it is one.
macro_rules! binary_operators {
    ( $( $token:ident => $op:ident ),* $(,)? ) => {
        fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
            match kind {
                $( TokenKind::$token => Some(BinaryOp::$op), )*
                _ => None,
            }
        }
    };
}

binary_operators! {
    OrOr => Or,
    AndAnd => And,
    EqEq => Equal,
    NotEq => NotEqual,
    StrictEq => StrictEqual,
    StrictNotEq => StrictNotEqual,
    Gt => GreaterThan,
    Ge => GreaterThanOrEqual,
    Lt => SmallerThan,
    Le => SmallerThanOrEqual,
    Plus => Add,
    Minus => Subtract,
    Star => Multiply,
    Slash => Divide,
    Percent => Remainder,
}

/// Recursive-descent parser with precedence climbing for binary operators.
pub(super) struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    pub(super) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth: 0,
        }
    }

    /// Parses the whole token stream as a single formula.
    pub(super) fn parse_formula(mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::Eof, "end of expression")?;
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.enter()?;
        let expr = self.parse_conditional();
        self.depth -= 1;
        expr
    }

    fn parse_conditional(&mut self) -> Result<Expression, ParseError> {
        let test = self.parse_binary(1)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_expression()?;
        self.expect(&TokenKind::Colon, "':' of a conditional")?;
        let alternate = self.parse_expression()?;
        Ok(Expression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// Every folded operator deepens the left spine, so each one counts
    /// against [`MAX_DEPTH`] until the chain ends.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        let depth = self.depth;
        while let Some(op) = binary_op(&self.peek().kind) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            self.enter()?;
            let right = self.parse_binary(precedence + 1)?;
            left = Expression::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.parse_postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        Ok(Expression::Unary(op, Box::new(operand?)))
    }

    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;
        let depth = self.depth;
        loop {
            if matches!(
                self.peek().kind,
                TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen
            ) {
                self.enter()?;
            }
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    if self.eat(&TokenKind::Star) {
                        self.expect(&TokenKind::Dot, "'.' after '.*'")?;
                        let key = self.expect_ident("a key name after '.*.'")?;
                        expr = Expression::Projection {
                            source: Box::new(expr),
                            key,
                        };
                    } else {
                        let property = self.expect_ident("a property name after '.'")?;
                        expr = if property == "length" {
                            Expression::Length(Box::new(expr))
                        } else {
                            Expression::Member {
                                object: Box::new(expr),
                                property,
                            }
                        };
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.parse_bracket_suffix(expr)?;
                }
                TokenKind::LParen => {
                    let position = self.peek().position;
                    let callee = callee_path(&expr).ok_or(ParseError::NotCallable { position })?;
                    self.advance();
                    let args = self.parse_arguments()?;
                    expr = Expression::Call { callee, args };
                }
                _ => {
                    self.depth = depth;
                    return Ok(expr);
                }
            }
        }
    }

    /// `items[0]`, `items[-1]` and `items["key"]` index; anything else in
    /// brackets is a filter predicate whose leading name is read from the item.
    fn parse_bracket_suffix(&mut self, object: Expression) -> Result<Expression, ParseError> {
        let index = match (&self.peek().kind, &self.peek_at(1).kind, &self.peek_at(2).kind) {
            (TokenKind::Number(n), TokenKind::RBracket, _) => Some((Value::Number(*n), 2)),
            (TokenKind::Str(s), TokenKind::RBracket, _) => Some((Value::String(s.clone()), 2)),
            (TokenKind::Minus, TokenKind::Number(n), TokenKind::RBracket) => {
                Some((Value::Number(-*n), 3))
            }
            _ => None,
        };

        if let Some((index, width)) = index {
            for _ in 0..width {
                self.advance();
            }
            return Ok(Expression::Index {
                object: Box::new(object),
                index: Box::new(Expression::Literal(index)),
            });
        }

        let mut predicate = self.parse_expression()?;
        self.expect(&TokenKind::RBracket, "']' closing a filter")?;
        bind_filter_item(&mut predicate);
        Ok(Expression::Filter {
            source: Box::new(object),
            predicate: Box::new(predicate),
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            self.expect(&TokenKind::Comma, "',' or ')' in argument list")?;
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expression::Literal(Value::Number(n))),
            TokenKind::Str(s) => Ok(Expression::Literal(Value::String(s))),
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Ok(Expression::Literal(Value::Bool(true))),
                "false" => Ok(Expression::Literal(Value::Bool(false))),
                "null" | "undefined" => Ok(Expression::Literal(Value::Null)),
                _ if self.eat(&TokenKind::Arrow) => {
                    let body = self.parse_expression()?;
                    Ok(Expression::Lambda {
                        param: name,
                        body: Box::new(body),
                    })
                }
                _ => Ok(Expression::Identifier(name)),
            },
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                if !self.eat(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if self.eat(&TokenKind::RBracket) {
                            break;
                        }
                        self.expect(&TokenKind::Comma, "',' or ']' in array literal")?;
                    }
                }
                Ok(Expression::Array(items))
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEnd {
                expected: "a value".to_string(),
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "a value".to_string(),
                found: other.to_string(),
                position: token.position,
            }),
        }
    }

    // --- Token helpers ---

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.cursor + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            return Ok(());
        }
        Err(self.unexpected(expected))
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        Err(self.unexpected(expected))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEnd {
                expected: expected.to_string(),
            },
            ref other => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: other.to_string(),
                position: token.position,
            },
        }
    }
}

/// Rewrites the leftmost name of a bracket predicate into a read from the
/// current item, so `tasks[done == true]` means `item.done == true`. The
/// remaining names keep resolving against the record.
fn bind_filter_item(expr: &mut Expression) -> bool {
    match expr {
        Expression::Identifier(name) => {
            let property = std::mem::take(name);
            let item = Box::new(Expression::Identifier(FILTER_ITEM.to_string()));
            *expr = if property == "length" {
                Expression::Length(item)
            } else {
                Expression::Member {
                    object: item,
                    property,
                }
            };
            true
        }
        Expression::Literal(_) | Expression::Lambda { .. } => false,
        Expression::Array(items) | Expression::Call { args: items, .. } => {
            items.iter_mut().any(bind_filter_item)
        }
        Expression::Member { object, .. }
        | Expression::Projection { source: object, .. }
        | Expression::Filter { source: object, .. }
        | Expression::Length(object)
        | Expression::Unary(_, object) => bind_filter_item(object),
        Expression::Index { object, index } => {
            bind_filter_item(object) || bind_filter_item(index)
        }
        Expression::Binary(_, left, right) => bind_filter_item(left) || bind_filter_item(right),
        Expression::Conditional {
            test,
            consequent,
            alternate,
        } => {
            bind_filter_item(test) || bind_filter_item(consequent) || bind_filter_item(alternate)
        }
    }
}

/// Resolves `sum` or `Math.round` style callees into their dotted name.
fn callee_path(expr: &Expression) -> Option<String> {
    match expr {
        Expression::Identifier(name) => Some(name.clone()),
        Expression::Member { object, property } => {
            callee_path(object).map(|base| format!("{}.{}", base, property))
        }
        _ => None,
    }
}
