use crate::error::ParseError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    Arrow,

    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    EqEq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "{}", n),
            TokenKind::Str(s) => return write!(f, "{:?}", s),
            TokenKind::Ident(name) => return f.write_str(name),
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "=>",
            TokenKind::Bang => "!",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::StrictEq => "===",
            TokenKind::StrictNotEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Eof => "end of expression",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Splits formula text into tokens. Positions are byte offsets into the source.
pub(super) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() {
            let mut end = position;
            let mut seen_dot = false;
            let mut seen_exponent = false;
            while let Some(&(idx, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    end = idx + c.len_utf8();
                    chars.next();
                } else if (c == 'e' || c == 'E') && !seen_exponent {
                    // An exponent needs digits, optionally after a sign.
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    let mut width = 1;
                    if let Some(&(_, '+' | '-')) = lookahead.peek() {
                        lookahead.next();
                        width += 1;
                    }
                    match lookahead.peek() {
                        Some(&(_, next)) if next.is_ascii_digit() => {
                            seen_exponent = true;
                            seen_dot = true;
                            end = idx + width;
                            for _ in 0..width {
                                chars.next();
                            }
                        }
                        _ => break,
                    }
                } else if c == '.' && !seen_dot {
                    // A dot is a decimal point only when a digit follows it.
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        Some(&(_, next)) if next.is_ascii_digit() => {
                            seen_dot = true;
                            end = idx + 1;
                            chars.next();
                        }
                        _ => break,
                    }
                } else {
                    break;
                }
            }
            let text = &source[position..end];
            let value = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                text: text.to_string(),
                position,
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position,
            });
            continue;
        }

        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let mut end = position;
            while let Some(&(idx, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    end = idx + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Ident(source[position..end].to_string()),
                position,
            });
            continue;
        }

        if ch == '"' || ch == '\'' {
            chars.next();
            let mut text = String::new();
            let mut terminated = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, escaped)) => text.push(escaped),
                        None => break,
                    },
                    c if c == ch => {
                        terminated = true;
                        break;
                    }
                    c => text.push(c),
                }
            }
            if !terminated {
                return Err(ParseError::UnterminatedString { position });
            }
            tokens.push(Token {
                kind: TokenKind::Str(text),
                position,
            });
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, c)| c);
        let kind = match (ch, next) {
            ('(', _) => TokenKind::LParen,
            (')', _) => TokenKind::RParen,
            ('[', _) => TokenKind::LBracket,
            (']', _) => TokenKind::RBracket,
            (',', _) => TokenKind::Comma,
            ('.', _) => TokenKind::Dot,
            ('?', _) => TokenKind::Question,
            (':', _) => TokenKind::Colon,
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,
            ('&', Some('&')) => {
                chars.next();
                TokenKind::AndAnd
            }
            ('|', Some('|')) => {
                chars.next();
                TokenKind::OrOr
            }
            ('=', Some('>')) => {
                chars.next();
                TokenKind::Arrow
            }
            ('=', Some('=')) => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('=') {
                    chars.next();
                    TokenKind::StrictEq
                } else {
                    TokenKind::EqEq
                }
            }
            ('!', Some('=')) => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('=') {
                    chars.next();
                    TokenKind::StrictNotEq
                } else {
                    TokenKind::NotEq
                }
            }
            ('!', _) => TokenKind::Bang,
            ('<', Some('=')) => {
                chars.next();
                TokenKind::Le
            }
            ('<', _) => TokenKind::Lt,
            ('>', Some('=')) => {
                chars.next();
                TokenKind::Ge
            }
            ('>', _) => TokenKind::Gt,
            // Bare `=`, `&`, `|`, `;`, backticks and braces have no meaning here.
            (other, _) => {
                return Err(ParseError::UnexpectedCharacter {
                    ch: other,
                    position,
                });
            }
        };
        tokens.push(Token { kind, position });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: source.len(),
    });
    Ok(tokens)
}
