//! Text syntax for tracer expressions.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' number | ('-' | '+') unary | power
//! power  := atom (('^' | '**') unary)?
//! atom   := number | ident ( '(' (expr (',' expr)*)? ')' )? | '(' expr ')'
//! ```
//!
//! Identifiers start with a letter or `_` and continue with letters,
//! digits or `_`; Unicode letters such as `α` or `μ₀` are accepted.
//! A minus directly before a number that is not raised to a power reads
//! as a negative literal.

use crate::expr::{BinaryOp, Expr};

/// A syntax error in expression text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at position {position}: {message}")]
pub struct ParseError {
    /// Character offset of the offending token.
    pub position: usize,
    /// What was expected or found.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    End,
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(v) => format!("number `{v}`"),
        Token::Ident(s) => format!("identifier `{s}`"),
        Token::Plus => "`+`".into(),
        Token::Minus => "`-`".into(),
        Token::Star => "`*`".into(),
        Token::Slash => "`/`".into(),
        Token::Caret => "`^`".into(),
        Token::LParen => "`(`".into(),
        Token::RParen => "`)`".into(),
        Token::Comma => "`,`".into(),
        Token::End => "end of input".into(),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::Caret
            }
            '*' => Token::Star,
            c if c.is_ascii_digit() || c == '.' => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal.parse::<f64>().map_err(|_| ParseError {
                    position: start,
                    message: format!("malformed number `{literal}`"),
                })?;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            c if is_ident_start(c) => {
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
                continue;
            }
            other => {
                return Err(ParseError {
                    position: start,
                    message: format!("unexpected character `{other}`"),
                })
            }
        };
        tokens.push((start, token));
        i += 1;
    }
    tokens.push((chars.len(), Token::End));
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.cursor)
            .map_or(&Token::End, |(_, token)| token)
    }

    fn peek_ahead(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.cursor + offset)
            .map_or(&Token::End, |(_, token)| token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.cursor).map_or(0, |(pos, _)| *pos)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        self.cursor += 1;
        token
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError {
            position: self.position(),
            message: format!("expected {expected}, found {}", describe(self.peek())),
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.peek() == token {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.error(&describe(token)))
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            lhs = Expr::binary(op, lhs, self.term()?);
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            lhs = Expr::binary(op, lhs, self.unary()?);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Token::Minus => {
                // `-2` is the literal -2, `-2 ^ x` and `-(2)` stay negations.
                if let Token::Number(v) = *self.peek_ahead(1) {
                    if *self.peek_ahead(2) != Token::Caret {
                        self.cursor += 2;
                        return Ok(Expr::Literal(-v));
                    }
                }
                self.cursor += 1;
                Ok(-self.unary()?)
            }
            Token::Plus => {
                self.cursor += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if *self.peek() == Token::Caret {
            self.cursor += 1;
            return Ok(base.pow(self.unary()?));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let position = self.position();
        match self.advance() {
            Token::Number(v) => Ok(Expr::Literal(v)),
            Token::Ident(name) => {
                if *self.peek() != Token::LParen {
                    return Ok(Expr::Symbol(name));
                }
                self.cursor += 1;
                let mut args = Vec::new();
                if *self.peek() != Token::RParen {
                    args.push(self.expr()?);
                    while *self.peek() == Token::Comma {
                        self.cursor += 1;
                        args.push(self.expr()?);
                    }
                }
                self.expect(&Token::RParen)?;
                Ok(Expr::Call {
                    function: name,
                    args,
                })
            }
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(ParseError {
                position,
                message: format!("expected an operand, found {}", describe(&other)),
            }),
        }
    }
}

/// Parses expression text into an [`Expr`].
///
/// # Errors
///
/// Returns [`ParseError`] with the character offset of the first token that
/// does not fit the grammar.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        cursor: 0,
    };
    let expr = parser.expr()?;
    if *parser.peek() != Token::End {
        return Err(parser.error("an operator or end of input"));
    }
    Ok(expr)
}
