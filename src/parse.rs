//! Turning text into expression trees.

use crate::{
    expr::{BinOp, Node},
    format,
    value::{Matrix, Value},
};
use smol_str::SmolStr;
use std::{iter::Peekable, ops::Range};

/// Parse an expression tree from some text.
pub fn parse(s: &str) -> Result<Node, ParseError> { Parser::new(s).parse() }

/// A simple recursive descent parser (`LL(1)`) for converting a string into
/// an expression tree.
///
/// The grammar:
///
/// ```text
/// equation       := expression ("=" expression)?
///
/// expression     := expression "+" term
///                 | expression "-" term
///                 | term
///
/// term           := term ("*" | "/" | "%" | "**") factor
///                 | term factor          // implicit multiplication
///                 | factor
///
/// factor         := atom ("^" factor)?   // right-associative
///
/// atom           := NUMBER
///                 | IDENTIFIER "(" expression ")"
///                 | IDENTIFIER
///                 | "(" expression ")"
///                 | "[" matrix "]"
///                 | "|" expression "|"
///                 | ("+" | "-") atom-or-factor
///
/// matrix         := row (";" row)*
/// row            := "[" signed-number ("," signed-number)* "]"
/// ```
///
/// Implicit multiplication only kicks in when the next token starts with a
/// letter or an opening parenthesis, and `**` is picked apart from `*` by
/// the tokenizer's look-ahead.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Node, ParseError> {
        let expr = self.equation()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::TrailingInput { span: token.span }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.advance()?;

        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: kind.as_expectation(),
            })
        }
    }

    fn equation(&mut self) -> Result<Node, ParseError> {
        let left = self.expression()?;

        if self.peek() == Some(TokenKind::Equals) {
            let _ = self.advance()?;
            let right = self.expression()?;
            Ok(Node::binary(left, BinOp::Eq, right))
        } else {
            Ok(left)
        }
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        let mut expr = self.term()?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            let _ = self.advance()?;
            let right = self.term()?;
            expr = Node::binary(expr, op, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let mut expr = self.factor()?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Times) => {
                    let _ = self.advance()?;
                    BinOp::Mul
                },
                Some(TokenKind::Divide) => {
                    let _ = self.advance()?;
                    BinOp::Div
                },
                Some(TokenKind::Percent) => {
                    let _ = self.advance()?;
                    BinOp::Rem
                },
                Some(TokenKind::MatMul) => {
                    let _ = self.advance()?;
                    BinOp::MatMul
                },
                // a letter or an opening paren right after a factor is an
                // implicit multiplication
                Some(TokenKind::Identifier) | Some(TokenKind::OpenParen) => {
                    BinOp::Mul
                },
                _ => break,
            };
            let right = self.factor()?;
            expr = Node::binary(expr, op, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Node, ParseError> {
        let base = self.atom()?;

        if self.peek() == Some(TokenKind::Caret) {
            let _ = self.advance()?;
            let exponent = self.factor()?;
            Ok(Node::binary(base, BinOp::Pow, exponent))
        } else {
            Ok(base)
        }
    }

    fn atom(&mut self) -> Result<Node, ParseError> {
        let expected = &[
            TokenKind::Number,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::OpenBracket,
            TokenKind::Bar,
            TokenKind::Plus,
            TokenKind::Minus,
        ];

        match self.peek() {
            Some(TokenKind::Number) => {
                let token = self.expect(TokenKind::Number)?;
                let value = validate_literal(&token)?;
                return Ok(Node::Constant(Value::real(value)));
            },
            Some(TokenKind::Identifier) => {
                return self.variable_or_call();
            },
            Some(TokenKind::OpenParen) => {
                let _ = self.advance()?;
                let expr = self.expression()?;
                self.expect(TokenKind::CloseParen)?;
                return Ok(expr);
            },
            Some(TokenKind::OpenBracket) => {
                return self.matrix();
            },
            Some(TokenKind::Bar) => {
                let _ = self.advance()?;
                let arg = self.expression()?;
                self.expect(TokenKind::Bar)?;
                return Ok(Node::Call {
                    name: SmolStr::new("abs"),
                    arg: Box::new(arg),
                });
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                // a leading plus folds into a literal and is a no-op on
                // anything else
                return if self.peek() == Some(TokenKind::Number) {
                    let token = self.expect(TokenKind::Number)?;
                    let value = validate_literal(&token)?;
                    Ok(Node::Constant(Value::real(value)))
                } else {
                    self.factor()
                };
            },
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                // a leading minus folds into a literal's sign; anything else
                // gets multiplied by -1
                return if self.peek() == Some(TokenKind::Number) {
                    let token = self.expect(TokenKind::Number)?;
                    let value = validate_literal(&token)?;
                    Ok(Node::Constant(Value::real(-value)))
                } else {
                    let operand = self.factor()?;
                    Ok(Node::binary(
                        Node::Constant(Value::real(-1.0)),
                        BinOp::Mul,
                        operand,
                    ))
                };
            },
            _ => {},
        }

        // we couldn't parse the atom, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected,
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn variable_or_call(&mut self) -> Result<Node, ParseError> {
        let ident = self.expect(TokenKind::Identifier)?;

        // the bare identifier `i` is the imaginary unit, not a variable
        if ident.text == "i" {
            return Ok(Node::Constant(Value::complex(0.0, 1.0)));
        }

        let name = SmolStr::new(ident.text.to_lowercase());

        if self.peek() == Some(TokenKind::OpenParen) {
            let _ = self.advance()?;
            let arg = self.expression()?;
            self.expect(TokenKind::CloseParen)?;
            Ok(Node::Call {
                name,
                arg: Box::new(arg),
            })
        } else {
            Ok(Node::Variable(name))
        }
    }

    fn matrix(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenKind::OpenBracket)?;

        let mut rows: Vec<Vec<f64>> = Vec::new();
        loop {
            self.expect(TokenKind::OpenBracket)?;
            let mut row = Vec::new();
            loop {
                row.push(self.signed_number()?);
                if self.peek() == Some(TokenKind::Comma) {
                    let _ = self.advance()?;
                } else {
                    break;
                }
            }
            let close = self.expect(TokenKind::CloseBracket)?;

            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(ParseError::JaggedMatrix { span: close.span });
                }
            }
            rows.push(row);

            if self.peek() == Some(TokenKind::Semicolon) {
                let _ = self.advance()?;
            } else {
                break;
            }
        }
        self.expect(TokenKind::CloseBracket)?;

        let mut matrix = Matrix::zeroed(rows.len(), rows[0].len());
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                matrix.set(r, c, *value);
            }
        }

        Ok(Node::Constant(Value::Matrix(matrix)))
    }

    fn signed_number(&mut self) -> Result<f64, ParseError> {
        let negate = match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                true
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                false
            },
            _ => false,
        };

        let token = self.expect(TokenKind::Number)?;
        let value = validate_literal(&token)?;
        Ok(if negate { -value } else { value })
    }
}

/// Accept a numeric literal only if re-rendering the parsed value at the
/// literal's own decimal precision reproduces the source text exactly. This
/// rejects things like `3.140`, `007`, `.5` or digit runs with a second dot.
fn validate_literal(token: &Token<'_>) -> Result<f64, ParseError> {
    let malformed = ParseError::MalformedNumber {
        span: token.span.clone(),
    };

    let value: f64 = token.text.parse().map_err(|_| malformed.clone())?;
    let precision = match token.text.find('.') {
        Some(dot) => token.text.len() - dot - 1,
        None => 1000,
    };

    if format::fixedout(value, precision) == token.text {
        Ok(value)
    } else {
        Err(malformed)
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidCharacter {
        character: char,
        index: usize,
    },
    UnexpectedEndOfInput,
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    MalformedNumber {
        span: Range<usize>,
    },
    JaggedMatrix {
        span: Range<usize>,
    },
    TrailingInput {
        span: Range<usize>,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidCharacter { character, index } => {
                write!(f, "invalid character {:?} at offset {}", character, index)
            },
            ParseError::UnexpectedEndOfInput => {
                write!(f, "unexpected end of input")
            },
            ParseError::UnexpectedToken {
                found,
                span,
                expected,
            } => write!(
                f,
                "unexpected {:?} at {}..{}, expected one of {:?}",
                found, span.start, span.end, expected
            ),
            ParseError::MalformedNumber { span } => {
                write!(f, "malformed number at {}..{}", span.start, span.end)
            },
            ParseError::JaggedMatrix { span } => write!(
                f,
                "matrix rows have mismatched lengths (at {}..{})",
                span.start, span.end
            ),
            ParseError::TrailingInput { span } => {
                write!(f, "unexpected trailing input at offset {}", span.start)
            },
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        let tok = Token {
            text: &self.src[start..end],
            span: start..end,
            kind,
        };

        Some(Ok(tok))
    }

    fn take_while<P>(
        &mut self,
        mut predicate: P,
    ) -> Option<(&'a str, Range<usize>)>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;

        if start != end {
            let text = &self.src[start..end];
            Some((text, start..end))
        } else {
            None
        }
    }

    /// Chomps either a `*` or, with one character of look-ahead, a `**`.
    fn chomp_star(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.advance();

        let kind = if self.peek() == Some('*') {
            self.advance();
            TokenKind::MatMul
        } else {
            TokenKind::Times
        };

        Token::from_text(self.src, start..self.cursor, kind)
    }

    fn chomp_number(&mut self) -> Token<'a> {
        let (_, span) = self
            .take_while(|c| c.is_ascii_digit() || c == '.')
            .expect("We know there should be at least 1 character");

        Token::from_text(self.src, span, TokenKind::Number)
    }

    fn chomp_identifier(&mut self) -> Token<'a> {
        let (_, span) = self
            .take_while(|c| c.is_ascii_alphabetic())
            .expect("We know there should be at least 1 character");

        Token::from_text(self.src, span, TokenKind::Identifier)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen),
                ')' => self.chomp(TokenKind::CloseParen),
                '[' => self.chomp(TokenKind::OpenBracket),
                ']' => self.chomp(TokenKind::CloseBracket),
                ',' => self.chomp(TokenKind::Comma),
                ';' => self.chomp(TokenKind::Semicolon),
                '|' => self.chomp(TokenKind::Bar),
                '=' => self.chomp(TokenKind::Equals),
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '/' => self.chomp(TokenKind::Divide),
                '%' => self.chomp(TokenKind::Percent),
                '^' => self.chomp(TokenKind::Caret),
                '*' => Some(Ok(self.chomp_star())),
                c if c.is_ascii_alphabetic() => {
                    Some(Ok(self.chomp_identifier()))
                },
                c if c.is_ascii_digit() || c == '.' => {
                    Some(Ok(self.chomp_number()))
                },
                other => Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: self.cursor,
                })),
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(src: &'a str, span: Range<usize>, kind: TokenKind) -> Self {
        Token {
            text: &src[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an expression's text form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Number,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    Semicolon,
    Bar,
    Plus,
    Minus,
    Times,
    Divide,
    Percent,
    Caret,
    MatMul,
    Equals,
}

impl TokenKind {
    fn as_expectation(self) -> &'static [TokenKind] {
        match self {
            TokenKind::Identifier => &[TokenKind::Identifier],
            TokenKind::Number => &[TokenKind::Number],
            TokenKind::OpenParen => &[TokenKind::OpenParen],
            TokenKind::CloseParen => &[TokenKind::CloseParen],
            TokenKind::OpenBracket => &[TokenKind::OpenBracket],
            TokenKind::CloseBracket => &[TokenKind::CloseBracket],
            TokenKind::Comma => &[TokenKind::Comma],
            TokenKind::Semicolon => &[TokenKind::Semicolon],
            TokenKind::Bar => &[TokenKind::Bar],
            TokenKind::Plus => &[TokenKind::Plus],
            TokenKind::Minus => &[TokenKind::Minus],
            TokenKind::Times => &[TokenKind::Times],
            TokenKind::Divide => &[TokenKind::Divide],
            TokenKind::Percent => &[TokenKind::Percent],
            TokenKind::Caret => &[TokenKind::Caret],
            TokenKind::MatMul => &[TokenKind::MatMul],
            TokenKind::Equals => &[TokenKind::Equals],
        }
    }
}
