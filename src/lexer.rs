use std::fmt;

use crate::token::{Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Character (or malformed number starting with it) that cannot
    /// start any token.
    UnrecognizedToken(char),
    /// Input ended before the closing quote of a string literal.
    UnexpectedEofInString,
    /// Backslash escape other than `\t \r \n \" \\`.
    IllegalEscape(char),
    /// Line break inside a string literal.
    IllegalNewlineInString,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedToken(ch) => {
                write!(f, "unrecognized token at character '{ch}'")
            }
            Self::UnexpectedEofInString => {
                write!(f, "unexpected EOF in string literal")
            }
            Self::IllegalEscape(ch) => {
                write!(f, "illegal escape \\{ch} in string literal")
            }
            Self::IllegalNewlineInString => {
                write!(f, "illegal newline in string literal")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at characters {span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Tokenize a script into a stream terminated by one EOF token.
///
/// Whitespace and comments are dropped unless `keep_nonsignificant` is
/// set.
///
/// # Errors
///
/// Returns `LexError` at the first character that cannot start a token,
/// on malformed numbers, and on bad string literals.
pub fn tokenize(input: &str, keep_nonsignificant: bool) -> Result<Vec<Token>, LexError> {
    tokenize_at(input, 0, keep_nonsignificant)
}

/// Like [`tokenize`], for a fragment that begins `start_offset` characters
/// into an enclosing document. All spans, including those of errors, are
/// shifted into the document's coordinates.
///
/// # Errors
///
/// Same as [`tokenize`].
pub fn tokenize_at(
    input: &str,
    start_offset: usize,
    keep_nonsignificant: bool,
) -> Result<Vec<Token>, LexError> {
    Lexer::new(input, start_offset).tokenize(keep_nonsignificant)
}

/// Insert a virtual `;` before EOF when the last token is not `;` or `}`.
///
/// This lets the final statement of a script omit its terminator. Running
/// it again on its own output changes nothing.
pub fn add_optional_semicolon(tokens: &mut Vec<Token>) {
    let Some(eof_index) = tokens.iter().rposition(|t| t.kind == TokenKind::Eof) else {
        return;
    };
    let last = tokens[..eof_index]
        .iter()
        .rev()
        .find(|t| !t.kind.is_nonsignificant());
    match last.map(|t| t.kind) {
        None | Some(TokenKind::Semicolon | TokenKind::RBrace) => {}
        Some(_) => {
            let at = tokens[eof_index].span.start;
            tracing::trace!(position = at, "inserting virtual semicolon");
            tokens.insert(eof_index, Token::new(TokenKind::Semicolon, ";", Span::at(at)));
        }
    }
}

struct Lexer {
    input: Vec<char>,
    pos: usize,
    offset: usize,
}

impl Lexer {
    fn new(input: &str, offset: usize) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            offset,
        }
    }

    fn tokenize(mut self, keep_nonsignificant: bool) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            let start = self.pos;
            let ch = self.input[self.pos];

            let kind = match ch {
                ';' => self.single(TokenKind::Semicolon),
                ':' => self.single(TokenKind::Colon),
                ',' => self.single(TokenKind::Comma),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                '.' => self.single(TokenKind::Dot),
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Mult),
                '^' => self.single(TokenKind::Exp),
                '%' => self.single(TokenKind::Mod),
                '&' => self.single(TokenKind::And),
                '|' => self.single(TokenKind::Or),
                '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::Assign),
                '<' => self.one_or_two('=', TokenKind::LtEq, TokenKind::Lt),
                '>' => self.one_or_two('=', TokenKind::GtEq, TokenKind::Gt),
                '!' => self.one_or_two('=', TokenKind::NotEq, TokenKind::Not),
                '/' if self.peek_at(1) == Some('/') => {
                    self.read_comment();
                    TokenKind::Comment
                }
                '/' => self.single(TokenKind::Div),
                ' ' | '\t' | '\n' | '\r' => {
                    self.read_whitespace();
                    TokenKind::Whitespace
                }
                '0'..='9' => self.read_number()?,
                'a'..='z' | 'A'..='Z' | '_' => {
                    self.read_identifier();
                    TokenKind::Identifier
                }
                '"' => {
                    let value = self.read_string()?;
                    tokens.push(Token::new(TokenKind::String, value, self.span(start)));
                    continue;
                }
                _ => {
                    return Err(LexError {
                        kind: LexErrorKind::UnrecognizedToken(ch),
                        span: self.span_between(start, start),
                    });
                }
            };

            if kind.is_nonsignificant() && !keep_nonsignificant {
                continue;
            }

            let text: String = self.input[start..self.pos].iter().collect();
            tokens.push(self.finish_token(kind, text, start));
        }

        let end = self.offset + self.input.len();
        tokens.push(Token::new(TokenKind::Eof, "EOF", Span::at(end)));

        tracing::trace!(count = tokens.len(), "tokenized");
        Ok(tokens)
    }

    fn finish_token(&self, kind: TokenKind, text: String, start: usize) -> Token {
        if kind == TokenKind::Identifier {
            if let Some(keyword) = TokenKind::keyword(&text) {
                return Token::new(keyword, format!("<{text}>"), self.span(start));
            }
        }
        Token::new(kind, text, self.span(start))
    }

    /// Span from `start` through the last consumed character.
    const fn span(&self, start: usize) -> Span {
        self.span_between(start, self.pos - 1)
    }

    const fn span_between(&self, start: usize, end: usize) -> Span {
        Span {
            start: self.offset + start,
            end: self.offset + end,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    const fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn one_or_two(&mut self, second: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.peek_at(1) == Some(second) {
            self.pos += 2;
            long
        } else {
            self.pos += 1;
            short
        }
    }

    fn read_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.pos += 1;
        }
    }

    fn read_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.pos += 1;
        }
    }

    fn read_identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) -> usize {
        let from = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - from
    }

    /// `[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?`
    ///
    /// An exponent marker without digits after it is an error reported
    /// against the whole number consumed so far.
    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.skip_digits();

        if self.peek() == Some('.') {
            self.pos += 1;
            self.skip_digits();
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                return Err(LexError {
                    kind: LexErrorKind::UnrecognizedToken(self.input[start]),
                    span: self.span(start),
                });
            }
        }

        Ok(TokenKind::Number)
    }

    /// Reads a string literal and returns its decoded value.
    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.pos;
        self.pos += 1; // opening quote

        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.string_error(start, LexErrorKind::UnexpectedEofInString));
            };
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(value);
                }
                '\\' => {
                    let Some(escaped) = self.peek_at(1) else {
                        return Err(self.string_error(start, LexErrorKind::UnexpectedEofInString));
                    };
                    let decoded = match escaped {
                        't' => '\t',
                        'r' => '\r',
                        'n' => '\n',
                        '"' => '"',
                        '\\' => '\\',
                        other => {
                            return Err(
                                self.string_error(start, LexErrorKind::IllegalEscape(other))
                            );
                        }
                    };
                    value.push(decoded);
                    self.pos += 2;
                }
                '\n' | '\r' => {
                    return Err(self.string_error(start, LexErrorKind::IllegalNewlineInString));
                }
                _ => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Error spanning the literal from its opening quote to the last
    /// character read.
    const fn string_error(&self, start: usize, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            span: self.span_between(start, self.pos - 1),
        }
    }
}
