use std::fmt;

/// Inclusive range of character offsets into the source.
///
/// Offsets are expressed in the outer coordinate space: when a script is
/// a fragment of a larger document, its start offset has already been
/// added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span of a single character.
    #[must_use]
    pub const fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span containing both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `;`, also used for the virtual semicolon inserted before EOF.
    Semicolon,
    Colon,
    Comma,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Exp,
    And,
    Or,
    Assign,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Not,

    /// Numeric literal (`12`, `1.5`, `3e-2`).
    Number,
    /// String literal; the token text holds the decoded value.
    String,
    Identifier,

    If,
    Else,
    Do,
    While,
    For,
    In,
    Next,
    Break,
    Return,

    /// Run of spaces, tabs, and line breaks. Only kept on request.
    Whitespace,
    /// `//` comment up to the end of the line. Only kept on request.
    Comment,

    /// End of input. Repeated reads past the end keep yielding it.
    Eof,
    /// Synthesized token of the program-level node.
    InterpreterBlock,
    /// Synthesized token of a `{ ... }` node.
    CompoundStatement,
}

impl TokenKind {
    /// Keyword kind for an identifier spelling, if it is one.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "if" => Self::If,
            "else" => Self::Else,
            "do" => Self::Do,
            "while" => Self::While,
            "for" => Self::For,
            "in" => Self::In,
            "next" => Self::Next,
            "break" => Self::Break,
            "return" => Self::Return,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Else
                | Self::Do
                | Self::While
                | Self::For
                | Self::In
                | Self::Next
                | Self::Break
                | Self::Return
        )
    }

    /// Whitespace and comments, which the parser never looks at.
    #[must_use]
    pub const fn is_nonsignificant(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Short name used in token dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Semicolon => "Semicolon",
            Self::Colon => "Colon",
            Self::Comma => "Comma",
            Self::LBrace => "LBrace",
            Self::RBrace => "RBrace",
            Self::LParen => "LParen",
            Self::RParen => "RParen",
            Self::LBracket => "LBracket",
            Self::RBracket => "RBracket",
            Self::Dot => "Dot",
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Mult => "Mult",
            Self::Div => "Div",
            Self::Mod => "Mod",
            Self::Exp => "Exp",
            Self::And => "And",
            Self::Or => "Or",
            Self::Assign => "Assign",
            Self::Eq => "Eq",
            Self::NotEq => "NotEq",
            Self::Lt => "Lt",
            Self::LtEq => "LtEq",
            Self::Gt => "Gt",
            Self::GtEq => "GtEq",
            Self::Not => "Not",
            Self::Number => "Number",
            Self::String => "String",
            Self::Identifier => "Identifier",
            Self::If => "If",
            Self::Else => "Else",
            Self::Do => "Do",
            Self::While => "While",
            Self::For => "For",
            Self::In => "In",
            Self::Next => "Next",
            Self::Break => "Break",
            Self::Return => "Return",
            Self::Whitespace => "Whitespace",
            Self::Comment => "Comment",
            Self::Eof => "EOF",
            Self::InterpreterBlock => "InterpreterBlock",
            Self::CompoundStatement => "CompoundStatement",
        }
    }
}

/// Renders the kind the way it is written in source, for error messages.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Dot => ".",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mult => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Exp => "^",
            Self::And => "&",
            Self::Or => "|",
            Self::Assign => "=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Not => "!",
            Self::Number => "number",
            Self::String => "string",
            Self::Identifier => "identifier",
            Self::If => "if",
            Self::Else => "else",
            Self::Do => "do",
            Self::While => "while",
            Self::For => "for",
            Self::In => "in",
            Self::Next => "next",
            Self::Break => "break",
            Self::Return => "return",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Eof => "EOF",
            Self::InterpreterBlock => "interpreter block",
            Self::CompoundStatement => "compound statement",
        };
        f.write_str(s)
    }
}

/// A single token with its kind, resolved text, and source span.
///
/// For string literals `text` is the escape-decoded value; for keywords it
/// is the bracketed display form (`<if>`). Use [`Token::lexeme`] to get the
/// source spelling back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Source spelling of the token, suitable for re-tokenizing.
    #[must_use]
    pub fn lexeme(&self) -> String {
        match self.kind {
            TokenKind::String => {
                let mut out = String::with_capacity(self.text.len() + 2);
                out.push('"');
                for ch in self.text.chars() {
                    match ch {
                        '\t' => out.push_str("\\t"),
                        '\r' => out.push_str("\\r"),
                        '\n' => out.push_str("\\n"),
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        _ => out.push(ch),
                    }
                }
                out.push('"');
                out
            }
            kind if kind.is_keyword() => self
                .text
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string(),
            _ => self.text.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
