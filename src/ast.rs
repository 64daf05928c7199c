//! Syntax tree produced by the parser and consumed by an evaluator.
//!
//! Every node carries exactly one token, which names the production (the
//! operator, keyword, or literal that triggered it) and a list of owned
//! children in source order.

use std::fmt;

use crate::token::{Span, Token, TokenKind};

/// Constant value cached by the optimizer on a literal or a signed
/// numeric constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub token: Token,
    pub children: Vec<Self>,
    /// Filled in by [`crate::optimizer::optimize`] for nodes whose value
    /// is a constant.
    pub cached: Option<Literal>,
}

impl AstNode {
    #[must_use]
    pub const fn new(token: Token) -> Self {
        Self {
            token,
            children: Vec::new(),
            cached: None,
        }
    }

    /// Node with a first child already attached, as binary operators are
    /// built.
    #[must_use]
    pub fn with_child(token: Token, child: Self) -> Self {
        Self {
            token,
            children: vec![child],
            cached: None,
        }
    }

    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.token.kind
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.token.span
    }

    /// Span of this node's token widened to cover every descendant.
    #[must_use]
    pub fn full_span(&self) -> Span {
        self.children
            .iter()
            .fold(self.token.span, |acc, child| acc.cover(child.full_span()))
    }

    /// Indented multi-line dump, one node per line.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, indent: usize) {
        out.push_str(&"  ".repeat(indent));
        out.push_str(&self.label());
        out.push('\n');
        for child in &self.children {
            child.dump_into(out, indent + 1);
        }
    }

    fn label(&self) -> String {
        match self.token.kind {
            TokenKind::InterpreterBlock => "$>".to_string(),
            TokenKind::CompoundStatement => "{}".to_string(),
            TokenKind::String => self.token.lexeme(),
            _ => self.token.text.clone(),
        }
    }
}

/// Compact S-expression form: `(+ 1 (* 2 3))`.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label();
        if self.children.is_empty() {
            return f.write_str(&label);
        }
        write!(f, "({label}")?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}
