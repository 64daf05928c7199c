//! Front end for the Eidos scripting language.
//!
//! Turns script text into tokens, tokens into a syntax tree, and tidies
//! the tree for an evaluator. Also provides the call signatures hosts use
//! to describe native functions and check the argument lists an evaluator
//! assembles for them.
//!
//! # Quick start
//!
//! ## Parse a script
//!
//! ```
//! use eidos_syntax::{TokenKind, parse_str};
//!
//! let root = parse_str("x = 1 + 2 * 3;\nprint(x)").unwrap();
//! assert_eq!(root.kind(), TokenKind::InterpreterBlock);
//! assert_eq!(root.to_string(), "($> (= x (+ 1 (* 2 3))) (( print x))");
//! ```
//!
//! ## Drive the stages yourself
//!
//! ```
//! use eidos_syntax::{Script, ScriptOptions};
//!
//! let mut script = Script::new("for (i in 1:3) { total = total + i; }", 0);
//! script.tokenize(false).unwrap();
//! script.add_optional_semicolon();
//! let root = script.parse_interpreter_block().unwrap();
//! assert_eq!(root.children.len(), 1);
//!
//! let mut broken = Script::new("if (x 1;", 0);
//! let err = broken.compile(ScriptOptions::default()).unwrap_err();
//! assert!(err.to_string().contains("if statement"));
//! assert!(broken.last_error().is_some());
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod script;
pub mod signature;
pub mod token;
pub mod value;

pub use ast::{AstNode, Literal};
pub use lexer::{LexError, LexErrorKind, add_optional_semicolon, tokenize, tokenize_at};
pub use optimizer::optimize;
pub use parser::{MAX_NESTING_DEPTH, ParseError, ParseErrorKind, parse};
pub use script::{Script, ScriptOptions};
pub use signature::{
    Argument, DefaultValue, Signature, SignatureBuilder, TypeError, TypeErrorKind,
};
pub use token::{Span, Token, TokenKind};
pub use value::{Shaped, ValueMask, ValueShape, ValueType};

/// Unified error type covering lexing, parsing, and call-shape checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A signature check error.
    #[error("{0}")]
    Type(#[from] TypeError),
    /// A script was parsed before it was tokenized.
    #[error("script has no tokens to parse; tokenize it first")]
    NotTokenized,
}

impl Error {
    /// Source span of a lex or parse error. Type errors name a position
    /// in an argument list instead.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::Lex(e) => Some(e.span),
            Self::Parse(e) => Some(e.span),
            Self::Type(_) | Self::NotTokenized => None,
        }
    }
}

/// Tokenize, repair the final semicolon, parse, and optimize in one step.
pub fn parse_str(input: &str) -> Result<AstNode, Error> {
    let mut tokens = tokenize(input, false)?;
    add_optional_semicolon(&mut tokens);
    let mut root = parse(&tokens)?;
    optimize(&mut root);
    Ok(root)
}
