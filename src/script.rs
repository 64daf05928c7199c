//! One source text and the token stream and tree built from it.
//!
//! A [`Script`] drives the front end stage by stage. Each stage replaces
//! what the previous run of that stage produced, and a failed stage
//! leaves its output empty with the error kept in [`Script::last_error`].

use crate::Error;
use crate::ast::AstNode;
use crate::lexer;
use crate::optimizer;
use crate::parser;
use crate::token::{Span, Token};

/// Settings for [`Script::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Keep whitespace and comment tokens in the stream.
    pub keep_nonsignificant: bool,
    /// Let the last statement omit its `;`.
    pub optional_semicolon: bool,
    /// Run the optimizer over the parsed tree.
    pub optimize: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            keep_nonsignificant: false,
            optional_semicolon: true,
            optimize: true,
        }
    }
}

/// Owner of one source text, its tokens, and its tree.
#[derive(Debug, Clone)]
pub struct Script {
    source: String,
    start_offset: usize,
    tokens: Vec<Token>,
    root: Option<AstNode>,
    last_error: Option<Error>,
}

impl Script {
    /// Wrap `source`, a fragment that starts `start_offset` characters
    /// into its enclosing document (0 for a standalone script).
    #[must_use]
    pub fn new(source: impl Into<String>, start_offset: usize) -> Self {
        Self {
            source: source.into(),
            start_offset,
            tokens: Vec::new(),
            root: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Current token stream; empty before tokenizing or after a failure.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Current tree, if the last parse succeeded.
    #[must_use]
    pub const fn ast(&self) -> Option<&AstNode> {
        self.root.as_ref()
    }

    /// Error from the most recent failed stage, if it failed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Take the tree out of the script.
    #[must_use]
    pub fn into_ast(self) -> Option<AstNode> {
        self.root
    }

    /// Tokenize the source, discarding any earlier tokens and tree.
    pub fn tokenize(&mut self, keep_nonsignificant: bool) -> Result<(), Error> {
        self.tokens = Vec::new();
        self.root = None;
        self.last_error = None;

        let tokens = lexer::tokenize_at(&self.source, self.start_offset, keep_nonsignificant)
            .map_err(|e| self.fail(e))?;
        self.tokens = tokens;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(tokens = %self.token_dump(), "tokenized script");
        }
        Ok(())
    }

    /// Insert a virtual `;` before EOF if the last statement lacks one.
    pub fn add_optional_semicolon(&mut self) {
        lexer::add_optional_semicolon(&mut self.tokens);
    }

    /// Parse the current tokens and optimize the result.
    ///
    /// Fails without parsing when there are no tokens: with the lex error
    /// again if tokenizing failed, or [`Error::NotTokenized`] if it never
    /// ran.
    pub fn parse_interpreter_block(&mut self) -> Result<&AstNode, Error> {
        self.parse_with(true)
    }

    /// Run every stage selected by `options`.
    pub fn compile(&mut self, options: ScriptOptions) -> Result<&AstNode, Error> {
        self.tokenize(options.keep_nonsignificant)?;
        if options.optional_semicolon {
            self.add_optional_semicolon();
        }
        self.parse_with(options.optimize)
    }

    fn parse_with(&mut self, optimize: bool) -> Result<&AstNode, Error> {
        self.root = None;
        // a successful tokenize always leaves at least EOF
        if self.tokens.is_empty() {
            let err = match self.last_error.take() {
                Some(err @ Error::Lex(_)) => err,
                _ => Error::NotTokenized,
            };
            return Err(self.fail(err));
        }
        self.last_error = None;

        let mut root = parser::parse(&self.tokens).map_err(|e| self.fail(e))?;
        if optimize {
            optimizer::optimize(&mut root);
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(ast = %root.dump(), "parsed script");
        }
        Ok(self.root.insert(root))
    }

    fn fail(&mut self, err: impl Into<Error>) -> Error {
        let err = err.into();
        tracing::debug!(error = %err, "script stage failed");
        self.last_error = Some(err.clone());
        err
    }

    /// Source text covered by `span`, which is in the enclosing
    /// document's coordinates. `None` if the span lies outside this
    /// script.
    #[must_use]
    pub fn text_for_span(&self, span: Span) -> Option<String> {
        let start = span.start.checked_sub(self.start_offset)?;
        let end = span.end.checked_sub(self.start_offset)?;
        if end < start || end >= self.source.chars().count() {
            return None;
        }
        Some(self.source.chars().skip(start).take(end - start + 1).collect())
    }

    /// Flat `kind text` listing of the token stream.
    #[must_use]
    pub fn token_dump(&self) -> String {
        self.tokens
            .iter()
            .map(|t| format!("{} {}", t.kind.name(), t.text))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Indented dump of the tree, empty when there is none.
    #[must_use]
    pub fn ast_dump(&self) -> String {
        self.root.as_ref().map(AstNode::dump).unwrap_or_default()
    }
}
