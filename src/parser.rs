use std::fmt;

use crate::ast::AstNode;
use crate::token::{Span, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was required by the production named in `context`.
    UnexpectedToken {
        found: TokenKind,
        text: String,
        expected: TokenKind,
        context: &'static str,
    },
    /// An operand was required but the token cannot start an expression.
    ExpectedExpression {
        found: TokenKind,
        text: String,
        context: &'static str,
    },
    /// Statements or operands nest deeper than [`MAX_NESTING_DEPTH`].
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken {
                text,
                expected,
                context,
                ..
            } => {
                write!(
                    f,
                    "unexpected token '{text}' in {context}; expected '{expected}'"
                )
            }
            Self::ExpectedExpression { text, context, .. } => {
                write!(f, "unexpected token '{text}' in {context}; expected an expression")
            }
            Self::NestingTooDeep { limit } => {
                write!(f, "nesting exceeds the limit of {limit} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at characters {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Deepest nesting the parser accepts, counting statements, operands,
/// and every link of an operator or postfix chain. Keeps the recursive
/// parser and every later walk over the tree within a small stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parse a token stream into an interpreter-block tree.
///
/// The stream must end with an EOF token, as produced by
/// [`crate::lexer::tokenize`]. Whitespace and comment tokens are skipped.
/// Run [`crate::lexer::add_optional_semicolon`] first to allow the last
/// statement to omit its `;`.
///
/// # Errors
///
/// Returns `ParseError` at the first token that does not fit the grammar,
/// or where nesting passes [`MAX_NESTING_DEPTH`].
pub fn parse(tokens: &[Token]) -> Result<AstNode, ParseError> {
    Parser::new(tokens).parse_interpreter_block()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// End of the last consumed token.
    last_end: Option<usize>,
    depth: usize,
    eof: Token,
}

type ParseResult = Result<AstNode, ParseError>;

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let eof_at = tokens.last().map_or(0, |t| t.span.end);
        let mut parser = Self {
            tokens,
            pos: 0,
            last_end: None,
            depth: 0,
            eof: Token::new(TokenKind::Eof, "EOF", Span::at(eof_at)),
        };
        parser.skip_nonsignificant();
        parser
    }

    /// Current token; past the end of the stream this is always EOF.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current().kind)
    }

    fn skip_nonsignificant(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind.is_nonsignificant())
        {
            self.pos += 1;
        }
    }

    /// Take the current token and move on; EOF is never consumed.
    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.last_end = Some(token.span.end);
            self.pos += 1;
            self.skip_nonsignificant();
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, context: &'static str) -> Result<Token, ParseError> {
        if self.at(kind) {
            return Ok(self.consume());
        }
        Err(self.unexpected(kind, context))
    }

    fn unexpected(&self, expected: TokenKind, context: &'static str) -> ParseError {
        let found = self.current();
        ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                found: found.kind,
                text: found.text.clone(),
                expected,
                context,
            },
            span: found.span,
        }
    }

    fn expected_expression(&self, context: &'static str) -> ParseError {
        let found = self.current();
        ParseError {
            kind: ParseErrorKind::ExpectedExpression {
                found: found.kind,
                text: found.text.clone(),
                context,
            },
            span: found.span,
        }
    }

    /// Enter one nesting level. Callers undo it by decrementing `depth`;
    /// after an error the parser is abandoned, so that is skipped there.
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError {
                kind: ParseErrorKind::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                },
                span: self.current().span,
            });
        }
        Ok(())
    }

    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult) -> ParseResult {
        self.descend()?;
        let node = parse(self)?;
        self.depth -= 1;
        Ok(node)
    }

    // -- statements --

    fn parse_interpreter_block(mut self) -> ParseResult {
        let start = self.current().span.start;
        let mut children = Vec::new();

        while !self.at(TokenKind::Eof) {
            children.push(self.parse_statement()?);
        }

        let eof_start = self.current().span.start;
        self.expect(TokenKind::Eof, "interpreter block")?;

        // The virtual semicolon sits on the EOF position; keep the block
        // inside the source.
        let span = match self.last_end {
            Some(end) if eof_start > start => Span::new(start, end.min(eof_start - 1)),
            _ => Span::at(eof_start),
        };

        Ok(AstNode {
            token: Token::new(TokenKind::InterpreterBlock, "", span),
            children,
            cached: None,
        })
    }

    fn parse_statement(&mut self) -> ParseResult {
        self.nested(|p| match p.current().kind {
            TokenKind::LBrace => p.parse_compound_statement(),
            TokenKind::If => p.parse_selection_statement(),
            TokenKind::Do => p.parse_do_while_statement(),
            TokenKind::While => p.parse_while_statement(),
            TokenKind::For => p.parse_for_statement(),
            TokenKind::Next | TokenKind::Break | TokenKind::Return => p.parse_jump_statement(),
            _ => p.parse_expr_statement(),
        })
    }

    fn parse_compound_statement(&mut self) -> ParseResult {
        let open = self.expect(TokenKind::LBrace, "compound statement")?;
        let mut children = Vec::new();

        loop {
            match self.current().kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.unexpected(TokenKind::RBrace, "compound statement")),
                _ => children.push(self.parse_statement()?),
            }
        }

        let close = self.expect(TokenKind::RBrace, "compound statement")?;
        let span = open.span.cover(close.span);

        Ok(AstNode {
            token: Token::new(TokenKind::CompoundStatement, "", span),
            children,
            cached: None,
        })
    }

    fn parse_expr_statement(&mut self) -> ParseResult {
        if self.at(TokenKind::Semicolon) {
            // empty statement
            return Ok(AstNode::new(self.consume()));
        }
        let node = self.parse_assignment_expr()?;
        self.expect(TokenKind::Semicolon, "expression statement")?;
        Ok(node)
    }

    fn parse_selection_statement(&mut self) -> ParseResult {
        let mut node = AstNode::new(self.expect(TokenKind::If, "if statement")?);
        self.expect(TokenKind::LParen, "if statement")?;
        node.push(self.parse_expr()?);
        self.expect(TokenKind::RParen, "if statement")?;
        node.push(self.parse_statement()?);

        if self.at(TokenKind::Else) {
            self.consume();
            node.push(self.parse_statement()?);
        }

        Ok(node)
    }

    fn parse_do_while_statement(&mut self) -> ParseResult {
        let mut node = AstNode::new(self.expect(TokenKind::Do, "do/while statement")?);
        node.push(self.parse_statement()?);
        self.expect(TokenKind::While, "do/while statement")?;
        self.expect(TokenKind::LParen, "do/while statement")?;
        node.push(self.parse_expr()?);
        self.expect(TokenKind::RParen, "do/while statement")?;
        self.expect(TokenKind::Semicolon, "do/while statement")?;
        Ok(node)
    }

    fn parse_while_statement(&mut self) -> ParseResult {
        let mut node = AstNode::new(self.expect(TokenKind::While, "while statement")?);
        self.expect(TokenKind::LParen, "while statement")?;
        node.push(self.parse_expr()?);
        self.expect(TokenKind::RParen, "while statement")?;
        node.push(self.parse_statement()?);
        Ok(node)
    }

    fn parse_for_statement(&mut self) -> ParseResult {
        let mut node = AstNode::new(self.expect(TokenKind::For, "for statement")?);
        self.expect(TokenKind::LParen, "for statement")?;
        node.push(AstNode::new(
            self.expect(TokenKind::Identifier, "for statement")?,
        ));
        self.expect(TokenKind::In, "for statement")?;
        node.push(self.parse_expr()?);
        self.expect(TokenKind::RParen, "for statement")?;
        node.push(self.parse_statement()?);
        Ok(node)
    }

    fn parse_jump_statement(&mut self) -> ParseResult {
        let mut node = AstNode::new(self.consume());
        match node.kind() {
            TokenKind::Return => {
                if !self.at(TokenKind::Semicolon) {
                    node.push(self.parse_expr()?);
                }
                self.expect(TokenKind::Semicolon, "return statement")?;
            }
            _ => {
                self.expect(TokenKind::Semicolon, "next/break statement")?;
            }
        }
        Ok(node)
    }

    // -- expressions --

    fn parse_expr(&mut self) -> ParseResult {
        self.parse_logical_or_expr()
    }

    /// `LogicalOrExpr ('=' LogicalOrExpr)?`; only used at statement and
    /// argument level so assignment never nests.
    fn parse_assignment_expr(&mut self) -> ParseResult {
        let left = self.parse_logical_or_expr()?;
        if !self.at(TokenKind::Assign) {
            return Ok(left);
        }
        let mut node = AstNode::with_child(self.consume(), left);
        node.push(self.parse_logical_or_expr()?);
        Ok(node)
    }

    /// Builds one flat node holding every operand of a chain of the same
    /// operator: `a | b | c` is `(| a b c)`.
    fn parse_flat_chain(
        &mut self,
        kind: TokenKind,
        next: fn(&mut Self) -> ParseResult,
    ) -> ParseResult {
        let left = next(self)?;
        if !self.at(kind) {
            return Ok(left);
        }
        let mut node = AstNode::with_child(self.consume(), left);
        node.push(next(self)?);
        while self.at(kind) {
            self.consume();
            node.push(next(self)?);
        }
        Ok(node)
    }

    /// Left-associative binary level: `a - b - c` is `(- (- a b) c)`.
    fn parse_left_assoc(
        &mut self,
        ops: &[TokenKind],
        next: fn(&mut Self) -> ParseResult,
    ) -> ParseResult {
        let mut left = next(self)?;
        let mut links = 0;
        while self.at_any(ops) {
            // each link puts the chain so far one level deeper
            self.descend()?;
            links += 1;
            let mut node = AstNode::with_child(self.consume(), left);
            node.push(next(self)?);
            left = node;
        }
        self.depth -= links;
        Ok(left)
    }

    fn parse_logical_or_expr(&mut self) -> ParseResult {
        self.parse_flat_chain(TokenKind::Or, Self::parse_logical_and_expr)
    }

    fn parse_logical_and_expr(&mut self) -> ParseResult {
        self.parse_flat_chain(TokenKind::And, Self::parse_equality_expr)
    }

    fn parse_equality_expr(&mut self) -> ParseResult {
        self.parse_left_assoc(
            &[TokenKind::Eq, TokenKind::NotEq],
            Self::parse_relational_expr,
        )
    }

    fn parse_relational_expr(&mut self) -> ParseResult {
        self.parse_left_assoc(
            &[
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
            ],
            Self::parse_add_expr,
        )
    }

    fn parse_add_expr(&mut self) -> ParseResult {
        self.parse_left_assoc(&[TokenKind::Plus, TokenKind::Minus], Self::parse_mult_expr)
    }

    fn parse_mult_expr(&mut self) -> ParseResult {
        self.parse_left_assoc(
            &[TokenKind::Mult, TokenKind::Div, TokenKind::Mod],
            Self::parse_seq_expr,
        )
    }

    /// Range operator; `1:2:3` is rejected by the caller seeing a stray `:`.
    fn parse_seq_expr(&mut self) -> ParseResult {
        let left = self.parse_exp_expr()?;
        if !self.at(TokenKind::Colon) {
            return Ok(left);
        }
        let mut node = AstNode::with_child(self.consume(), left);
        node.push(self.parse_exp_expr()?);
        Ok(node)
    }

    fn parse_exp_expr(&mut self) -> ParseResult {
        self.parse_left_assoc(&[TokenKind::Exp], Self::parse_unary_expr)
    }

    fn parse_unary_expr(&mut self) -> ParseResult {
        self.nested(|p| {
            if p.at_any(&[TokenKind::Plus, TokenKind::Minus, TokenKind::Not]) {
                let mut node = AstNode::new(p.consume());
                node.push(p.parse_unary_expr()?);
                return Ok(node);
            }
            p.parse_postfix_expr()
        })
    }

    fn parse_postfix_expr(&mut self) -> ParseResult {
        let mut left = self.parse_primary_expr()?;
        let mut links = 0;

        loop {
            if self.at_any(&[TokenKind::LBracket, TokenKind::LParen, TokenKind::Dot]) {
                self.descend()?;
                links += 1;
            }
            match self.current().kind {
                TokenKind::LBracket => {
                    let mut node = AstNode::with_child(self.consume(), left);
                    node.push(self.parse_expr()?);
                    self.expect(TokenKind::RBracket, "postfix subset expression")?;
                    left = node;
                }
                TokenKind::LParen => {
                    let mut node = AstNode::with_child(self.consume(), left);
                    if self.at(TokenKind::RParen) {
                        self.consume();
                    } else {
                        node.push(self.parse_argument_expr_list()?);
                        self.expect(TokenKind::RParen, "postfix function call expression")?;
                    }
                    left = node;
                }
                TokenKind::Dot => {
                    let mut node = AstNode::with_child(self.consume(), left);
                    node.push(AstNode::new(
                        self.expect(TokenKind::Identifier, "postfix member expression")?,
                    ));
                    left = node;
                }
                _ => break,
            }
        }

        self.depth -= links;
        Ok(left)
    }

    fn parse_primary_expr(&mut self) -> ParseResult {
        match self.current().kind {
            TokenKind::Number | TokenKind::String | TokenKind::Identifier => {
                Ok(AstNode::new(self.consume()))
            }
            TokenKind::LParen => {
                self.consume();
                let node = self.parse_expr()?;
                self.expect(TokenKind::RParen, "primary parenthesized expression")?;
                Ok(node)
            }
            _ => Err(self.expected_expression("primary expression")),
        }
    }

    fn parse_argument_expr_list(&mut self) -> ParseResult {
        self.parse_flat_chain(TokenKind::Comma, Self::parse_assignment_expr)
    }
}
