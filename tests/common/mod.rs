#![allow(dead_code)]

use eidos_syntax::{
    AstNode, Error, ParseError, Token, TokenKind, add_optional_semicolon, parse, tokenize,
};

/// Token kinds of `input`, whitespace and comments dropped.
pub fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input, false)
        .expect("tokenize failed")
        .iter()
        .map(|t| t.kind)
        .collect()
}

/// Tokenize with the semicolon repair applied, as scripts are parsed.
pub fn repaired_tokens(input: &str) -> Vec<Token> {
    let mut tokens = tokenize(input, false).expect("tokenize failed");
    add_optional_semicolon(&mut tokens);
    tokens
}

/// Parse without optimizing.
pub fn parse_raw(input: &str) -> AstNode {
    parse(&repaired_tokens(input))
        .unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

/// S-expression of the unoptimized tree.
pub fn sexpr(input: &str) -> String {
    parse_raw(input).to_string()
}

/// The parse error for `input`, which must lex cleanly.
pub fn parse_error(input: &str) -> ParseError {
    match parse(&repaired_tokens(input)) {
        Ok(root) => panic!("expected a parse error, got {root}"),
        Err(e) => e,
    }
}

/// Node kind, child count and child order, recursively.
pub fn shape(node: &AstNode) -> String {
    let children: Vec<String> = node.children.iter().map(shape).collect();
    format!("{}[{}]", node.kind().name(), children.join(","))
}

pub fn unwrap_parse(err: Error) -> ParseError {
    match err {
        Error::Parse(e) => e,
        other => panic!("expected a parse error, got {other}"),
    }
}
