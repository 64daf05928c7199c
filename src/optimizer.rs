//! Post-order simplification of a parsed tree.
//!
//! Caches the constant value of every literal leaf so an evaluator does not
//! have to re-read the token text, and caches the signed value on a unary
//! `+` or `-` applied directly to a numeric constant. Tokens and tree shape
//! are left as parsed: the evaluator must see the same result with or
//! without this pass, and may take any cached value as the node's result.

use crate::ast::{AstNode, Literal};
use crate::token::TokenKind;

/// Optimize `node` and all of its descendants in place.
pub fn optimize(node: &mut AstNode) {
    for child in &mut node.children {
        optimize(child);
    }

    match node.kind() {
        TokenKind::Number => node.cached = number_value(&node.token.text),
        TokenKind::String => node.cached = Some(Literal::Str(node.token.text.clone())),
        TokenKind::Plus | TokenKind::Minus if node.children.len() == 1 => cache_sign(node),
        _ => {}
    }
}

/// Value of a number token. A `.` or a negative exponent makes a float;
/// anything else is an integer, exponent included (`1e2` is 100).
/// Integers that do not fit in `i64` are left to the evaluator.
#[must_use]
pub fn number_value(text: &str) -> Option<Literal> {
    if text.contains(['.', '-']) {
        return text.parse::<f64>().ok().map(Literal::Float);
    }
    match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent: u32 = exponent.trim_start_matches('+').parse().ok()?;
            let scale = 10_i64.checked_pow(exponent)?;
            mantissa
                .parse::<i64>()
                .ok()?
                .checked_mul(scale)
                .map(Literal::Int)
        }
        None => text.parse::<i64>().ok().map(Literal::Int),
    }
}

fn cache_sign(node: &mut AstNode) {
    let negate = node.kind() == TokenKind::Minus;
    let value = match &node.children[0].cached {
        Some(Literal::Int(v)) if negate => match v.checked_neg() {
            Some(n) => Literal::Int(n),
            None => return,
        },
        Some(Literal::Float(v)) if negate => Literal::Float(-v),
        Some(lit @ (Literal::Int(_) | Literal::Float(_))) => lit.clone(),
        _ => return,
    };
    tracing::trace!(span = %node.full_span(), %value, "cached signed constant");
    node.cached = Some(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{add_optional_semicolon, tokenize};
    use crate::parser::parse;

    fn optimized(input: &str) -> AstNode {
        let mut tokens = tokenize(input, false).expect("tokenize failed");
        add_optional_semicolon(&mut tokens);
        let mut root = parse(&tokens).expect("parse failed");
        optimize(&mut root);
        root
    }

    #[test]
    fn caches_literals() {
        let root = optimized("f(3, 2.5, 1e2, 1e-2, \"s\");");
        let args = &root.children[0].children[1].children;
        assert_eq!(args[0].cached, Some(Literal::Int(3)));
        assert_eq!(args[1].cached, Some(Literal::Float(2.5)));
        assert_eq!(args[2].cached, Some(Literal::Int(100)));
        assert_eq!(args[3].cached, Some(Literal::Float(0.01)));
        assert_eq!(args[4].cached, Some(Literal::Str("s".to_string())));
    }

    #[test]
    fn exponent_literals() {
        assert_eq!(number_value("1e2"), Some(Literal::Int(100)));
        assert_eq!(number_value("7E+3"), Some(Literal::Int(7000)));
        assert_eq!(number_value("2.5e3"), Some(Literal::Float(2500.0)));
        assert_eq!(number_value("5e-1"), Some(Literal::Float(0.5)));
        assert_eq!(number_value("1e30"), None);
    }

    #[test]
    fn oversized_integer_stays_uncached() {
        let root = optimized("99999999999999999999;");
        assert_eq!(root.children[0].cached, None);
    }

    #[test]
    fn signed_literal_keeps_its_tokens() {
        let root = optimized("x = -5;");
        let rhs = &root.children[0].children[1];
        assert_eq!(rhs.kind(), TokenKind::Minus);
        assert_eq!(rhs.token.text, "-");
        assert_eq!(rhs.cached, Some(Literal::Int(-5)));
        assert_eq!(rhs.children[0].token.text, "5");
        assert_eq!(rhs.children[0].cached, Some(Literal::Int(5)));
    }

    #[test]
    fn nested_signs() {
        let root = optimized("-+-2.5;");
        assert_eq!(root.children[0].cached, Some(Literal::Float(2.5)));
        assert_eq!(root.to_string(), "($> (- (+ (- 2.5))))");
    }

    #[test]
    fn leaves_other_unary_alone() {
        assert_eq!(optimized("-x;").children[0].cached, None);
        assert_eq!(optimized("+\"a\";").children[0].cached, None);
        assert_eq!(optimized("!1;").children[0].cached, None);
    }

    #[test]
    fn binary_minus_untouched() {
        let root = optimized("3 - 2;");
        assert_eq!(root.to_string(), "($> (- 3 2))");
        assert_eq!(root.children[0].cached, None);
    }

    #[test]
    fn min_integer_is_not_cached() {
        let root = optimized("-9223372036854775808;");
        assert_eq!(root.children[0].kind(), TokenKind::Minus);
        assert_eq!(root.children[0].cached, None);
    }
}
