//! Pratt expression parser for operator precedence.

use crate::lexer::{Keyword, TokenKind};

/// Binding power of comparison and predicate operators.
pub const COMPARISON_BP: (u8, u8) = (7, 8);

/// Returns the prefix binding power for a prefix operator token.
///
/// Returns `None` if the token is not a prefix operator.
#[must_use]
pub const fn prefix_binding_power(kind: &TokenKind) -> Option<u8> {
    match kind {
        // Unary minus and plus
        TokenKind::Minus | TokenKind::Plus => Some(15),
        // NOT keyword
        TokenKind::Keyword(Keyword::Not) => Some(5),
        _ => None,
    }
}

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` where:
/// - Higher binding power = binds tighter
/// - Left associative: left_bp < right_bp
///
/// Returns `None` if the token is not an infix operator. An infix `NOT` only
/// counts when it negates a following predicate; the caller checks that.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        // Logical OR (lowest precedence)
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),

        // Logical AND
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),

        // Comparison operators
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq => Some(COMPARISON_BP),

        // IS, IN, BETWEEN, LIKE, MEMBER OF and their negations
        TokenKind::Keyword(
            Keyword::Is
            | Keyword::In
            | Keyword::Between
            | Keyword::Like
            | Keyword::Ilike
            | Keyword::Member
            | Keyword::Not,
        ) => Some(COMPARISON_BP),

        // Additive (string concat has same precedence as addition)
        TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => Some((11, 12)),

        // Multiplicative
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((13, 14)),

        _ => None,
    }
}
