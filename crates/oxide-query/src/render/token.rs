//! Render tokens.

use std::sync::{Arc, OnceLock};

/// Token text that is produced after the token has been placed.
///
/// A placeholder is resolved exactly once. Clones share the same slot, so a
/// transformer can keep a handle and fill it in once the whole query has been
/// walked.
#[derive(Debug, Clone, Default)]
pub struct Placeholder(Arc<OnceLock<String>>);

impl Placeholder {
    /// Creates an unresolved placeholder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text. Returns false if the placeholder was already resolved.
    pub fn resolve(&self, text: impl Into<String>) -> bool {
        self.0.set(text.into()).is_ok()
    }

    /// Returns the text if resolved.
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }

    /// Returns true once the text is set.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.0.get().is_some()
    }
}

impl PartialEq for Placeholder {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Placeholder {}

/// The text of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenText {
    Static(&'static str),
    Owned(String),
    Deferred(Placeholder),
}

/// A unit of rendered output.
///
/// `space` requests a separating space before the next token. Expression
/// tokens always request it and also mark the renderer they end as an
/// expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: TokenText,
    space: bool,
    expression: bool,
}

impl Token {
    /// A plain token with no trailing space, e.g. `(`.
    #[must_use]
    pub const fn plain(text: &'static str) -> Self {
        Self {
            text: TokenText::Static(text),
            space: false,
            expression: false,
        }
    }

    /// A plain token followed by a space, e.g. `)`.
    #[must_use]
    pub const fn spaced(text: &'static str) -> Self {
        Self {
            text: TokenText::Static(text),
            space: true,
            expression: false,
        }
    }

    /// A static expression token, e.g. `order by`.
    #[must_use]
    pub const fn keyword(text: &'static str) -> Self {
        Self {
            text: TokenText::Static(text),
            space: true,
            expression: true,
        }
    }

    /// A plain token with owned text, e.g. a function name with its `(`.
    #[must_use]
    pub fn owned(text: impl Into<String>) -> Self {
        Self {
            text: TokenText::Owned(text.into()),
            space: false,
            expression: false,
        }
    }

    /// An expression token with owned text.
    #[must_use]
    pub fn expression(text: impl Into<String>) -> Self {
        Self {
            text: TokenText::Owned(text.into()),
            space: true,
            expression: true,
        }
    }

    /// An expression token whose text is filled in later.
    #[must_use]
    pub const fn deferred(placeholder: Placeholder) -> Self {
        Self {
            text: TokenText::Deferred(placeholder),
            space: true,
            expression: true,
        }
    }

    /// Returns the token text; an unresolved placeholder yields `""`.
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.text {
            TokenText::Static(text) => text,
            TokenText::Owned(text) => text,
            TokenText::Deferred(placeholder) => placeholder.get().unwrap_or(""),
        }
    }

    /// Returns true if a space should follow this token.
    #[must_use]
    pub const fn space(&self) -> bool {
        self.space
    }

    /// Returns true if this is an expression token.
    #[must_use]
    pub const fn is_expression(&self) -> bool {
        self.expression
    }

    /// Returns false if this token carries an unresolved placeholder.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        match &self.text {
            TokenText::Deferred(placeholder) => placeholder.is_resolved(),
            TokenText::Static(_) | TokenText::Owned(_) => true,
        }
    }
}

pub const TOKEN_COMMA: Token = Token::plain(", ");
pub const TOKEN_OPEN_PAREN: Token = Token::plain("(");
pub const TOKEN_CLOSE_PAREN: Token = Token::spaced(")");
pub const TOKEN_ORDER_BY: Token = Token::keyword("order by");
pub const TOKEN_COUNT_FUNC: Token = Token::plain("count(");
pub const TOKEN_LOWER_FUNC: Token = Token::plain("lower(");
pub const TOKEN_SELECT: Token = Token::keyword("select");
pub const TOKEN_AS: Token = Token::keyword("AS");
pub const TOKEN_DOUBLE_UNDERSCORE: Token = Token::keyword("__");
pub const TOKEN_ASC: Token = Token::keyword("asc");
pub const TOKEN_DESC: Token = Token::keyword("desc");
pub const TOKEN_NULLS_FIRST: Token = Token::keyword("nulls first");
pub const TOKEN_NULLS_LAST: Token = Token::keyword("nulls last");
pub const TOKEN_STAR: Token = Token::keyword("*");
