//! Tagged token streams.

use super::builder::RendererBuilder;
use super::token::Token;
use crate::error::{QueryError, Result};

/// A tree of tokens that renders to query text.
///
/// Spacing is decided at the seams: inside a token list a space follows every
/// token whose `space` flag is set, and between two children of a composite a
/// space is inserted when either side is an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Renderer {
    #[default]
    Empty,
    Tokens(Vec<Token>),
    Composite(Vec<Renderer>),
    /// Never counts as an expression, e.g. a function argument.
    Inline(Box<Renderer>),
    /// Always counts as an expression, e.g. a clause.
    Expression(Box<Renderer>),
}

impl Renderer {
    /// Wraps `renderer` so that it does not count as an expression.
    #[must_use]
    pub fn inline(renderer: impl Into<Self>) -> Self {
        match renderer.into() {
            Self::Empty => Self::Empty,
            renderer => Self::Inline(Box::new(renderer)),
        }
    }

    /// Wraps `renderer` so that it counts as an expression.
    #[must_use]
    pub fn expression(renderer: impl Into<Self>) -> Self {
        match renderer.into() {
            Self::Empty => Self::Empty,
            renderer => Self::Expression(Box::new(renderer)),
        }
    }

    /// Appends `other`. `Empty` is the identity, token lists merge, anything
    /// else is collected into a composite.
    #[must_use]
    pub fn append(self, other: impl Into<Self>) -> Self {
        match (self, other.into()) {
            (renderer, Self::Empty) | (Self::Empty, renderer) => renderer,
            (Self::Tokens(mut tokens), Self::Tokens(more)) => {
                tokens.extend(more);
                Self::Tokens(tokens)
            }
            (Self::Composite(mut children), renderer) => {
                children.push(renderer);
                Self::Composite(children)
            }
            (left, right) => Self::Composite(vec![left, right]),
        }
    }

    /// Returns true if the renderer ends with an expression.
    #[must_use]
    pub fn is_expression(&self) -> bool {
        match self {
            Self::Empty | Self::Inline(_) => false,
            Self::Expression(_) => true,
            Self::Tokens(tokens) => tokens.last().is_some_and(Token::is_expression),
            Self::Composite(children) => children.last().is_some_and(Self::is_expression),
        }
    }

    /// Returns true if the renderer holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Tokens(tokens) => tokens.is_empty(),
            Self::Composite(children) => children.iter().all(Self::is_empty),
            Self::Inline(inner) | Self::Expression(inner) => inner.is_empty(),
        }
    }

    /// Checks that every deferred token has been resolved.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnresolvedPlaceholder`] if a placeholder is
    /// still empty.
    pub fn ensure_resolved(&self) -> Result<()> {
        if self.all_resolved() {
            Ok(())
        } else {
            Err(QueryError::UnresolvedPlaceholder)
        }
    }

    fn all_resolved(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Tokens(tokens) => tokens.iter().all(Token::is_resolved),
            Self::Composite(children) => children.iter().all(Self::all_resolved),
            Self::Inline(inner) | Self::Expression(inner) => inner.all_resolved(),
        }
    }

    /// Renders the query text.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Tokens(tokens) => render_tokens(tokens),
            Self::Composite(children) => render_children(children),
            Self::Inline(inner) | Self::Expression(inner) => inner.render(),
        }
    }
}

fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens {
        if previous.is_some_and(Token::space) && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        out.push_str(token.text());
        previous = Some(token);
    }
    out
}

fn render_children(children: &[Renderer]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Renderer> = None;
    for child in children {
        let text = child.render();
        if text.is_empty() {
            continue;
        }
        let separate = previous.is_some_and(|p| p.is_expression() || child.is_expression());
        if separate && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        out.push_str(&text);
        previous = Some(child);
    }
    out
}

impl From<Token> for Renderer {
    fn from(token: Token) -> Self {
        Self::Tokens(vec![token])
    }
}

impl From<Vec<Token>> for Renderer {
    fn from(tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            Self::Empty
        } else {
            Self::Tokens(tokens)
        }
    }
}

impl From<RendererBuilder> for Renderer {
    fn from(builder: RendererBuilder) -> Self {
        builder.into_renderer()
    }
}

impl std::fmt::Display for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::token::{
        Placeholder, TOKEN_CLOSE_PAREN, TOKEN_COUNT_FUNC, TOKEN_ORDER_BY, TOKEN_SELECT,
    };

    #[test]
    fn test_empty_is_identity() {
        let tokens = Renderer::from(Token::expression("p"));
        assert_eq!(Renderer::Empty.append(tokens.clone()), tokens);
        assert_eq!(tokens.clone().append(Renderer::Empty), tokens);
    }

    #[test]
    fn test_token_lists_merge() {
        let merged = Renderer::from(TOKEN_SELECT).append(Token::expression("p"));
        assert!(matches!(&merged, Renderer::Tokens(tokens) if tokens.len() == 2));
        assert_eq!(merged.render(), "select p");
    }

    #[test]
    fn test_space_follows_spaced_tokens_only() {
        let renderer = Renderer::from(vec![
            TOKEN_COUNT_FUNC,
            Token::expression("p"),
            TOKEN_CLOSE_PAREN,
            Token::expression("from"),
        ]);
        assert_eq!(renderer.render(), "count(p) from");
    }

    #[test]
    fn test_composite_spacing() {
        let inline = Renderer::from(Token::owned("count("))
            .append(Renderer::inline(Token::expression("p")))
            .append(TOKEN_CLOSE_PAREN);
        assert_eq!(inline.render(), "count(p)");
        assert!(!inline.is_expression());

        let clauses = Renderer::expression(inline).append(Renderer::from(vec![
            Token::expression("from"),
            Token::expression("Person"),
        ]));
        assert_eq!(clauses.render(), "count(p) from Person");
        assert!(clauses.is_expression());
    }

    #[test]
    fn test_is_expression_by_tag() {
        assert!(!Renderer::Empty.is_expression());
        assert!(Renderer::from(TOKEN_ORDER_BY).is_expression());
        assert!(!Renderer::inline(TOKEN_ORDER_BY).is_expression());
        assert!(Renderer::expression(TOKEN_CLOSE_PAREN).is_expression());
    }

    #[test]
    fn test_unresolved_placeholder_is_reported() {
        let placeholder = Placeholder::new();
        let renderer = Renderer::from(TOKEN_ORDER_BY).append(Token::deferred(placeholder.clone()));
        assert!(matches!(
            renderer.ensure_resolved(),
            Err(QueryError::UnresolvedPlaceholder)
        ));
        placeholder.resolve("p.name");
        assert!(renderer.ensure_resolved().is_ok());
        assert_eq!(renderer.to_string(), "order by p.name");
    }
}
