//! Rendering of rewritten queries.
//!
//! Transformers emit [`Token`]s into a [`Renderer`] tree through a
//! [`RendererBuilder`]; the tree decides where spaces go when it is rendered.

mod builder;
mod renderer;
mod token;

pub use builder::{concat, concat_expressions, RendererBuilder};
pub use renderer::Renderer;
pub use token::{
    Placeholder, Token, TokenText, TOKEN_AS, TOKEN_ASC, TOKEN_CLOSE_PAREN, TOKEN_COMMA,
    TOKEN_COUNT_FUNC, TOKEN_DESC, TOKEN_DOUBLE_UNDERSCORE, TOKEN_LOWER_FUNC, TOKEN_NULLS_FIRST,
    TOKEN_NULLS_LAST, TOKEN_OPEN_PAREN, TOKEN_ORDER_BY, TOKEN_SELECT, TOKEN_STAR,
};
