//! Incremental construction of renderers.

use super::renderer::Renderer;
use super::token::Token;

/// Append-only builder of a [`Renderer`].
#[derive(Debug, Clone, Default)]
pub struct RendererBuilder {
    current: Renderer,
}

impl RendererBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token, token list, renderer or builder.
    pub fn append(&mut self, part: impl Into<Renderer>) -> &mut Self {
        let current = std::mem::take(&mut self.current);
        self.current = current.append(part);
        self
    }

    /// Appends `part` so that it does not count as an expression.
    pub fn append_inline(&mut self, part: impl Into<Renderer>) -> &mut Self {
        let part = part.into();
        if part.is_expression() {
            self.append(Renderer::inline(part))
        } else {
            self.append(part)
        }
    }

    /// Appends `part` so that it counts as an expression.
    pub fn append_expression(&mut self, part: impl Into<Renderer>) -> &mut Self {
        let part = part.into();
        if part.is_expression() {
            self.append(part)
        } else {
            self.append(Renderer::expression(part))
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    #[must_use]
    pub fn is_expression(&self) -> bool {
        self.current.is_expression()
    }

    /// Returns the renderer built so far. The builder stays usable.
    #[must_use]
    pub fn build(&self) -> Renderer {
        self.current.clone()
    }

    /// Consumes the builder.
    #[must_use]
    pub fn into_renderer(self) -> Renderer {
        self.current
    }
}

/// Renders `elements` with `visit`, inline, separated by `separator`.
/// Elements that render to nothing are skipped.
pub fn concat<T>(
    elements: impl IntoIterator<Item = T>,
    mut visit: impl FnMut(T) -> Renderer,
    separator: &Token,
) -> Renderer {
    let mut builder = RendererBuilder::new();
    for element in elements {
        let rendered = visit(element);
        if rendered.is_empty() {
            continue;
        }
        if !builder.is_empty() {
            builder.append(separator.clone());
        }
        builder.append_inline(rendered);
    }
    builder.into_renderer()
}

/// Renders `elements` with `visit` as space separated expressions.
pub fn concat_expressions<T>(
    elements: impl IntoIterator<Item = T>,
    mut visit: impl FnMut(T) -> Renderer,
) -> Renderer {
    let mut builder = RendererBuilder::new();
    for element in elements {
        builder.append_expression(visit(element));
    }
    builder.into_renderer()
}
