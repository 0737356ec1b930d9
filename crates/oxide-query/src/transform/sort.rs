//! ORDER BY injection.

use super::qualify::{qualify, AliasRegistry};
use super::writer::{QueryWriter, Transform};
use crate::ast::Statement;
use crate::dialect::Dialect;
use crate::error::{QueryError, Result};
use crate::parser::Parser;
use crate::render::{
    concat, Placeholder, Renderer, RendererBuilder, Token, TOKEN_ASC, TOKEN_CLOSE_PAREN,
    TOKEN_COMMA, TOKEN_DESC, TOKEN_LOWER_FUNC, TOKEN_NULLS_FIRST, TOKEN_NULLS_LAST,
    TOKEN_ORDER_BY,
};
use crate::sort::{NullHandling, Order, Sort};

/// A sort argument whose reference is decided after the walk.
#[derive(Debug)]
struct PendingOrder<'s> {
    placeholder: Placeholder,
    order: &'s Order,
}

/// Appends a [`Sort`] to the root ORDER BY of a query.
///
/// Sort properties are emitted as placeholders and qualified once the whole
/// statement has been walked, so that aliases declared anywhere in the root
/// query are known. Every qualified reference must parse as a single
/// expression of the dialect.
#[derive(Debug)]
pub struct SortTransformer<'s> {
    dialect: &'s dyn Dialect,
    sort: &'s Sort,
    primary_alias: Option<&'s str>,
    aliases: AliasRegistry,
    pending: Vec<PendingOrder<'s>>,
    set_operation: bool,
}

impl<'s> SortTransformer<'s> {
    #[must_use]
    pub fn new(dialect: &'s dyn Dialect, sort: &'s Sort, primary_alias: Option<&'s str>) -> Self {
        Self {
            dialect,
            sort,
            primary_alias,
            aliases: AliasRegistry::new(),
            pending: Vec::new(),
            set_operation: false,
        }
    }

    /// Renders `statement` with the sort applied.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidSortExpression`] if a sort property is
    /// not a single expression, or [`QueryError::UnresolvedPlaceholder`] if a
    /// sort argument was left unresolved.
    pub fn transform(mut self, statement: &Statement) -> Result<Renderer> {
        let renderer = QueryWriter::new(Transform::Sort(&mut self)).write_statement(statement);
        self.finish()?;
        renderer.ensure_resolved()?;
        Ok(renderer)
    }

    /// Returns the aliases registered during the walk.
    #[must_use]
    pub const fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    pub(crate) fn register_join_alias(&mut self, alias: &str) {
        self.aliases.register_join(alias);
    }

    pub(crate) fn register_selection_alias(&mut self, alias: &str) {
        self.aliases.register_selection(alias);
    }

    /// Builds the root ORDER BY clause: the existing one extended with the
    /// sort, or a new one.
    pub(crate) fn order_by_clause(
        &mut self,
        existing: Option<Renderer>,
        set_operation: bool,
    ) -> Renderer {
        self.set_operation = set_operation;

        let mut builder = RendererBuilder::new();
        match existing {
            Some(order_by) => {
                builder.append_inline(order_by).append(TOKEN_COMMA);
            }
            None => {
                builder.append(TOKEN_ORDER_BY);
            }
        }

        let sort = self.sort;
        builder.append(concat(sort, |order| self.sort_argument(order), &TOKEN_COMMA));
        builder.into_renderer()
    }

    fn sort_argument(&mut self, order: &'s Order) -> Renderer {
        let placeholder = Placeholder::new();
        self.pending.push(PendingOrder {
            placeholder: placeholder.clone(),
            order,
        });

        let mut builder = RendererBuilder::new();
        if order.ignore_case {
            builder
                .append(TOKEN_LOWER_FUNC)
                .append_inline(Token::deferred(placeholder))
                .append(TOKEN_CLOSE_PAREN);
        } else {
            builder.append(Token::deferred(placeholder));
        }

        builder.append(if order.direction.is_ascending() {
            TOKEN_ASC
        } else {
            TOKEN_DESC
        });
        match order.null_handling {
            NullHandling::Native => {}
            NullHandling::NullsFirst => {
                builder.append(TOKEN_NULLS_FIRST);
            }
            NullHandling::NullsLast => {
                builder.append(TOKEN_NULLS_LAST);
            }
        }
        builder.into_renderer()
    }

    /// Resolves the pending sort arguments.
    fn finish(&self) -> Result<()> {
        for pending in &self.pending {
            let property = pending.order.property.as_str();
            let reference = if self.set_operation {
                property.to_string()
            } else {
                qualify(
                    property,
                    self.aliases.join_aliases(),
                    self.aliases.selection_aliases(),
                    self.primary_alias,
                )
                .to_string()
            };
            Parser::new(&reference, self.dialect)
                .parse_sort_expression()
                .map_err(|err| QueryError::InvalidSortExpression {
                    property: property.to_string(),
                    message: err.to_string(),
                })?;
            pending.placeholder.resolve(reference);
        }
        Ok(())
    }
}
