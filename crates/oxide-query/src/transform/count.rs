//! Count query derivation.

use super::writer::{QueryWriter, Transform};
use crate::ast::{Expr, RootSource, SelectClause, SelectQuery, Statement};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::render::{
    concat, Renderer, RendererBuilder, Token, TOKEN_CLOSE_PAREN, TOKEN_COMMA, TOKEN_COUNT_FUNC,
    TOKEN_DOUBLE_UNDERSCORE, TOKEN_SELECT, TOKEN_STAR,
};

/// Replaces the projection of a SELECT with a row count.
///
/// ORDER BY, row limits and `fetch` on joins are dropped; every other clause
/// of the root query is kept as written.
#[derive(Debug)]
pub struct CountTransformer<'s> {
    projection: Option<&'s str>,
    primary_alias: Option<&'s str>,
    synthetic_alias: bool,
}

impl<'s> CountTransformer<'s> {
    /// Creates a count transformer for `statement`.
    ///
    /// `projection` overrides the count argument.
    #[must_use]
    pub fn new(
        dialect: &dyn Dialect,
        statement: &Statement,
        projection: Option<&'s str>,
        primary_alias: Option<&'s str>,
    ) -> Self {
        let synthetic_alias = dialect.synthesizes_count_alias()
            && projection.is_none()
            && primary_alias.is_none()
            && statement
                .as_query()
                .map(|query| query.body.first_select())
                .is_some_and(needs_synthetic_alias);
        Self {
            projection,
            primary_alias,
            synthetic_alias,
        }
    }

    /// Returns true if the root entity is counted through the `__` alias.
    #[must_use]
    pub const fn uses_synthetic_alias(&self) -> bool {
        self.synthetic_alias
    }

    /// Renders the count query for `statement`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnresolvedPlaceholder`](crate::QueryError) if the
    /// rendered query contains unresolved text.
    pub fn transform(&self, statement: &Statement) -> Result<Renderer> {
        let renderer = QueryWriter::new(Transform::Count(self)).write_statement(statement);
        renderer.ensure_resolved()?;
        Ok(renderer)
    }

    /// Writes `select count(…)` in place of `clause`.
    pub(crate) fn select_clause(
        &self,
        writer: &mut QueryWriter<'_, '_>,
        clause: Option<&SelectClause>,
    ) -> Renderer {
        let mut builder = RendererBuilder::new();
        match clause {
            Some(clause) => builder.append(Token::expression(clause.keyword.as_str())),
            None => builder.append(TOKEN_SELECT),
        };
        builder
            .append(TOKEN_COUNT_FUNC)
            .append_inline(self.count_argument(writer, clause))
            .append(TOKEN_CLOSE_PAREN);
        builder.into_renderer()
    }

    fn count_argument(
        &self,
        writer: &mut QueryWriter<'_, '_>,
        clause: Option<&SelectClause>,
    ) -> Renderer {
        if let Some(projection) = self.projection {
            return Token::expression(projection).into();
        }

        if let Some(clause) = clause {
            match (&clause.distinct, clause.items.as_slice()) {
                (None, [item]) if matches!(item.expr, Expr::Path(_)) => {
                    return writer.write_expr(&item.expr);
                }
                (Some(distinct), items) => {
                    let mut builder = RendererBuilder::new();
                    builder.append(Token::expression(distinct.as_str()));
                    if items.iter().any(|item| item.expr.is_constructor()) {
                        builder.append(self.fallback_argument());
                    } else {
                        // Result aliases are not valid inside count()
                        builder.append(concat(
                            items,
                            |item| writer.write_expr(&item.expr),
                            &TOKEN_COMMA,
                        ));
                    }
                    return builder.into_renderer();
                }
                _ => {}
            }
        }

        self.fallback_argument()
    }

    fn fallback_argument(&self) -> Renderer {
        if self.synthetic_alias {
            return TOKEN_DOUBLE_UNDERSCORE.into();
        }
        match self.primary_alias {
            Some(alias) => Token::expression(alias).into(),
            None => TOKEN_STAR.into(),
        }
    }
}

/// Returns true for a query without SELECT clause whose first root is an
/// entity without variable, as in `from Person`.
fn needs_synthetic_alias(select: &SelectQuery) -> bool {
    select.select.is_none()
        && select
            .from
            .as_ref()
            .and_then(|from| from.roots.first())
            .is_some_and(|root| {
                root.alias.is_none() && matches!(root.source, RootSource::Entity(_))
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{EqlDialect, HqlDialect, JpqlDialect};
    use crate::parser::Parser;
    use crate::transform::introspect::introspect;

    fn count_with(dialect: &dyn Dialect, query: &str, projection: Option<&str>) -> String {
        let statement = Parser::new(query, dialect).parse_statement().unwrap();
        let introspection = introspect(&statement, dialect);
        CountTransformer::new(
            dialect,
            &statement,
            projection,
            introspection.alias.as_deref(),
        )
        .transform(&statement)
        .unwrap()
        .render()
    }

    fn count(query: &str) -> String {
        count_with(&JpqlDialect, query, None)
    }

    #[test]
    fn test_counts_primary_alias() {
        assert_eq!(
            count("select p from Person p"),
            "select count(p) from Person p"
        );
        assert_eq!(
            count("SELECT p FROM Person p WHERE p.age > 18"),
            "SELECT count(p) FROM Person p WHERE p.age > 18"
        );
    }

    #[test]
    fn test_counts_distinct_projection() {
        assert_eq!(
            count("select distinct p.name from Person p"),
            "select count(distinct p.name) from Person p"
        );
        assert_eq!(
            count("select distinct p.name as n, p.age from Person p"),
            "select count(distinct p.name, p.age) from Person p"
        );
    }

    #[test]
    fn test_distinct_constructor_counts_primary_alias() {
        assert_eq!(
            count("select distinct new com.x.Dto(p.name) from Person p"),
            "select count(distinct p) from Person p"
        );
        assert_eq!(
            count("select new com.x.Dto(p.name) from Person p"),
            "select count(p) from Person p"
        );
    }

    #[test]
    fn test_single_path_is_counted() {
        assert_eq!(
            count("select p.address from Person p join p.address a"),
            "select count(p.address) from Person p join p.address a"
        );
    }

    #[test]
    fn test_multiple_items_count_primary_alias() {
        assert_eq!(
            count("select p.name, p.age from Person p group by p.name, p.age"),
            "select count(p) from Person p group by p.name, p.age"
        );
    }

    #[test]
    fn test_drops_order_by_and_fetch() {
        let counted = count("select p from Person p left join fetch p.roles r order by p.name");
        assert_eq!(counted, "select count(p) from Person p left join p.roles r");
        assert!(!counted.contains("order by"));
    }

    #[test]
    fn test_override_projection() {
        assert_eq!(
            count_with(&JpqlDialect, "select p from Person p", Some("distinct p.id")),
            "select count(distinct p.id) from Person p"
        );
    }

    #[test]
    fn test_subqueries_are_kept() {
        assert_eq!(
            count(
                "select p from Person p where p.id in \
                 (select max(a.id) from Address a order by a.id)"
            ),
            "select count(p) from Person p where p.id in \
             (select max(a.id) from Address a order by a.id)"
        );
    }

    #[test]
    fn test_entity_name_without_alias() {
        assert_eq!(
            count_with(&EqlDialect, "select Person from Person", None),
            "select count(Person) from Person"
        );
    }

    #[test]
    fn test_from_only_queries() {
        assert_eq!(
            count_with(&HqlDialect, "from Person p", None),
            "select count(p) from Person p"
        );
        assert_eq!(
            count_with(&HqlDialect, "from Person", None),
            "select count(__) from Person AS __"
        );
        assert_eq!(
            count_with(&HqlDialect, "from Person where name = 'x'", None),
            "select count(__) from Person AS __ where name = 'x'"
        );
    }

    #[test]
    fn test_trailing_select_keeps_position() {
        assert_eq!(
            count_with(&HqlDialect, "from Person p select p.name", None),
            "from Person p select count(p.name)"
        );
    }

    #[test]
    fn test_drops_row_limits() {
        assert_eq!(
            count_with(
                &HqlDialect,
                "select p from Person p order by p.id limit 10 offset 20",
                None
            ),
            "select count(p) from Person p"
        );
    }

    #[test]
    fn test_unaliased_projection_counts_star() {
        assert_eq!(
            count_with(&HqlDialect, "select name, age from Person", None),
            "select count(*) from Person"
        );
    }
}
