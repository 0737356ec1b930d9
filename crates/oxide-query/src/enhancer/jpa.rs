//! Enhancer for the JPQL family.

use tracing::{debug, trace};

use super::{projection_override, QueryEnhancer, QueryShape};
use crate::ast::Statement;
use crate::dialect::{Dialect, DialectKind, EqlDialect, HqlDialect, JpqlDialect};
use crate::error::{QueryError, Result};
use crate::parser::Parser;
use crate::sort::Sort;
use crate::transform::{
    introspect, write_verbatim, CountTransformer, Introspection, SortTransformer,
};

/// Enhancer for JPQL queries.
pub type JpqlQueryEnhancer = JpaQueryEnhancer<JpqlDialect>;

/// Enhancer for EclipseLink queries.
pub type EqlQueryEnhancer = JpaQueryEnhancer<EqlDialect>;

/// Enhancer for Hibernate queries.
pub type HqlQueryEnhancer = JpaQueryEnhancer<HqlDialect>;

/// A JPQL, EQL or HQL query parsed once and introspected at construction.
#[derive(Debug)]
pub struct JpaQueryEnhancer<D: Dialect> {
    query: String,
    dialect: D,
    statement: Statement,
    introspection: Introspection,
}

impl<D: Dialect + Default> JpaQueryEnhancer<D> {
    /// Parses `query` with the default instance of the dialect.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::BadGrammar`] if the query does not parse.
    pub fn parse(query: impl Into<String>) -> Result<Self> {
        Self::with_dialect(query, D::default())
    }
}

impl<D: Dialect> JpaQueryEnhancer<D> {
    /// Parses `query` with `dialect`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::BadGrammar`] if the query does not parse.
    pub fn with_dialect(query: impl Into<String>, dialect: D) -> Result<Self> {
        let query = query.into();
        let statement = Parser::new(&query, &dialect)
            .parse_statement()
            .map_err(|err| QueryError::bad_grammar(dialect.kind(), &query, err))?;
        let introspection = introspect(&statement, &dialect);

        debug!(
            dialect = %dialect.kind(),
            shape = ?statement.shape(),
            alias = ?introspection.alias,
            "Parsed query"
        );

        Ok(Self {
            query,
            dialect,
            statement,
            introspection,
        })
    }

    /// Returns the parsed statement.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }
}

impl<D: Dialect> QueryEnhancer for JpaQueryEnhancer<D> {
    fn query(&self) -> &str {
        &self.query
    }

    fn dialect(&self) -> DialectKind {
        self.dialect.kind()
    }

    fn shape(&self) -> QueryShape {
        self.statement.shape()
    }

    fn alias(&self) -> Option<&str> {
        self.introspection.alias.as_deref()
    }

    fn projection(&self) -> &str {
        &self.introspection.projection
    }

    fn has_constructor_expression(&self) -> bool {
        self.introspection.constructor
    }

    fn render(&self) -> Result<String> {
        let renderer = write_verbatim(&self.statement);
        renderer.ensure_resolved()?;
        Ok(renderer.render())
    }

    fn render_sorted_with_alias(&self, sort: &Sort, alias: Option<&str>) -> Result<String> {
        if sort.is_unsorted() {
            return Ok(self.query.clone());
        }
        let shape = self.shape();
        if !shape.accepts_sort() {
            debug!(?shape, "Query cannot be sorted, keeping it as is");
            return Ok(self.query.clone());
        }

        let sorted = SortTransformer::new(&self.dialect, sort, alias)
            .transform(&self.statement)?
            .render();
        trace!(query = %sorted, "Rendered sorted query");
        Ok(sorted)
    }

    fn render_count(&self, projection: Option<&str>) -> Result<String> {
        let shape = self.shape();
        if !shape.accepts_count() {
            debug!(?shape, "Query cannot be counted, keeping it as is");
            return Ok(self.query.clone());
        }

        let counter = CountTransformer::new(
            &self.dialect,
            &self.statement,
            projection_override(projection),
            self.alias(),
        );
        let counted = counter.transform(&self.statement)?.render();
        trace!(query = %counted, "Rendered count query");
        Ok(counted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Order;

    #[test]
    fn test_parse_and_introspect() {
        let enhancer = JpqlQueryEnhancer::parse("select p.name from Person p").unwrap();
        assert_eq!(enhancer.dialect(), DialectKind::Jpql);
        assert_eq!(enhancer.shape(), QueryShape::Select);
        assert_eq!(enhancer.alias(), Some("p"));
        assert_eq!(enhancer.projection(), "p.name");
        assert!(!enhancer.has_constructor_expression());
    }

    #[test]
    fn test_bad_grammar() {
        let err = JpqlQueryEnhancer::parse("select from").unwrap_err();
        assert!(matches!(
            err,
            QueryError::BadGrammar {
                dialect: DialectKind::Jpql,
                ..
            }
        ));
        assert!(err.is_invalid_query());
    }

    #[test]
    fn test_unsorted_returns_query_unchanged() {
        let query = "select  p   from Person p";
        let enhancer = JpqlQueryEnhancer::parse(query).unwrap();
        assert_eq!(enhancer.render_sorted(&Sort::unsorted()).unwrap(), query);
    }

    #[test]
    fn test_dml_is_not_rewritten() {
        let query = "update Person p set p.age = 1";
        let enhancer = JpqlQueryEnhancer::parse(query).unwrap();
        assert_eq!(enhancer.shape(), QueryShape::Update);
        assert_eq!(
            enhancer.render_sorted(&Sort::by([Order::asc("name")])).unwrap(),
            query
        );
        assert_eq!(enhancer.render_count(None).unwrap(), query);
    }

    #[test]
    fn test_set_operation_is_not_counted() {
        let query = "select p from Person p union select a from Animal a";
        let enhancer = EqlQueryEnhancer::parse(query).unwrap();
        assert_eq!(enhancer.shape(), QueryShape::SetOperation);
        assert_eq!(enhancer.render_count(None).unwrap(), query);
    }

    #[test]
    fn test_explicit_alias_overrides_detected_one() {
        let enhancer = HqlQueryEnhancer::parse("from Person").unwrap();
        assert_eq!(enhancer.alias(), None);
        assert_eq!(
            enhancer
                .render_sorted_with_alias(&Sort::by([Order::asc("name")]), Some("x"))
                .unwrap(),
            "from Person order by x.name asc"
        );
    }

    #[test]
    fn test_blank_count_projection_is_ignored() {
        let enhancer = JpqlQueryEnhancer::parse("select p from Person p").unwrap();
        assert_eq!(
            enhancer.render_count(Some("  ")).unwrap(),
            "select count(p) from Person p"
        );
    }

    #[test]
    fn test_enhancer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JpqlQueryEnhancer>();
        assert_send_sync::<HqlQueryEnhancer>();
    }
}
