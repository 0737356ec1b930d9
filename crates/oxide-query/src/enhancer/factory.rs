//! Enhancer selection.

use tracing::debug;

use super::{EqlQueryEnhancer, HqlQueryEnhancer, JpqlQueryEnhancer, QueryEnhancer};
use crate::config::EnhancerConfig;
use crate::dialect::DialectKind;
use crate::error::Result;
use crate::native::{NativeQueryEnhancer, GENERIC_DIALECT};

/// A query as declared on a repository method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredQuery {
    /// The query text.
    pub text: String,
    /// True for SQL passed to the database as is.
    pub native: bool,
}

impl DeclaredQuery {
    /// Declares a query in the provider's query language.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            native: false,
        }
    }

    /// Declares a native SQL query.
    #[must_use]
    pub fn native(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            native: true,
        }
    }
}

/// Creates enhancers according to an [`EnhancerConfig`].
#[derive(Debug, Clone, Default)]
pub struct QueryEnhancerFactory {
    config: EnhancerConfig,
}

impl QueryEnhancerFactory {
    #[must_use]
    pub const fn new(config: EnhancerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    /// Returns the language `query` is parsed with.
    #[must_use]
    pub const fn dialect_for(&self, query: &DeclaredQuery) -> DialectKind {
        if query.native {
            DialectKind::Native
        } else {
            self.config.provider.dialect()
        }
    }

    /// Parses `query` with the enhancer matching the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not parse or the native dialect is
    /// unknown.
    pub fn create(&self, query: &DeclaredQuery) -> Result<Box<dyn QueryEnhancer>> {
        let dialect = self.dialect_for(query);
        debug!(%dialect, provider = %self.config.provider, "Creating query enhancer");
        match dialect {
            DialectKind::Native => Ok(Box::new(NativeQueryEnhancer::parse(
                query.text.as_str(),
                &self.config.native_dialect,
            )?)),
            dialect => parse(dialect, query.text.as_str()),
        }
    }
}

/// Parses `query` with the enhancer for `dialect`. Native queries use the
/// generic SQL dialect.
///
/// # Errors
///
/// Returns an error if the query does not parse.
pub fn parse(dialect: DialectKind, query: impl Into<String>) -> Result<Box<dyn QueryEnhancer>> {
    let enhancer: Box<dyn QueryEnhancer> = match dialect {
        DialectKind::Jpql => Box::new(JpqlQueryEnhancer::parse(query)?),
        DialectKind::Eql => Box::new(EqlQueryEnhancer::parse(query)?),
        DialectKind::Hql => Box::new(HqlQueryEnhancer::parse(query)?),
        DialectKind::Native => Box::new(NativeQueryEnhancer::parse(query, GENERIC_DIALECT)?),
    };
    Ok(enhancer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PersistenceProvider;
    use crate::error::QueryError;

    #[test]
    fn test_provider_selects_dialect() {
        let hibernate = QueryEnhancerFactory::new(
            EnhancerConfig::default().with_provider(PersistenceProvider::Hibernate),
        );
        let enhancer = hibernate
            .create(&DeclaredQuery::new("from Person p"))
            .unwrap();
        assert_eq!(enhancer.dialect(), DialectKind::Hql);

        let generic = QueryEnhancerFactory::default();
        assert_eq!(
            generic
                .create(&DeclaredQuery::new("select p from Person p"))
                .unwrap()
                .dialect(),
            DialectKind::Jpql
        );
        assert!(generic.create(&DeclaredQuery::new("from Person p")).is_err());
    }

    #[test]
    fn test_native_queries_use_sql() {
        let factory = QueryEnhancerFactory::new(
            EnhancerConfig::default()
                .with_provider(PersistenceProvider::EclipseLink)
                .with_native_dialect("postgresql"),
        );
        let enhancer = factory
            .create(&DeclaredQuery::native("select * from users u"))
            .unwrap();
        assert_eq!(enhancer.dialect(), DialectKind::Native);
        assert_eq!(enhancer.alias(), Some("u"));
    }

    #[test]
    fn test_unknown_native_dialect() {
        let factory = QueryEnhancerFactory::new(
            EnhancerConfig::default().with_native_dialect("cobol"),
        );
        let err = factory
            .create(&DeclaredQuery::native("select 1"))
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownDialect(name) if name == "cobol"));
    }

    #[test]
    fn test_parse_by_dialect() {
        for dialect in [DialectKind::Jpql, DialectKind::Eql, DialectKind::Hql] {
            let enhancer = parse(dialect, "select p from Person p").unwrap();
            assert_eq!(enhancer.dialect(), dialect);
            assert_eq!(enhancer.alias(), Some("p"));
        }
        let native = parse(DialectKind::Native, "select p.* from person p").unwrap();
        assert_eq!(native.dialect(), DialectKind::Native);
    }
}
