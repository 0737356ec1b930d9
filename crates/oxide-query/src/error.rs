//! Error types for query rewriting.

use crate::dialect::DialectKind;
use crate::parser::ParseError;

/// Errors that can occur while parsing or rewriting a query.
///
/// Queries of a shape a transformer does not handle are not errors: the
/// original text is returned instead.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The query is not valid in its dialect.
    #[error("{dialect} query '{query}' has bad grammar: {source}")]
    BadGrammar {
        /// The dialect the query was parsed with.
        dialect: DialectKind,
        /// The rejected query text.
        query: String,
        /// The grammar error.
        #[source]
        source: ParseError,
    },

    /// The native SQL parser rejected the query.
    #[error("Invalid SQL '{query}': {message}")]
    InvalidSql {
        /// The rejected query text.
        query: String,
        /// Parser message.
        message: String,
    },

    /// A sort property cannot be turned into an ORDER BY expression.
    #[error("Invalid sort expression '{property}': {message}")]
    InvalidSortExpression {
        /// The sort property.
        property: String,
        /// Parser message.
        message: String,
    },

    /// A deferred token was never resolved.
    #[error("Rendered query contains an unresolved placeholder")]
    UnresolvedPlaceholder,

    /// The configured native SQL dialect is not known.
    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    /// The configured persistence provider is not known.
    #[error("Unknown persistence provider: {0}")]
    UnknownProvider(String),
}

impl QueryError {
    /// Creates a grammar error for `query`.
    #[must_use]
    pub fn bad_grammar(dialect: DialectKind, query: &str, source: ParseError) -> Self {
        Self::BadGrammar {
            dialect,
            query: query.to_string(),
            source,
        }
    }

    /// Returns true if the error is caused by the query text rather than by
    /// the library or its configuration.
    #[must_use]
    pub const fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            Self::BadGrammar { .. } | Self::InvalidSql { .. } | Self::InvalidSortExpression { .. }
        )
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
