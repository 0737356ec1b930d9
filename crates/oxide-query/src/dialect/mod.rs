//! Query dialect support.
//!
//! JPQL, EQL and HQL share one grammar; the extensions each language accepts
//! on top of JPQL, and how each one names the primary alias, are described
//! by the [`Dialect`] trait.

mod eql;
mod hql;
mod jpql;

pub use eql::EqlDialect;
pub use hql::HqlDialect;
pub use jpql::JpqlDialect;

use serde::{Deserialize, Serialize};

/// Identifies a query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Jakarta Persistence Query Language.
    Jpql,
    /// EclipseLink Query Language.
    Eql,
    /// Hibernate Query Language.
    Hql,
    /// Database specific SQL.
    Native,
}

impl DialectKind {
    /// Returns the name of the query language.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jpql => "JPQL",
            Self::Eql => "EQL",
            Self::Hql => "HQL",
            Self::Native => "SQL",
        }
    }
}

impl std::fmt::Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for dialect-specific behavior of the JPQL family.
pub trait Dialect: std::fmt::Debug + Send + Sync {
    /// Returns the language this dialect parses.
    fn kind(&self) -> DialectKind;

    /// Returns the name of the dialect.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns whether `UNION`, `INTERSECT` and `EXCEPT` are accepted.
    fn supports_set_operations(&self) -> bool {
        false
    }

    /// Returns whether a query may start with `FROM` and omit or trail its
    /// `SELECT` clause.
    fn supports_from_first(&self) -> bool {
        false
    }

    /// Returns whether `SELECT` may appear without a `FROM` clause.
    fn supports_select_without_from(&self) -> bool {
        false
    }

    /// Returns whether `LIMIT`, `OFFSET` and `FETCH` clauses are accepted.
    fn supports_limit_offset(&self) -> bool {
        false
    }

    /// Returns whether join conditions may be introduced with `WITH`.
    fn supports_join_with(&self) -> bool {
        false
    }

    /// Returns whether sub-queries may be used as FROM roots and join targets.
    fn supports_derived_roots(&self) -> bool {
        false
    }

    /// Returns whether `INSERT` statements are accepted.
    fn supports_insert(&self) -> bool {
        false
    }

    /// Returns whether a root without an alias contributes its entity name as
    /// the primary alias.
    fn infers_entity_alias(&self) -> bool {
        true
    }

    /// Returns whether a count query over an unaliased root introduces a
    /// synthetic alias to count by.
    fn synthesizes_count_alias(&self) -> bool {
        false
    }
}
