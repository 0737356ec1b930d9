//! Hibernate Query Language.

use super::{Dialect, DialectKind};

/// The HQL dialect.
///
/// HQL accepts queries starting with `FROM`, row limiting clauses, derived
/// roots, `WITH` join conditions, set operations and `INSERT`. A root without
/// an explicit alias does not provide a primary alias; count queries over
/// such roots alias them as `__` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct HqlDialect;

impl HqlDialect {
    /// Creates a new HQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for HqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Hql
    }

    fn supports_set_operations(&self) -> bool {
        true
    }

    fn supports_from_first(&self) -> bool {
        true
    }

    fn supports_select_without_from(&self) -> bool {
        true
    }

    fn supports_limit_offset(&self) -> bool {
        true
    }

    fn supports_join_with(&self) -> bool {
        true
    }

    fn supports_derived_roots(&self) -> bool {
        true
    }

    fn supports_insert(&self) -> bool {
        true
    }

    fn infers_entity_alias(&self) -> bool {
        false
    }

    fn synthesizes_count_alias(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hql_dialect() {
        let dialect = HqlDialect::new();
        assert_eq!(dialect.kind(), DialectKind::Hql);
        assert!(dialect.supports_from_first());
        assert!(dialect.supports_limit_offset());
        assert!(dialect.supports_insert());
        assert!(!dialect.infers_entity_alias());
        assert!(dialect.synthesizes_count_alias());
    }
}
