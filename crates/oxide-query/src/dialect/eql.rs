//! EclipseLink Query Language.

use super::{Dialect, DialectKind};

/// The EQL dialect: JPQL plus set operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqlDialect;

impl EqlDialect {
    /// Creates a new EQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for EqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Eql
    }

    fn supports_set_operations(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eql_dialect() {
        let dialect = EqlDialect::new();
        assert_eq!(dialect.kind(), DialectKind::Eql);
        assert!(dialect.supports_set_operations());
        assert!(!dialect.supports_limit_offset());
        assert!(dialect.infers_entity_alias());
    }
}
