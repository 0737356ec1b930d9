//! Jakarta Persistence Query Language.

use super::{Dialect, DialectKind};

/// The JPQL dialect: the common grammar without vendor extensions.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpqlDialect;

impl JpqlDialect {
    /// Creates a new JPQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for JpqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Jpql
    }
}
