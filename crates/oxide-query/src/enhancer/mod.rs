//! Query enhancers.
//!
//! A [`QueryEnhancer`] owns one parsed query and derives sorted and count
//! variants of it. [`JpaQueryEnhancer`] serves the JPQL family;
//! [`NativeQueryEnhancer`](crate::native::NativeQueryEnhancer) serves SQL.

mod factory;
mod jpa;

pub use factory::{parse, DeclaredQuery, QueryEnhancerFactory};
pub use jpa::{EqlQueryEnhancer, HqlQueryEnhancer, JpaQueryEnhancer, JpqlQueryEnhancer};

use crate::dialect::DialectKind;
use crate::error::Result;
use crate::sort::Sort;

/// Coarse classification of a top-level statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    /// `UNION`, `INTERSECT` or `EXCEPT` of queries.
    SetOperation,
    Other,
}

impl QueryShape {
    /// Returns true if ORDER BY can be added to the statement.
    #[must_use]
    pub const fn accepts_sort(self) -> bool {
        matches!(self, Self::Select | Self::SetOperation)
    }

    /// Returns true if a count query can be derived from the statement.
    #[must_use]
    pub const fn accepts_count(self) -> bool {
        matches!(self, Self::Select)
    }
}

/// Sort and count rewriting of a parsed query.
///
/// Statements of a shape that cannot be rewritten are returned unchanged.
pub trait QueryEnhancer: std::fmt::Debug + Send + Sync {
    /// Returns the query text as given.
    fn query(&self) -> &str;

    /// Returns the language of the query.
    fn dialect(&self) -> DialectKind;

    /// Returns the shape of the top-level statement.
    fn shape(&self) -> QueryShape;

    /// Returns the alias of the primary FROM root, if any.
    fn alias(&self) -> Option<&str>;

    /// Returns the select list of the top-level query.
    fn projection(&self) -> &str;

    /// Returns true if the query instantiates a result class with `new`.
    fn has_constructor_expression(&self) -> bool;

    /// Renders the parsed query without changes.
    ///
    /// # Errors
    ///
    /// Fails if the query cannot be rendered completely.
    fn render(&self) -> Result<String>;

    /// Renders the query ordered by `sort`, qualified with the primary alias.
    ///
    /// # Errors
    ///
    /// Fails if a sort property cannot be turned into an ORDER BY expression.
    fn render_sorted(&self, sort: &Sort) -> Result<String> {
        self.render_sorted_with_alias(sort, self.alias())
    }

    /// Renders the query ordered by `sort`, qualifying sort properties with
    /// `alias`.
    ///
    /// # Errors
    ///
    /// Fails if a sort property cannot be turned into an ORDER BY expression.
    fn render_sorted_with_alias(&self, sort: &Sort, alias: Option<&str>) -> Result<String>;

    /// Renders a query counting the rows of this one. `projection` replaces
    /// the count argument.
    ///
    /// # Errors
    ///
    /// Fails if the count query cannot be rendered completely.
    fn render_count(&self, projection: Option<&str>) -> Result<String>;
}

/// Treats a blank projection override as absent.
pub(crate) fn projection_override(projection: Option<&str>) -> Option<&str> {
    projection.filter(|p| !p.trim().is_empty())
}
