//! # oxide-query
//!
//! Sort and count rewriting for JPQL, EQL, HQL and native SQL queries.
//!
//! This crate provides:
//! - A hand-written parser for the JPQL family with per-dialect extensions
//! - A token renderer that reproduces parsed queries with their original
//!   spelling
//! - Transformers adding ORDER BY from a runtime [`Sort`] and deriving count
//!   queries for pagination
//! - The same operations on native SQL through `sqlparser`
//!
//! ## Sorting
//!
//! ```rust
//! use oxide_query::{JpqlQueryEnhancer, Order, QueryEnhancer, Sort};
//!
//! let query = JpqlQueryEnhancer::parse("select p from Person p join p.address a").unwrap();
//! let sorted = query
//!     .render_sorted(&Sort::by([Order::asc("name"), Order::desc("a.city")]))
//!     .unwrap();
//! assert_eq!(
//!     sorted,
//!     "select p from Person p join p.address a order by p.name asc, a.city desc"
//! );
//! ```
//!
//! ## Counting
//!
//! ```rust
//! use oxide_query::{HqlQueryEnhancer, QueryEnhancer};
//!
//! let query = HqlQueryEnhancer::parse("from Person p where p.age > 18 order by p.name").unwrap();
//! assert_eq!(
//!     query.render_count(None).unwrap(),
//!     "select count(p) from Person p where p.age > 18"
//! );
//! ```

pub mod ast;
pub mod config;
pub mod dialect;
pub mod enhancer;
pub mod error;
pub mod lexer;
pub mod native;
pub mod parser;
pub mod render;
pub mod sort;
pub mod transform;

pub use config::{EnhancerConfig, PersistenceProvider};
pub use dialect::{Dialect, DialectKind, EqlDialect, HqlDialect, JpqlDialect};
pub use enhancer::{
    parse, DeclaredQuery, EqlQueryEnhancer, HqlQueryEnhancer, JpaQueryEnhancer,
    JpqlQueryEnhancer, QueryEnhancer, QueryEnhancerFactory, QueryShape,
};
pub use error::{QueryError, Result};
pub use native::NativeQueryEnhancer;
pub use parser::{ParseError, Parser};
pub use sort::{Direction, NullHandling, Order, Sort};
