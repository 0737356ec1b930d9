//! Query rewriting over the JPQL family AST.
//!
//! [`introspect`] gathers what a rewrite needs from the parsed statement;
//! [`SortTransformer`] and [`CountTransformer`] then walk the statement again
//! through the shared [`QueryWriter`].

mod count;
mod introspect;
mod qualify;
mod sort;
mod writer;

pub use count::CountTransformer;
pub use introspect::{introspect, Introspection};
pub use qualify::{qualify, AliasRegistry, Qualified};
pub use sort::SortTransformer;
pub use writer::{write_verbatim, QueryWriter, Transform};
