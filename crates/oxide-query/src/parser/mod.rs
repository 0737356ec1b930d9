//! Query parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing.
//! Which constructs are accepted depends on the [`Dialect`](crate::dialect::Dialect).

mod error;
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;
