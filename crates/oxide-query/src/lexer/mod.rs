//! Query lexer.
//!
//! A hand-written lexer shared by the JPQL, EQL and HQL front-ends. Tokens only
//! carry their kind and byte span; the parser reads literal and keyword
//! spellings back from the source so re-rendered queries keep the author's
//! casing.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
