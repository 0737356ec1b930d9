//! Token types for the query lexer.

use super::Span;

/// Keywords of the JPQL family of query languages.
///
/// Functions such as `count`, `lower` or `key` are not keywords: they lex as
/// identifiers and become function calls when followed by `(`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Query clauses
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    Nulls,
    First,
    Last,
    Distinct,
    As,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Fetch,
    On,
    With,
    Lateral,

    // Set operations and quantifiers
    Union,
    Intersect,
    Except,
    All,
    Any,
    Some,

    // Statements
    Update,
    Set,
    Delete,
    Insert,
    Into,
    Values,

    // Predicates
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Ilike,
    Escape,
    Is,
    Null,
    Empty,
    Member,
    Of,
    Exists,
    True,
    False,

    // Expressions
    Case,
    When,
    Then,
    Else,
    End,
    New,
    Cast,
    Treat,

    // Row limiting
    Limit,
    Offset,
    Rows,
    Row,
    Only,
    Next,
    Ties,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "ORDER" => Some(Self::Order),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "NULLS" => Some(Self::Nulls),
            "FIRST" => Some(Self::First),
            "LAST" => Some(Self::Last),
            "DISTINCT" => Some(Self::Distinct),
            "AS" => Some(Self::As),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "FETCH" => Some(Self::Fetch),
            "ON" => Some(Self::On),
            "WITH" => Some(Self::With),
            "LATERAL" => Some(Self::Lateral),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "ALL" => Some(Self::All),
            "ANY" => Some(Self::Any),
            "SOME" => Some(Self::Some),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "ILIKE" => Some(Self::Ilike),
            "ESCAPE" => Some(Self::Escape),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "EMPTY" => Some(Self::Empty),
            "MEMBER" => Some(Self::Member),
            "OF" => Some(Self::Of),
            "EXISTS" => Some(Self::Exists),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "NEW" => Some(Self::New),
            "CAST" => Some(Self::Cast),
            "TREAT" => Some(Self::Treat),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "ROWS" => Some(Self::Rows),
            "ROW" => Some(Self::Row),
            "ONLY" => Some(Self::Only),
            "NEXT" => Some(Self::Next),
            "TIES" => Some(Self::Ties),
            _ => None,
        }
    }

    /// Returns the keyword as an upper-case string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::By => "BY",
            Self::Having => "HAVING",
            Self::Order => "ORDER",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Nulls => "NULLS",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::Distinct => "DISTINCT",
            Self::As => "AS",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::Fetch => "FETCH",
            Self::On => "ON",
            Self::With => "WITH",
            Self::Lateral => "LATERAL",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::All => "ALL",
            Self::Any => "ANY",
            Self::Some => "SOME",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Ilike => "ILIKE",
            Self::Escape => "ESCAPE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::Empty => "EMPTY",
            Self::Member => "MEMBER",
            Self::Of => "OF",
            Self::Exists => "EXISTS",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::New => "NEW",
            Self::Cast => "CAST",
            Self::Treat => "TREAT",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Rows => "ROWS",
            Self::Row => "ROW",
            Self::Only => "ONLY",
            Self::Next => "NEXT",
            Self::Ties => "TIES",
        }
    }

    /// Returns true if the keyword may also be used as an identifier, for
    /// example an entity attribute called `first` or an alias called `rows`.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::First
                | Self::Last
                | Self::Nulls
                | Self::Of
                | Self::Empty
                | Self::Escape
                | Self::Rows
                | Self::Row
                | Self::Only
                | Self::Next
                | Self::Ties
                | Self::Limit
                | Self::Offset
                | Self::Values
                | Self::Lateral
                | Self::Ilike
        )
    }

    /// Returns true if the keyword can name a variable without `AS`, i.e. it
    /// never starts a clause, join or operator that may follow an alias.
    #[must_use]
    pub const fn can_be_alias(&self) -> bool {
        matches!(
            self,
            Self::First
                | Self::Last
                | Self::Of
                | Self::Empty
                | Self::Rows
                | Self::Row
                | Self::Only
                | Self::Next
                | Self::Ties
                | Self::Values
                | Self::All
                | Self::Any
                | Self::Some
                | Self::Update
                | Self::Delete
                | Self::Insert
        )
    }
}

/// The kind of token.
///
/// Literal kinds carry no value: the parser keeps the source spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal, including type suffixes (e.g., `42`, `1.5d`, `10L`)
    Number,
    /// String literal (e.g., 'hello')
    String,

    // Identifiers and keywords
    /// Identifier, possibly quoted (e.g., `name`, `"order"`)
    Identifier(String),
    /// Query keyword
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// .
    Dot,
    /// :
    Colon,
    /// ?
    Question,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}
