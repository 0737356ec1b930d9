//! Expression AST types.
//!
//! Operators, literals and keywords are stored with their source spelling so
//! a rendered query keeps the author's casing.

use super::statement::{Query, SelectItem};

/// A function call such as `lower(p.name)` or `count(distinct p)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Function name as written.
    pub name: String,
    /// `DISTINCT` keyword inside the argument list.
    pub distinct: Option<String>,
    /// Arguments.
    pub args: Vec<Expr>,
}

/// A `WHEN … THEN …` branch of a CASE expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhenClause {
    /// The `WHEN` keyword.
    pub keyword: String,
    /// Condition, or comparand for a simple CASE.
    pub condition: Expr,
    /// The `THEN` keyword.
    pub then_keyword: String,
    /// Result expression.
    pub result: Expr,
}

/// The `ELSE` branch of a CASE expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseClause {
    /// The `ELSE` keyword.
    pub keyword: String,
    /// Result expression.
    pub result: Box<Expr>,
}

/// A query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Identification variable or path expression (e.g., `p`, `p.address.city`).
    Path(String),
    /// Literal as written (`'text'`, `42L`, `TRUE`, `null`).
    Literal(String),
    /// Named or positional parameter (`:name`, `?1`).
    Parameter(String),
    /// `*` as a function argument.
    Star,
    /// Binary operation; `op` is the operator as written (`=`, `AND`, `||`).
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    /// Prefix operation (`NOT`, `-`, `+`).
    Unary { op: String, operand: Box<Expr> },
    /// Function call.
    Function(FunctionCall),
    /// `CAST(expr AS type)` or `TREAT(path AS Subtype)`.
    Cast {
        function: String,
        expr: Box<Expr>,
        keyword: String,
        target: String,
    },
    /// Constructor expression `NEW com.example.Dto(…)`.
    Constructor {
        keyword: String,
        class: String,
        args: Vec<SelectItem>,
    },
    /// CASE expression, searched or simple.
    Case {
        keyword: String,
        operand: Option<Box<Expr>>,
        whens: Vec<WhenClause>,
        else_clause: Option<ElseClause>,
        end: String,
    },
    /// Parenthesized sub-query.
    Subquery(Box<Query>),
    /// Parenthesized expression.
    Nested(Box<Expr>),
    /// Parenthesized list `(a, b, c)`.
    Tuple(Vec<Expr>),
    /// `expr [NOT] IN list`; `keyword` includes the negation.
    In {
        expr: Box<Expr>,
        keyword: String,
        list: Box<Expr>,
    },
    /// `expr [NOT] BETWEEN low AND high`.
    Between {
        expr: Box<Expr>,
        keyword: String,
        low: Box<Expr>,
        and_keyword: String,
        high: Box<Expr>,
    },
    /// `expr [NOT] LIKE pattern [ESCAPE char]`.
    Like {
        expr: Box<Expr>,
        keyword: String,
        pattern: Box<Expr>,
        escape: Option<(String, Box<Expr>)>,
    },
    /// `expr IS [NOT] NULL|EMPTY|TRUE|FALSE`; `keyword` is the whole phrase.
    Is { expr: Box<Expr>, keyword: String },
    /// `expr [NOT] MEMBER [OF] collection`.
    MemberOf {
        expr: Box<Expr>,
        keyword: String,
        collection: Box<Expr>,
    },
    /// `EXISTS (subquery)`.
    Exists { keyword: String, query: Box<Query> },
    /// `ALL|ANY|SOME (subquery)`.
    Quantified { keyword: String, query: Box<Query> },
}

impl Expr {
    /// Returns true if `predicate` holds for this expression or any expression
    /// nested in it, including expressions inside sub-queries.
    pub fn any(&self, predicate: &dyn Fn(&Self) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        match self {
            Self::Path(_) | Self::Literal(_) | Self::Parameter(_) | Self::Star => false,
            Self::Binary { left, right, .. } => left.any(predicate) || right.any(predicate),
            Self::Unary { operand, .. } => operand.any(predicate),
            Self::Function(call) => call.args.iter().any(|arg| arg.any(predicate)),
            Self::Cast { expr, .. } | Self::Is { expr, .. } | Self::Nested(expr) => {
                expr.any(predicate)
            }
            Self::Constructor { args, .. } => args.iter().any(|item| item.expr.any(predicate)),
            Self::Case {
                operand,
                whens,
                else_clause,
                ..
            } => {
                operand.as_ref().is_some_and(|e| e.any(predicate))
                    || whens
                        .iter()
                        .any(|w| w.condition.any(predicate) || w.result.any(predicate))
                    || else_clause
                        .as_ref()
                        .is_some_and(|e| e.result.any(predicate))
            }
            Self::Subquery(query) | Self::Exists { query, .. } | Self::Quantified { query, .. } => {
                query.any_expr(predicate)
            }
            Self::Tuple(items) => items.iter().any(|e| e.any(predicate)),
            Self::In { expr, list, .. } => expr.any(predicate) || list.any(predicate),
            Self::Between { expr, low, high, .. } => {
                expr.any(predicate) || low.any(predicate) || high.any(predicate)
            }
            Self::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                expr.any(predicate)
                    || pattern.any(predicate)
                    || escape.as_ref().is_some_and(|(_, e)| e.any(predicate))
            }
            Self::MemberOf {
                expr, collection, ..
            } => expr.any(predicate) || collection.any(predicate),
        }
    }

    /// Returns true if this is a constructor expression.
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        matches!(self, Self::Constructor { .. })
    }
}
