//! Abstract Syntax Tree for JPQL, EQL and HQL statements.

mod expression;
mod statement;

pub use expression::{ElseClause, Expr, FunctionCall, WhenClause};
pub use statement::{
    Alias, Assignment, Condition, DeleteStatement, FromClause, FromRoot, GroupByClause,
    InsertSource, InsertStatement, Join, JoinTarget, LimitClause, OrderByClause, Query, QueryBody,
    RootSource, SelectClause, SelectItem, SelectQuery, SortItem, Statement, UpdateStatement,
};
