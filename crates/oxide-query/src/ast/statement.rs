//! Statement AST types.

use super::expression::Expr;
use crate::enhancer::QueryShape;

/// An alias introduced with or without `AS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The `AS` keyword if present.
    pub keyword: Option<String>,
    /// Alias name.
    pub name: String,
}

impl Alias {
    /// Creates an alias without the `AS` keyword.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            keyword: None,
            name: name.into(),
        }
    }
}

/// A projected expression with optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<Alias>,
}

/// `SELECT [DISTINCT] items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectClause {
    pub keyword: String,
    pub distinct: Option<String>,
    pub items: Vec<SelectItem>,
}

/// A keyword followed by a boolean expression (`WHERE`, `HAVING`, `ON`, `WITH`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub keyword: String,
    pub expr: Expr,
}

/// Source of a root in the FROM clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    /// Entity name, possibly qualified.
    Entity(String),
    /// Derived root `[LATERAL] (subquery)`.
    Subquery {
        lateral: Option<String>,
        query: Box<Query>,
    },
    /// `IN (path)` collection member declaration.
    Collection { keyword: String, path: Expr },
}

/// Target of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// Association path or entity name.
    Path(Expr),
    /// Derived join `[LATERAL] (subquery)`.
    Subquery {
        lateral: Option<String>,
        query: Box<Query>,
    },
}

/// A join attached to a FROM root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Join keywords as written, without `FETCH` (e.g., `left outer join`).
    pub keyword: String,
    /// The `FETCH` keyword if present.
    pub fetch: Option<String>,
    pub target: JoinTarget,
    pub alias: Option<Alias>,
    /// `ON` or `WITH` condition.
    pub condition: Option<Condition>,
}

/// A root of the FROM clause together with its joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromRoot {
    pub source: RootSource,
    pub alias: Option<Alias>,
    pub joins: Vec<Join>,
}

/// `FROM root, root…`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromClause {
    pub keyword: String,
    pub roots: Vec<FromRoot>,
}

/// `GROUP BY items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupByClause {
    pub keyword: String,
    pub items: Vec<Expr>,
}

/// A sort specification inside ORDER BY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub expr: Expr,
    pub direction: Option<String>,
    /// `NULLS FIRST` or `NULLS LAST` as written.
    pub nulls: Option<String>,
}

/// `ORDER BY items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByClause {
    pub keyword: String,
    pub items: Vec<SortItem>,
}

/// A row limiting clause: `LIMIT n`, `OFFSET n [ROWS]`, or
/// `FETCH FIRST n ROWS ONLY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitClause {
    /// Leading keywords (e.g., `limit`, `fetch first`).
    pub keyword: String,
    pub expr: Expr,
    /// Trailing keywords (e.g., `rows only`).
    pub suffix: Option<String>,
}

/// A single query specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub select: Option<SelectClause>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Condition>,
    pub group_by: Option<GroupByClause>,
    pub having: Option<Condition>,
    /// True if the SELECT clause was written before FROM.
    pub select_first: bool,
}

/// Body of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryBody {
    Select(Box<SelectQuery>),
    /// Parenthesized query.
    Nested(Box<Query>),
    /// Left-associative set operation; `operator` is the keyword phrase as
    /// written (e.g., `union all`).
    SetOperation {
        left: Box<QueryBody>,
        operator: String,
        right: Box<QueryBody>,
    },
}

impl QueryBody {
    /// Returns the leftmost query specification.
    #[must_use]
    pub fn first_select(&self) -> &SelectQuery {
        match self {
            Self::Select(select) => select,
            Self::Nested(query) => query.body.first_select(),
            Self::SetOperation { left, .. } => left.first_select(),
        }
    }

    /// Returns true if this body combines queries with a set operator.
    #[must_use]
    pub fn is_set_operation(&self) -> bool {
        match self {
            Self::Select(_) => false,
            Self::Nested(query) => query.body.is_set_operation(),
            Self::SetOperation { .. } => true,
        }
    }

    fn any_expr(&self, predicate: &dyn Fn(&Expr) -> bool) -> bool {
        match self {
            Self::Select(select) => select.any_expr(predicate),
            Self::Nested(query) => query.any_expr(predicate),
            Self::SetOperation { left, right, .. } => {
                left.any_expr(predicate) || right.any_expr(predicate)
            }
        }
    }
}

impl SelectQuery {
    fn any_expr(&self, predicate: &dyn Fn(&Expr) -> bool) -> bool {
        let in_select = self
            .select
            .as_ref()
            .is_some_and(|s| s.items.iter().any(|item| item.expr.any(predicate)));
        let in_from = self.from.as_ref().is_some_and(|from| {
            from.roots.iter().any(|root| {
                let in_source = match &root.source {
                    RootSource::Entity(_) => false,
                    RootSource::Subquery { query, .. } => query.any_expr(predicate),
                    RootSource::Collection { path, .. } => path.any(predicate),
                };
                in_source
                    || root.joins.iter().any(|join| {
                        let in_target = match &join.target {
                            JoinTarget::Path(path) => path.any(predicate),
                            JoinTarget::Subquery { query, .. } => query.any_expr(predicate),
                        };
                        in_target
                            || join
                                .condition
                                .as_ref()
                                .is_some_and(|c| c.expr.any(predicate))
                    })
            })
        });
        in_select
            || in_from
            || self
                .where_clause
                .as_ref()
                .is_some_and(|c| c.expr.any(predicate))
            || self
                .group_by
                .as_ref()
                .is_some_and(|g| g.items.iter().any(|e| e.any(predicate)))
            || self.having.as_ref().is_some_and(|c| c.expr.any(predicate))
    }
}

/// A query with its ORDER BY and row limiting clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub body: QueryBody,
    pub order_by: Option<OrderByClause>,
    pub limits: Vec<LimitClause>,
}

impl Query {
    /// Returns true if `predicate` holds for any expression in the query.
    pub fn any_expr(&self, predicate: &dyn Fn(&Expr) -> bool) -> bool {
        self.body.any_expr(predicate)
            || self
                .order_by
                .as_ref()
                .is_some_and(|o| o.items.iter().any(|item| item.expr.any(predicate)))
    }
}

/// `attribute = value` inside an UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: Expr,
    pub value: Expr,
}

/// `UPDATE Entity [alias] SET … [WHERE …]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub keyword: String,
    pub entity: String,
    pub alias: Option<Alias>,
    pub set_keyword: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Condition>,
}

/// `DELETE FROM Entity [alias] [WHERE …]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStatement {
    /// Keywords as written (e.g., `delete from`).
    pub keyword: String,
    pub entity: String,
    pub alias: Option<Alias>,
    pub where_clause: Option<Condition>,
}

/// Source rows of an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertSource {
    Values { keyword: String, rows: Vec<Vec<Expr>> },
    Query(Box<Query>),
}

/// `INSERT INTO Entity (attributes) VALUES … | query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Keywords as written (e.g., `insert into`).
    pub keyword: String,
    pub entity: String,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Select(Query),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Insert(InsertStatement),
}

impl Statement {
    /// Returns the coarse shape of the statement.
    #[must_use]
    pub fn shape(&self) -> QueryShape {
        match self {
            Self::Select(query) if query.body.is_set_operation() => QueryShape::SetOperation,
            Self::Select(_) => QueryShape::Select,
            Self::Update(_) => QueryShape::Update,
            Self::Delete(_) => QueryShape::Delete,
            Self::Insert(_) => QueryShape::Insert,
        }
    }

    /// Returns the query if this is a SELECT statement.
    #[must_use]
    pub const fn as_query(&self) -> Option<&Query> {
        match self {
            Self::Select(query) => Some(query),
            _ => None,
        }
    }
}
