//! Native SQL support.
//!
//! SQL is parsed with `sqlparser` and rewritten on its statement tree; the
//! rewritten statement is printed by `sqlparser`, so keywords come out
//! normalized.

use std::sync::LazyLock;

use regex::Regex;
use sqlparser::ast::{
    Expr, OrderBy, OrderByKind, Select, SelectItem, SetExpr, Statement, TableFactor,
};
use sqlparser::dialect::{dialect_from_str, Dialect as SqlDialect};
use sqlparser::parser::Parser as SqlParser;
use tracing::{debug, trace};

use crate::dialect::DialectKind;
use crate::enhancer::{projection_override, QueryEnhancer, QueryShape};
use crate::error::{QueryError, Result};
use crate::sort::{NullHandling, Order, Sort};
use crate::transform::{qualify, AliasRegistry};

/// Name of the dialect accepting any SQL `sqlparser` understands.
pub const GENERIC_DIALECT: &str = "generic";

static CONSTRUCTOR_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bselect\s+(?:distinct\s+)?new\s+[\w.]+\s*\(")
        .expect("constructor expression pattern is valid")
});

/// A native SQL query parsed once and introspected at construction.
#[derive(Debug, Clone)]
pub struct NativeQueryEnhancer {
    query: String,
    dialect: String,
    statement: Statement,
    shape: QueryShape,
    alias: Option<String>,
    projection: String,
    constructor: bool,
    aliases: AliasRegistry,
}

impl NativeQueryEnhancer {
    /// Parses `query` with the `sqlparser` dialect named `dialect` (e.g.,
    /// `generic`, `postgresql`, `mysql`).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownDialect`] for an unknown dialect name and
    /// [`QueryError::InvalidSql`] if the text is not exactly one valid
    /// statement.
    pub fn parse(query: impl Into<String>, dialect: &str) -> Result<Self> {
        let query = query.into();
        let sql_dialect = sql_dialect(dialect)?;
        let mut statements =
            SqlParser::parse_sql(sql_dialect.as_ref(), &query).map_err(|err| {
                QueryError::InvalidSql {
                    query: query.clone(),
                    message: err.to_string(),
                }
            })?;
        let count = statements.len();
        let statement = match (statements.pop(), count) {
            (Some(statement), 1) => statement,
            _ => {
                return Err(QueryError::InvalidSql {
                    query,
                    message: format!("expected a single statement, found {count}"),
                })
            }
        };

        let shape = detect_shape(&statement);
        let select = plain_select(&statement);
        let alias = match &statement {
            Statement::Merge { source, .. } => table_alias(source),
            _ => select
                .and_then(|select| select.from.first())
                .and_then(|table| table_alias(&table.relation)),
        }
        .map(str::to_string);
        let aliases = select.map(collect_aliases).unwrap_or_default();
        let projection = first_select(&statement).map(render_projection).unwrap_or_default();
        let constructor = CONSTRUCTOR_EXPRESSION.is_match(&query);

        debug!(dialect = %dialect, ?shape, ?alias, "Parsed native query");

        Ok(Self {
            query,
            dialect: dialect.to_string(),
            statement,
            shape,
            alias,
            projection,
            constructor,
            aliases,
        })
    }

    /// Returns the parsed statement.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Returns the name of the `sqlparser` dialect.
    #[must_use]
    pub fn sql_dialect(&self) -> &str {
        &self.dialect
    }

    /// Returns the aliases of joined tables, including additional FROM
    /// tables.
    #[must_use]
    pub fn join_aliases(&self) -> &[String] {
        self.aliases.join_aliases()
    }

    /// Returns the aliases of select items.
    #[must_use]
    pub fn selection_aliases(&self) -> &[String] {
        self.aliases.selection_aliases()
    }

    fn sorted(&self, sort: &Sort, alias: Option<&str>) -> Result<Option<String>> {
        let mut statement = self.statement.clone();
        let Statement::Query(query) = &mut statement else {
            return Ok(None);
        };

        let dialect = sql_dialect(&self.dialect)?;
        let added = match query.body.as_ref() {
            SetExpr::Select(_) => order_by(dialect.as_ref(), sort, |property| {
                qualify(
                    property,
                    self.aliases.join_aliases(),
                    self.aliases.selection_aliases(),
                    alias,
                )
                .to_string()
            })?,
            SetExpr::SetOperation { .. } if !contains_values(&query.body) => {
                order_by(dialect.as_ref(), sort, str::to_string)?
            }
            _ => return Ok(None),
        };
        let Some(added) = added else {
            return Ok(None);
        };

        match &mut query.order_by {
            Some(existing) => {
                let OrderByKind::Expressions(exprs) = &mut existing.kind else {
                    return Ok(None);
                };
                if let OrderByKind::Expressions(more) = added.kind {
                    exprs.extend(more);
                }
            }
            None => query.order_by = Some(added),
        }
        Ok(Some(statement.to_string()))
    }

    fn counted(&self, projection: Option<&str>) -> Result<Option<String>> {
        let mut statement = self.statement.clone();
        let Statement::Query(query) = &mut statement else {
            return Ok(None);
        };
        query.order_by = None;
        let SetExpr::Select(select) = query.body.as_mut() else {
            return Ok(None);
        };

        let distinct = select.distinct.take().is_some();
        let argument = match projection {
            Some(projection) => projection.to_string(),
            None if distinct => format!("DISTINCT {}", distinct_argument(&select.projection)),
            None => count_argument(&select.projection),
        };

        let dialect = sql_dialect(&self.dialect)?;
        let count = format!("count({argument})");
        let expr = SqlParser::new(dialect.as_ref())
            .try_with_sql(&count)
            .and_then(|mut parser| parser.parse_expr())
            .map_err(|err| QueryError::InvalidSql {
                query: count.clone(),
                message: err.to_string(),
            })?;
        select.projection = vec![SelectItem::UnnamedExpr(expr)];
        Ok(Some(statement.to_string()))
    }
}

impl QueryEnhancer for NativeQueryEnhancer {
    fn query(&self) -> &str {
        &self.query
    }

    fn dialect(&self) -> DialectKind {
        DialectKind::Native
    }

    fn shape(&self) -> QueryShape {
        self.shape
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn projection(&self) -> &str {
        &self.projection
    }

    fn has_constructor_expression(&self) -> bool {
        self.constructor
    }

    fn render(&self) -> Result<String> {
        Ok(self.statement.to_string())
    }

    fn render_sorted_with_alias(&self, sort: &Sort, alias: Option<&str>) -> Result<String> {
        if sort.is_unsorted() || !self.shape.accepts_sort() {
            return Ok(self.query.clone());
        }
        match self.sorted(sort, alias)? {
            Some(sorted) => {
                trace!(query = %sorted, "Rendered sorted query");
                Ok(sorted)
            }
            None => {
                debug!(shape = ?self.shape, "Query cannot be sorted, keeping it as is");
                Ok(self.query.clone())
            }
        }
    }

    fn render_count(&self, projection: Option<&str>) -> Result<String> {
        if !self.shape.accepts_count() {
            return Ok(self.query.clone());
        }
        match self.counted(projection_override(projection))? {
            Some(counted) => {
                trace!(query = %counted, "Rendered count query");
                Ok(counted)
            }
            None => {
                debug!(shape = ?self.shape, "Query cannot be counted, keeping it as is");
                Ok(self.query.clone())
            }
        }
    }
}

fn sql_dialect(name: &str) -> Result<Box<dyn SqlDialect>> {
    dialect_from_str(name).ok_or_else(|| QueryError::UnknownDialect(name.to_string()))
}

fn detect_shape(statement: &Statement) -> QueryShape {
    match statement {
        Statement::Query(query) => match query.body.as_ref() {
            SetExpr::SetOperation { .. } => QueryShape::SetOperation,
            SetExpr::Values(_) => QueryShape::Other,
            _ => QueryShape::Select,
        },
        Statement::Insert { .. } => QueryShape::Insert,
        Statement::Update { .. } => QueryShape::Update,
        Statement::Delete { .. } => QueryShape::Delete,
        Statement::Merge { .. } => QueryShape::Merge,
        _ => QueryShape::Other,
    }
}

/// Returns the query specification of a statement that is a single SELECT.
fn plain_select(statement: &Statement) -> Option<&Select> {
    match statement {
        Statement::Query(query) => match query.body.as_ref() {
            SetExpr::Select(select) => Some(select),
            _ => None,
        },
        _ => None,
    }
}

/// Returns the leftmost SELECT of a query, looking through set operations.
fn first_select(statement: &Statement) -> Option<&Select> {
    fn leftmost(body: &SetExpr) -> Option<&Select> {
        match body {
            SetExpr::Select(select) => Some(select),
            SetExpr::SetOperation { left, .. } => leftmost(left),
            _ => None,
        }
    }
    match statement {
        Statement::Query(query) => leftmost(&query.body),
        _ => None,
    }
}

fn contains_values(body: &SetExpr) -> bool {
    match body {
        SetExpr::Values(_) => true,
        SetExpr::SetOperation { left, right, .. } => contains_values(left) || contains_values(right),
        SetExpr::Query(query) => contains_values(&query.body),
        _ => false,
    }
}

fn table_alias(table: &TableFactor) -> Option<&str> {
    match table {
        TableFactor::Table { alias, .. }
        | TableFactor::Derived { alias, .. }
        | TableFactor::NestedJoin { alias, .. } => {
            alias.as_ref().map(|alias| alias.name.value.as_str())
        }
        _ => None,
    }
}

fn collect_aliases(select: &Select) -> AliasRegistry {
    let mut aliases = AliasRegistry::new();
    for (index, table) in select.from.iter().enumerate() {
        if index > 0 {
            if let Some(alias) = table_alias(&table.relation) {
                aliases.register_join(alias);
            }
        }
        for join in &table.joins {
            if let Some(alias) = table_alias(&join.relation) {
                aliases.register_join(alias);
            }
        }
    }
    for item in &select.projection {
        if let SelectItem::ExprWithAlias { alias, .. } = item {
            aliases.register_selection(&alias.value);
        }
    }
    aliases
}

fn render_projection(select: &Select) -> String {
    select
        .projection
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_item_expr(item: &SelectItem) -> Option<&Expr> {
    match item {
        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => Some(expr),
        _ => None,
    }
}

/// A single column is counted by name; anything else counts rows.
fn count_argument(projection: &[SelectItem]) -> String {
    match projection {
        [item] => match select_item_expr(item) {
            Some(expr @ (Expr::Identifier(_) | Expr::CompoundIdentifier(_))) => expr.to_string(),
            _ => String::from("*"),
        },
        _ => String::from("*"),
    }
}

/// The select list without result aliases.
fn distinct_argument(projection: &[SelectItem]) -> String {
    projection
        .iter()
        .map(|item| select_item_expr(item).map_or_else(|| item.to_string(), ToString::to_string))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses the ORDER BY items for `sort`, referencing each property as
/// returned by `reference`. Returns `None` for an empty sort.
fn order_by(
    dialect: &dyn SqlDialect,
    sort: &Sort,
    mut reference: impl FnMut(&str) -> String,
) -> Result<Option<OrderBy>> {
    let mut combined: Option<OrderBy> = None;
    for order in sort {
        let item = order_by_item(dialect, order, &reference(&order.property))?;
        match &mut combined {
            Some(OrderBy {
                kind: OrderByKind::Expressions(exprs),
                ..
            }) => {
                if let OrderByKind::Expressions(more) = item.kind {
                    exprs.extend(more);
                }
            }
            _ => combined = Some(item),
        }
    }
    Ok(combined)
}

/// Parses a single ORDER BY item by parsing `SELECT 1 ORDER BY <item>`.
fn order_by_item(dialect: &dyn SqlDialect, order: &Order, reference: &str) -> Result<OrderBy> {
    let invalid = |message: String| QueryError::InvalidSortExpression {
        property: order.property.clone(),
        message,
    };
    if order.property.trim().is_empty() {
        return Err(invalid(String::from("empty sort property")));
    }

    let mut item = if order.ignore_case {
        format!("lower({reference})")
    } else {
        reference.to_string()
    };
    item.push_str(if order.direction.is_ascending() {
        " ASC"
    } else {
        " DESC"
    });
    match order.null_handling {
        NullHandling::Native => {}
        NullHandling::NullsFirst => item.push_str(" NULLS FIRST"),
        NullHandling::NullsLast => item.push_str(" NULLS LAST"),
    }

    let mut statements = SqlParser::parse_sql(dialect, &format!("SELECT 1 ORDER BY {item}"))
        .map_err(|err| invalid(err.to_string()))?;
    let order_by = match (statements.pop(), statements.is_empty()) {
        (Some(Statement::Query(query)), true) => query.order_by,
        _ => None,
    };
    match order_by {
        Some(order_by)
            if matches!(&order_by.kind, OrderByKind::Expressions(exprs) if exprs.len() == 1) =>
        {
            Ok(order_by)
        }
        _ => Err(invalid(String::from("not a single ORDER BY expression"))),
    }
}
