//! Re-rendering of parsed statements.
//!
//! [`QueryWriter`] reproduces a statement token by token. The sort and count
//! transformers hook into the walk through [`Transform`]; everything they do
//! not touch is written as parsed.

use super::count::CountTransformer;
use super::sort::SortTransformer;
use crate::ast::{
    Alias, Condition, DeleteStatement, Expr, FromClause, FromRoot, GroupByClause, InsertSource,
    InsertStatement, Join, JoinTarget, LimitClause, OrderByClause, Query, QueryBody, RootSource,
    SelectClause, SelectItem, SelectQuery, SortItem, Statement, UpdateStatement,
};
use crate::render::{
    concat, Renderer, RendererBuilder, Token, TOKEN_AS, TOKEN_CLOSE_PAREN, TOKEN_COMMA,
    TOKEN_DOUBLE_UNDERSCORE, TOKEN_OPEN_PAREN, TOKEN_STAR,
};

/// The rewrite applied while walking.
pub enum Transform<'t, 's> {
    /// Reproduce the statement as parsed.
    Verbatim,
    /// Amend the root ORDER BY.
    Sort(&'t mut SortTransformer<'s>),
    /// Replace the root projection with a count.
    Count(&'t CountTransformer<'s>),
}

/// Walks a statement and renders it.
pub struct QueryWriter<'t, 's> {
    transform: Transform<'t, 's>,
    /// Sub-query nesting level; the top-level query and the branches of a
    /// top-level set operation are at depth 0.
    depth: usize,
}

impl<'t, 's> QueryWriter<'t, 's> {
    #[must_use]
    pub const fn new(transform: Transform<'t, 's>) -> Self {
        Self {
            transform,
            depth: 0,
        }
    }

    /// Creates a writer that reproduces its input.
    #[must_use]
    pub const fn verbatim() -> Self {
        Self::new(Transform::Verbatim)
    }

    fn counter(&self) -> Option<&'t CountTransformer<'s>> {
        match &self.transform {
            Transform::Count(counter) => Some(*counter),
            _ => None,
        }
    }

    fn at_root(&self) -> bool {
        self.depth == 0
    }

    pub fn write_statement(&mut self, statement: &Statement) -> Renderer {
        match statement {
            Statement::Select(query) => self.write_root_query(query),
            Statement::Update(update) => self.write_update(update),
            Statement::Delete(delete) => self.write_delete(delete),
            Statement::Insert(insert) => self.write_insert(insert),
        }
    }

    fn write_root_query(&mut self, query: &Query) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append_expression(self.write_body(&query.body));

        if self.counter().is_some() {
            // Ordering and row limits do not apply to a count
            return builder.into_renderer();
        }

        let order_by = query.order_by.as_ref().map(|o| self.write_order_by(o));
        if let Transform::Sort(sorter) = &mut self.transform {
            let set_operation = query.body.is_set_operation();
            builder.append_expression(sorter.order_by_clause(order_by, set_operation));
        } else if let Some(order_by) = order_by {
            builder.append_expression(order_by);
        }

        for limit in &query.limits {
            builder.append_expression(self.write_limit(limit));
        }
        builder.into_renderer()
    }

    /// Writes a query that is not the statement itself, verbatim apart from
    /// what the transform changes at depth 0.
    fn write_query(&mut self, query: &Query) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append_expression(self.write_body(&query.body));
        if self.at_root() && self.counter().is_some() {
            return builder.into_renderer();
        }
        if let Some(order_by) = &query.order_by {
            builder.append_expression(self.write_order_by(order_by));
        }
        for limit in &query.limits {
            builder.append_expression(self.write_limit(limit));
        }
        builder.into_renderer()
    }

    /// Writes a query nested in an expression or a FROM clause.
    fn write_subquery(&mut self, query: &Query) -> Renderer {
        self.depth += 1;
        let renderer = self.write_query(query);
        self.depth -= 1;
        renderer
    }

    fn write_parenthesized_subquery(&mut self, query: &Query) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(TOKEN_OPEN_PAREN)
            .append_inline(self.write_subquery(query))
            .append(TOKEN_CLOSE_PAREN);
        builder.into_renderer()
    }

    fn write_body(&mut self, body: &QueryBody) -> Renderer {
        match body {
            QueryBody::Select(select) => self.write_select_query(select),
            QueryBody::Nested(query) => {
                let mut builder = RendererBuilder::new();
                builder
                    .append(TOKEN_OPEN_PAREN)
                    .append_inline(self.write_query(query))
                    .append(TOKEN_CLOSE_PAREN);
                builder.into_renderer()
            }
            QueryBody::SetOperation {
                left,
                operator,
                right,
            } => {
                let mut builder = RendererBuilder::new();
                builder
                    .append_expression(self.write_body(left))
                    .append(Token::expression(operator.as_str()))
                    .append_expression(self.write_body(right));
                builder.into_renderer()
            }
        }
    }

    fn write_select_query(&mut self, select: &SelectQuery) -> Renderer {
        let counting = self.at_root() && self.counter().is_some();
        let select_clause = if counting {
            self.write_count_select_clause(select.select.as_ref())
        } else {
            select
                .select
                .as_ref()
                .map_or(Renderer::Empty, |clause| self.write_select_clause(clause))
        };
        // A missing SELECT clause replaced by a count goes first
        let (leading, trailing) = if select.select_first || select.select.is_none() {
            (select_clause, Renderer::Empty)
        } else {
            (Renderer::Empty, select_clause)
        };

        let mut builder = RendererBuilder::new();
        builder.append_expression(leading);
        if let Some(from) = &select.from {
            builder.append_expression(self.write_from_clause(from));
        }
        if let Some(condition) = &select.where_clause {
            builder.append_expression(self.write_condition(condition));
        }
        if let Some(group_by) = &select.group_by {
            builder.append_expression(self.write_group_by(group_by));
        }
        if let Some(having) = &select.having {
            builder.append_expression(self.write_condition(having));
        }
        builder.append_expression(trailing);
        builder.into_renderer()
    }

    fn write_select_clause(&mut self, clause: &SelectClause) -> Renderer {
        if self.at_root() {
            if let Transform::Sort(sorter) = &mut self.transform {
                for alias in clause.items.iter().filter_map(|item| item.alias.as_ref()) {
                    sorter.register_selection_alias(&alias.name);
                }
            }
        }

        let mut builder = RendererBuilder::new();
        builder.append(Token::expression(clause.keyword.as_str()));
        if let Some(distinct) = &clause.distinct {
            builder.append(Token::expression(distinct.as_str()));
        }
        builder.append(self.write_select_items(&clause.items));
        builder.into_renderer()
    }

    fn write_count_select_clause(&mut self, clause: Option<&SelectClause>) -> Renderer {
        match self.counter() {
            Some(counter) => counter.select_clause(self, clause),
            None => Renderer::Empty,
        }
    }

    pub fn write_select_items(&mut self, items: &[SelectItem]) -> Renderer {
        concat(items, |item| self.write_select_item(item), &TOKEN_COMMA)
    }

    fn write_select_item(&mut self, item: &SelectItem) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append(self.write_expr(&item.expr));
        if let Some(alias) = &item.alias {
            builder.append(write_alias(alias));
        }
        builder.into_renderer()
    }

    fn write_from_clause(&mut self, from: &FromClause) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append(Token::expression(from.keyword.as_str()));
        let roots = concat(
            from.roots.iter().enumerate(),
            |(index, root)| self.write_from_root(root, index == 0),
            &TOKEN_COMMA,
        );
        builder.append(roots);
        builder.into_renderer()
    }

    fn write_from_root(&mut self, root: &FromRoot, first: bool) -> Renderer {
        let mut builder = RendererBuilder::new();
        match &root.source {
            RootSource::Entity(name) => {
                builder.append(Token::expression(name.as_str()));
            }
            RootSource::Subquery { lateral, query } => {
                if let Some(lateral) = lateral {
                    builder.append(Token::expression(lateral.as_str()));
                }
                builder.append(self.write_parenthesized_subquery(query));
            }
            RootSource::Collection { keyword, path } => {
                builder
                    .append(Token::expression(keyword.as_str()))
                    .append(TOKEN_OPEN_PAREN)
                    .append_inline(self.write_expr(path))
                    .append(TOKEN_CLOSE_PAREN);
            }
        }

        match &root.alias {
            Some(alias) => {
                if !first && self.at_root() {
                    self.register_join_alias(&alias.name);
                }
                builder.append(write_alias(alias));
            }
            None => {
                let synthetic = first
                    && self.at_root()
                    && matches!(root.source, RootSource::Entity(_))
                    && self.counter().is_some_and(CountTransformer::uses_synthetic_alias);
                if synthetic {
                    builder.append(TOKEN_AS).append(TOKEN_DOUBLE_UNDERSCORE);
                }
            }
        }

        for join in &root.joins {
            builder.append_expression(self.write_join(join));
        }
        builder.into_renderer()
    }

    fn register_join_alias(&mut self, alias: &str) {
        if let Transform::Sort(sorter) = &mut self.transform {
            sorter.register_join_alias(alias);
        }
    }

    fn write_join(&mut self, join: &Join) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append(Token::expression(join.keyword.as_str()));
        if let Some(fetch) = &join.fetch {
            // Fetch joins are illegal in a count query
            if !(self.at_root() && self.counter().is_some()) {
                builder.append(Token::expression(fetch.as_str()));
            }
        }

        match &join.target {
            JoinTarget::Path(path) => {
                builder.append_expression(self.write_expr(path));
            }
            JoinTarget::Subquery { lateral, query } => {
                if let Some(lateral) = lateral {
                    builder.append(Token::expression(lateral.as_str()));
                }
                builder.append(self.write_parenthesized_subquery(query));
            }
        }

        if let Some(alias) = &join.alias {
            if self.at_root() {
                self.register_join_alias(&alias.name);
            }
            builder.append(write_alias(alias));
        }
        if let Some(condition) = &join.condition {
            builder.append_expression(self.write_condition(condition));
        }
        builder.into_renderer()
    }

    fn write_condition(&mut self, condition: &Condition) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(Token::expression(condition.keyword.as_str()))
            .append_expression(self.write_expr(&condition.expr));
        builder.into_renderer()
    }

    fn write_group_by(&mut self, group_by: &GroupByClause) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(Token::expression(group_by.keyword.as_str()))
            .append(self.write_expressions(&group_by.items));
        builder.into_renderer()
    }

    fn write_order_by(&mut self, order_by: &OrderByClause) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append(Token::expression(order_by.keyword.as_str()));
        let items = concat(&order_by.items, |item| self.write_sort_item(item), &TOKEN_COMMA);
        builder.append(items);
        builder.into_renderer()
    }

    fn write_sort_item(&mut self, item: &SortItem) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder.append_expression(self.write_expr(&item.expr));
        if let Some(direction) = &item.direction {
            builder.append(Token::expression(direction.as_str()));
        }
        if let Some(nulls) = &item.nulls {
            builder.append(Token::expression(nulls.as_str()));
        }
        builder.into_renderer()
    }

    fn write_limit(&mut self, limit: &LimitClause) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(Token::expression(limit.keyword.as_str()))
            .append_expression(self.write_expr(&limit.expr));
        if let Some(suffix) = &limit.suffix {
            builder.append(Token::expression(suffix.as_str()));
        }
        builder.into_renderer()
    }

    fn write_update(&mut self, update: &UpdateStatement) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(Token::expression(update.keyword.as_str()))
            .append(Token::expression(update.entity.as_str()));
        if let Some(alias) = &update.alias {
            builder.append(write_alias(alias));
        }
        builder.append(Token::expression(update.set_keyword.as_str()));
        let assignments = concat(
            &update.assignments,
            |assignment| {
                let mut builder = RendererBuilder::new();
                builder
                    .append_expression(self.write_expr(&assignment.target))
                    .append(Token::expression("="))
                    .append_expression(self.write_expr(&assignment.value));
                builder.into_renderer()
            },
            &TOKEN_COMMA,
        );
        builder.append(assignments);
        if let Some(condition) = &update.where_clause {
            builder.append_expression(self.write_condition(condition));
        }
        builder.into_renderer()
    }

    fn write_delete(&mut self, delete: &DeleteStatement) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(Token::expression(delete.keyword.as_str()))
            .append(Token::expression(delete.entity.as_str()));
        if let Some(alias) = &delete.alias {
            builder.append(write_alias(alias));
        }
        if let Some(condition) = &delete.where_clause {
            builder.append_expression(self.write_condition(condition));
        }
        builder.into_renderer()
    }

    fn write_insert(&mut self, insert: &InsertStatement) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(Token::expression(insert.keyword.as_str()))
            .append(Token::expression(insert.entity.as_str()));
        if !insert.columns.is_empty() {
            let columns = concat(
                &insert.columns,
                |column| Token::expression(column.as_str()).into(),
                &TOKEN_COMMA,
            );
            builder
                .append(TOKEN_OPEN_PAREN)
                .append_inline(columns)
                .append(TOKEN_CLOSE_PAREN);
        }
        match &insert.source {
            InsertSource::Values { keyword, rows } => {
                builder.append(Token::expression(keyword.as_str()));
                let rows = concat(rows, |row| self.write_tuple(row), &TOKEN_COMMA);
                builder.append(rows);
            }
            InsertSource::Query(query) => {
                builder.append_expression(self.write_subquery(query));
            }
        }
        builder.into_renderer()
    }

    fn write_expressions(&mut self, exprs: &[Expr]) -> Renderer {
        concat(exprs, |expr| self.write_expr(expr), &TOKEN_COMMA)
    }

    fn write_tuple(&mut self, exprs: &[Expr]) -> Renderer {
        let mut builder = RendererBuilder::new();
        builder
            .append(TOKEN_OPEN_PAREN)
            .append_inline(self.write_expressions(exprs))
            .append(TOKEN_CLOSE_PAREN);
        builder.into_renderer()
    }

    /// Writes an expression.
    pub fn write_expr(&mut self, expr: &Expr) -> Renderer {
        let mut builder = RendererBuilder::new();
        match expr {
            Expr::Path(text) | Expr::Literal(text) | Expr::Parameter(text) => {
                builder.append(Token::expression(text.as_str()));
            }
            Expr::Star => {
                builder.append(TOKEN_STAR);
            }
            Expr::Binary { left, op, right } => {
                builder
                    .append_expression(self.write_expr(left))
                    .append(Token::expression(op.as_str()))
                    .append_expression(self.write_expr(right));
            }
            Expr::Unary { op, operand } => {
                if op.starts_with(|c: char| c.is_alphabetic()) {
                    builder
                        .append(Token::expression(op.as_str()))
                        .append_expression(self.write_expr(operand));
                } else {
                    builder
                        .append(Token::owned(op.as_str()))
                        .append(self.write_expr(operand));
                }
            }
            Expr::Function(call) => {
                let mut inner = RendererBuilder::new();
                if let Some(distinct) = &call.distinct {
                    inner.append(Token::expression(distinct.as_str()));
                }
                inner.append(self.write_expressions(&call.args));
                builder
                    .append(Token::owned(format!("{}(", call.name)))
                    .append_inline(inner)
                    .append(TOKEN_CLOSE_PAREN);
            }
            Expr::Cast {
                function,
                expr,
                keyword,
                target,
            } => {
                let mut inner = RendererBuilder::new();
                inner
                    .append_expression(self.write_expr(expr))
                    .append(Token::expression(keyword.as_str()))
                    .append(Token::expression(target.as_str()));
                builder
                    .append(Token::owned(format!("{function}(")))
                    .append_inline(inner)
                    .append(TOKEN_CLOSE_PAREN);
            }
            Expr::Constructor {
                keyword,
                class,
                args,
            } => {
                builder
                    .append(Token::expression(keyword.as_str()))
                    .append(Token::owned(format!("{class}(")))
                    .append_inline(self.write_select_items(args))
                    .append(TOKEN_CLOSE_PAREN);
            }
            Expr::Case {
                keyword,
                operand,
                whens,
                else_clause,
                end,
            } => {
                builder.append(Token::expression(keyword.as_str()));
                if let Some(operand) = operand {
                    builder.append_expression(self.write_expr(operand));
                }
                for when in whens {
                    builder
                        .append(Token::expression(when.keyword.as_str()))
                        .append_expression(self.write_expr(&when.condition))
                        .append(Token::expression(when.then_keyword.as_str()))
                        .append_expression(self.write_expr(&when.result));
                }
                if let Some(else_clause) = else_clause {
                    builder
                        .append(Token::expression(else_clause.keyword.as_str()))
                        .append_expression(self.write_expr(&else_clause.result));
                }
                builder.append(Token::expression(end.as_str()));
            }
            Expr::Subquery(query) => {
                builder.append(self.write_parenthesized_subquery(query));
            }
            Expr::Nested(inner) => {
                builder
                    .append(TOKEN_OPEN_PAREN)
                    .append_inline(self.write_expr(inner))
                    .append(TOKEN_CLOSE_PAREN);
            }
            Expr::Tuple(items) => {
                builder.append(self.write_tuple(items));
            }
            Expr::In {
                expr,
                keyword,
                list,
            } => {
                builder
                    .append_expression(self.write_expr(expr))
                    .append(Token::expression(keyword.as_str()))
                    .append_expression(self.write_expr(list));
            }
            Expr::Between {
                expr,
                keyword,
                low,
                and_keyword,
                high,
            } => {
                builder
                    .append_expression(self.write_expr(expr))
                    .append(Token::expression(keyword.as_str()))
                    .append_expression(self.write_expr(low))
                    .append(Token::expression(and_keyword.as_str()))
                    .append_expression(self.write_expr(high));
            }
            Expr::Like {
                expr,
                keyword,
                pattern,
                escape,
            } => {
                builder
                    .append_expression(self.write_expr(expr))
                    .append(Token::expression(keyword.as_str()))
                    .append_expression(self.write_expr(pattern));
                if let Some((escape_keyword, escape)) = escape {
                    builder
                        .append(Token::expression(escape_keyword.as_str()))
                        .append_expression(self.write_expr(escape));
                }
            }
            Expr::Is { expr, keyword } => {
                builder
                    .append_expression(self.write_expr(expr))
                    .append(Token::expression(keyword.as_str()));
            }
            Expr::MemberOf {
                expr,
                keyword,
                collection,
            } => {
                builder
                    .append_expression(self.write_expr(expr))
                    .append(Token::expression(keyword.as_str()))
                    .append_expression(self.write_expr(collection));
            }
            Expr::Exists { keyword, query } | Expr::Quantified { keyword, query } => {
                builder
                    .append(Token::expression(keyword.as_str()))
                    .append(self.write_parenthesized_subquery(query));
            }
        }
        builder.into_renderer()
    }
}

/// Writes `[AS] alias`.
fn write_alias(alias: &Alias) -> Renderer {
    let mut tokens = Vec::with_capacity(2);
    if let Some(keyword) = &alias.keyword {
        tokens.push(Token::expression(keyword.as_str()));
    }
    tokens.push(Token::expression(alias.name.as_str()));
    tokens.into()
}

/// Renders a statement as parsed.
#[must_use]
pub fn write_verbatim(statement: &Statement) -> Renderer {
    QueryWriter::verbatim().write_statement(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, EqlDialect, HqlDialect, JpqlDialect};
    use crate::parser::Parser;

    fn round_trip_with(dialect: &dyn Dialect, query: &str) -> String {
        let statement = Parser::new(query, dialect).parse_statement().unwrap();
        write_verbatim(&statement).render()
    }

    fn assert_round_trip(query: &str) {
        assert_eq!(round_trip_with(&JpqlDialect, query), query);
    }

    #[test]
    fn test_simple_queries_round_trip() {
        assert_round_trip("select p from Person p");
        assert_round_trip("SELECT DISTINCT p.name AS n FROM Person AS p");
        assert_round_trip("select p from Person p where p.age >= 18 and p.name like 'A%'");
        assert_round_trip("select count(p), max(p.age) from Person p group by p.city having count(p) > 1");
    }

    #[test]
    fn test_joins_round_trip() {
        assert_round_trip("select p from Person p left outer join fetch p.address a join p.roles r on r.active = true");
        assert_round_trip("select e from Employee e, in (e.phones) ph where ph.type = 'cell'");
    }

    #[test]
    fn test_expressions_round_trip() {
        assert_round_trip("select new com.example.Dto(p.name, p.age) from Person p");
        assert_round_trip("select p from Person p where p.id in (1, 2, 3) and p.age not between 1 and 5");
        assert_round_trip("select p from Person p where p.id in :ids or p.name is not null");
        assert_round_trip("select p from Person p where -p.balance > ?1 and (p.a = 1 or p.b = 2)");
        assert_round_trip("select case when p.age > 18 then 'adult' else 'minor' end from Person p");
        assert_round_trip("select p from Person p where exists (select a from Address a where a.owner = p)");
        assert_round_trip("select p from Person p where not p.active = true");
        assert_round_trip("select trim(leading 'x' from p.name), count(distinct p.city), count(*) from Person p");
        assert_round_trip("select p from Person p where :role member of p.roles and p.name like '%x' escape '!'");
        assert_round_trip("select treat(p as Employee) from Person p where cast(p.age as String) = '1'");
    }

    #[test]
    fn test_order_by_round_trip() {
        assert_round_trip("select p from Person p order by p.name desc nulls last, p.id");
        assert_round_trip("select p from Person p order by lower(p.name) asc");
    }

    #[test]
    fn test_dml_round_trip() {
        assert_round_trip("update Person p set p.name = :name, p.age = 1 where p.id = 2");
        assert_round_trip("delete from Person p where p.id = 2");
    }

    #[test]
    fn test_dialect_extensions_round_trip() {
        let union = "select p from Person p union all select q from Person q";
        assert_eq!(round_trip_with(&EqlDialect, union), union);

        for query in [
            "from Person p where p.age > 18 limit 10 offset 5",
            "from Person p select p.name",
            "select p from Person p order by p.id fetch first 10 rows only",
            "select d.name from (select p.name as name from Person p) d join Address a with a.owner = d.name",
            "insert into Person (id, name) values (1, 'a'), (2, 'b')",
            "insert into Archive (id) select p.id from Person p",
        ] {
            assert_eq!(round_trip_with(&HqlDialect, query), query);
        }
    }
}
