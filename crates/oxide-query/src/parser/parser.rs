//! Query parser implementation.

use super::error::ParseError;
use super::pratt::{infix_binding_power, prefix_binding_power};
use crate::ast::{
    Alias, Assignment, Condition, DeleteStatement, ElseClause, Expr, FromClause, FromRoot,
    FunctionCall, GroupByClause, InsertSource, InsertStatement, Join, JoinTarget, LimitClause,
    OrderByClause, Query, QueryBody, RootSource, SelectClause, SelectItem, SelectQuery, SortItem,
    Statement, UpdateStatement, WhenClause,
};
use crate::dialect::Dialect;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Query parser for the JPQL family.
///
/// Keywords and literals keep their source spelling in the produced AST.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    dialect: &'a dyn Dialect,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str, dialect: &'a dyn Dialect) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0)),
            dialect,
        }
    }

    /// Parses a complete statement. Trailing input is an error.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid statement in the
    /// parser's dialect.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) => Statement::Select(self.parse_query()?),
            TokenKind::Keyword(Keyword::From) if self.dialect.supports_from_first() => {
                Statement::Select(self.parse_query()?)
            }
            TokenKind::LeftParen if self.dialect.supports_set_operations() => {
                Statement::Select(self.parse_query()?)
            }
            TokenKind::Keyword(Keyword::Update) => {
                Statement::Update(self.parse_update_statement()?)
            }
            TokenKind::Keyword(Keyword::Delete) => {
                Statement::Delete(self.parse_delete_statement()?)
            }
            TokenKind::Keyword(Keyword::Insert) if self.dialect.supports_insert() => {
                Statement::Insert(self.parse_insert_statement()?)
            }
            _ => return Err(self.unexpected("SELECT, UPDATE, or DELETE")),
        };

        if !self.current.is_eof() {
            return Err(self.unexpected("end of input"));
        }
        Ok(statement)
    }

    /// Parses a single ORDER BY expression, such as a qualified sort
    /// property. Directions, commas and trailing input are errors.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not exactly one expression.
    pub fn parse_sort_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression(0)?;
        if !self.current.is_eof() {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    /// Parses a query: a body, optionally combined with set operators,
    /// followed by ORDER BY and row limiting clauses.
    fn parse_query(&mut self) -> Result<Query, ParseError> {
        let mut body = self.parse_query_primary()?;

        while self.dialect.supports_set_operations() && self.is_set_operator() {
            let mut operator = self.take();
            if let Some(quantifier) = self
                .take_if(Keyword::All)
                .or_else(|| self.take_if(Keyword::Distinct))
            {
                push_word(&mut operator, &quantifier);
            }
            let right = self.parse_query_primary()?;
            body = QueryBody::SetOperation {
                left: Box::new(body),
                operator,
                right: Box::new(right),
            };
        }

        let order_by = if self.check_keyword(Keyword::Order) {
            Some(self.parse_order_by()?)
        } else {
            None
        };

        let limits = if self.dialect.supports_limit_offset() {
            self.parse_limits()?
        } else {
            vec![]
        };

        Ok(Query {
            body,
            order_by,
            limits,
        })
    }

    fn parse_query_primary(&mut self) -> Result<QueryBody, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(QueryBody::Nested(Box::new(query)));
        }
        Ok(QueryBody::Select(Box::new(self.parse_select_query()?)))
    }

    fn is_set_operator(&self) -> bool {
        matches!(
            self.current.as_keyword(),
            Some(Keyword::Union | Keyword::Intersect | Keyword::Except)
        )
    }

    /// Parses a single query specification.
    fn parse_select_query(&mut self) -> Result<SelectQuery, ParseError> {
        let mut select = None;
        if self.check_keyword(Keyword::Select) {
            select = Some(self.parse_select_clause()?);
        } else if !(self.dialect.supports_from_first() && self.check_keyword(Keyword::From)) {
            return Err(self.unexpected("SELECT"));
        }
        let select_first = select.is_some();

        // FROM clause (HQL allows SELECT without FROM)
        let from = if self.check_keyword(Keyword::From) {
            Some(self.parse_from_clause()?)
        } else if select.is_some() && self.dialect.supports_select_without_from() {
            None
        } else {
            return Err(self.unexpected("FROM"));
        };

        let where_clause = self.parse_condition(Keyword::Where)?;

        let group_by = if self.check_keyword(Keyword::Group) {
            let mut keyword = self.take();
            push_word(&mut keyword, &self.expect_keyword(Keyword::By)?);
            let items = self.parse_expression_list()?;
            Some(GroupByClause { keyword, items })
        } else {
            None
        };

        let having = self.parse_condition(Keyword::Having)?;

        // A FROM-first query may carry its SELECT clause at the end
        if select.is_none() && self.check_keyword(Keyword::Select) {
            select = Some(self.parse_select_clause()?);
        }

        Ok(SelectQuery {
            select,
            from,
            where_clause,
            group_by,
            having,
            select_first,
        })
    }

    fn parse_select_clause(&mut self) -> Result<SelectClause, ParseError> {
        let keyword = self.expect_keyword(Keyword::Select)?;
        let distinct = self.take_if(Keyword::Distinct);
        let items = self.parse_select_items()?;
        Ok(SelectClause {
            keyword,
            distinct,
            items,
        })
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expression(0)?;
            let alias = self.parse_optional_alias()?;
            items.push(SelectItem { expr, alias });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Parses an optional alias, with or without `AS`.
    fn parse_optional_alias(&mut self) -> Result<Option<Alias>, ParseError> {
        if let Some(keyword) = self.take_if(Keyword::As) {
            let name = self.expect_identifier()?;
            Ok(Some(Alias {
                keyword: Some(keyword),
                name,
            }))
        } else if self.is_alias_candidate() {
            Ok(Some(Alias::bare(self.take())))
        } else {
            Ok(None)
        }
    }

    fn is_alias_candidate(&self) -> bool {
        match &self.current.kind {
            TokenKind::Identifier(_) => true,
            TokenKind::Keyword(kw) => kw.can_be_alias(),
            _ => false,
        }
    }

    fn parse_from_clause(&mut self) -> Result<FromClause, ParseError> {
        let keyword = self.expect_keyword(Keyword::From)?;
        let mut roots = vec![self.parse_from_root()?];
        while self.eat(&TokenKind::Comma) {
            roots.push(self.parse_from_root()?);
        }
        Ok(FromClause { keyword, roots })
    }

    fn parse_from_root(&mut self) -> Result<FromRoot, ParseError> {
        let source = if self.check_keyword(Keyword::In) {
            // Collection member declaration: IN (e.phones) p
            let keyword = self.take();
            self.expect(&TokenKind::LeftParen)?;
            let path = self.parse_expression(0)?;
            self.expect(&TokenKind::RightParen)?;
            RootSource::Collection { keyword, path }
        } else if self.is_derived_start() {
            let lateral = self.take_if(Keyword::Lateral);
            let query = self.parse_parenthesized_query()?;
            RootSource::Subquery {
                lateral,
                query: Box::new(query),
            }
        } else {
            RootSource::Entity(self.parse_dotted_name()?)
        };

        let alias = self.parse_optional_alias()?;

        let mut joins = Vec::new();
        while self.is_join_keyword() {
            joins.push(self.parse_join()?);
        }

        Ok(FromRoot {
            source,
            alias,
            joins,
        })
    }

    fn is_derived_start(&self) -> bool {
        self.dialect.supports_derived_roots()
            && (self.check(&TokenKind::LeftParen) || self.check_keyword(Keyword::Lateral))
    }

    fn is_join_keyword(&self) -> bool {
        matches!(
            self.current.as_keyword(),
            Some(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
            )
        )
    }

    fn parse_join(&mut self) -> Result<Join, ParseError> {
        let first = self.current.as_keyword();
        let mut keyword = self.take();
        if first != Some(Keyword::Join) {
            if let Some(outer) = self.take_if(Keyword::Outer) {
                push_word(&mut keyword, &outer);
            }
            push_word(&mut keyword, &self.expect_keyword(Keyword::Join)?);
        }

        let fetch = self.take_if(Keyword::Fetch);

        let target = if self.is_derived_start() {
            let lateral = self.take_if(Keyword::Lateral);
            let query = self.parse_parenthesized_query()?;
            JoinTarget::Subquery {
                lateral,
                query: Box::new(query),
            }
        } else {
            JoinTarget::Path(self.parse_primary()?)
        };

        let alias = self.parse_optional_alias()?;

        let condition = if self.check_keyword(Keyword::On)
            || (self.dialect.supports_join_with() && self.check_keyword(Keyword::With))
        {
            let keyword = self.take();
            let expr = self.parse_expression(0)?;
            Some(Condition { keyword, expr })
        } else {
            None
        };

        Ok(Join {
            keyword,
            fetch,
            target,
            alias,
            condition,
        })
    }

    /// Parses `keyword expr` if the current token is `keyword`.
    fn parse_condition(&mut self, keyword: Keyword) -> Result<Option<Condition>, ParseError> {
        let Some(keyword) = self.take_if(keyword) else {
            return Ok(None);
        };
        let expr = self.parse_expression(0)?;
        Ok(Some(Condition { keyword, expr }))
    }

    fn parse_order_by(&mut self) -> Result<OrderByClause, ParseError> {
        let mut keyword = self.expect_keyword(Keyword::Order)?;
        push_word(&mut keyword, &self.expect_keyword(Keyword::By)?);

        let mut items = Vec::new();
        loop {
            let expr = self.parse_expression(0)?;
            let direction = self
                .take_if(Keyword::Asc)
                .or_else(|| self.take_if(Keyword::Desc));
            let nulls = if self.check_keyword(Keyword::Nulls) {
                let mut nulls = self.take();
                match self.current.as_keyword() {
                    Some(Keyword::First | Keyword::Last) => push_word(&mut nulls, &self.take()),
                    _ => return Err(self.unexpected("FIRST or LAST")),
                }
                Some(nulls)
            } else {
                None
            };
            items.push(SortItem {
                expr,
                direction,
                nulls,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(OrderByClause { keyword, items })
    }

    /// Parses `LIMIT`, `OFFSET` and `FETCH` clauses in any order.
    fn parse_limits(&mut self) -> Result<Vec<LimitClause>, ParseError> {
        let mut limits = Vec::new();
        loop {
            if let Some(keyword) = self.take_if(Keyword::Limit) {
                let expr = self.parse_expression(0)?;
                limits.push(LimitClause {
                    keyword,
                    expr,
                    suffix: None,
                });
            } else if let Some(keyword) = self.take_if(Keyword::Offset) {
                let expr = self.parse_expression(0)?;
                let suffix = self
                    .take_if(Keyword::Rows)
                    .or_else(|| self.take_if(Keyword::Row));
                limits.push(LimitClause {
                    keyword,
                    expr,
                    suffix,
                });
            } else if self.check_keyword(Keyword::Fetch) {
                let mut keyword = self.take();
                match self.current.as_keyword() {
                    Some(Keyword::First | Keyword::Next) => push_word(&mut keyword, &self.take()),
                    _ => return Err(self.unexpected("FIRST or NEXT")),
                }
                let expr = self.parse_expression(0)?;

                let mut suffix = self
                    .take_if(Keyword::Rows)
                    .or_else(|| self.take_if(Keyword::Row))
                    .unwrap_or_default();
                if let Some(only) = self.take_if(Keyword::Only) {
                    push_word(&mut suffix, &only);
                } else if let Some(with) = self.take_if(Keyword::With) {
                    push_word(&mut suffix, &with);
                    push_word(&mut suffix, &self.expect_keyword(Keyword::Ties)?);
                }
                limits.push(LimitClause {
                    keyword,
                    expr,
                    suffix: (!suffix.is_empty()).then_some(suffix),
                });
            } else {
                break;
            }
        }
        Ok(limits)
    }

    /// Parses an UPDATE statement.
    fn parse_update_statement(&mut self) -> Result<UpdateStatement, ParseError> {
        let keyword = self.expect_keyword(Keyword::Update)?;
        let entity = self.parse_dotted_name()?;
        let alias = self.parse_optional_alias()?;
        let set_keyword = self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let target = self.parse_primary()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression(0)?;
            assignments.push(Assignment { target, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let where_clause = self.parse_condition(Keyword::Where)?;

        Ok(UpdateStatement {
            keyword,
            entity,
            alias,
            set_keyword,
            assignments,
            where_clause,
        })
    }

    /// Parses a DELETE statement. `FROM` is optional where FROM-first
    /// queries are accepted.
    fn parse_delete_statement(&mut self) -> Result<DeleteStatement, ParseError> {
        let mut keyword = self.expect_keyword(Keyword::Delete)?;
        if let Some(from) = self.take_if(Keyword::From) {
            push_word(&mut keyword, &from);
        } else if !self.dialect.supports_from_first() {
            return Err(self.unexpected("FROM"));
        }
        let entity = self.parse_dotted_name()?;
        let alias = self.parse_optional_alias()?;
        let where_clause = self.parse_condition(Keyword::Where)?;

        Ok(DeleteStatement {
            keyword,
            entity,
            alias,
            where_clause,
        })
    }

    /// Parses an INSERT statement.
    fn parse_insert_statement(&mut self) -> Result<InsertStatement, ParseError> {
        let mut keyword = self.expect_keyword(Keyword::Insert)?;
        if let Some(into) = self.take_if(Keyword::Into) {
            push_word(&mut keyword, &into);
        }
        let entity = self.parse_dotted_name()?;

        let mut columns = Vec::new();
        if self.eat(&TokenKind::LeftParen) {
            loop {
                columns.push(self.parse_dotted_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
        }

        let source = if let Some(values) = self.take_if(Keyword::Values) {
            let mut rows = Vec::new();
            loop {
                self.expect(&TokenKind::LeftParen)?;
                rows.push(self.parse_expression_list()?);
                self.expect(&TokenKind::RightParen)?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            InsertSource::Values {
                keyword: values,
                rows,
            }
        } else {
            InsertSource::Query(Box::new(self.parse_query()?))
        };

        Ok(InsertStatement {
            keyword,
            entity,
            columns,
            source,
        })
    }

    /// Parses an expression using Pratt parsing.
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((l_bp, r_bp)) = infix_binding_power(&self.current.kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            match self.current.as_keyword() {
                Some(Keyword::Not) => {
                    // Only a negated predicate continues the expression
                    if !matches!(
                        self.peek_kind(),
                        TokenKind::Keyword(
                            Keyword::In
                                | Keyword::Like
                                | Keyword::Ilike
                                | Keyword::Between
                                | Keyword::Member
                        )
                    ) {
                        break;
                    }
                    let not = self.take();
                    lhs = self.parse_predicate(lhs, Some(not), r_bp)?;
                }
                Some(Keyword::Is) => lhs = self.parse_is(lhs, r_bp)?,
                Some(
                    Keyword::In | Keyword::Like | Keyword::Ilike | Keyword::Between | Keyword::Member,
                ) => lhs = self.parse_predicate(lhs, None, r_bp)?,
                _ => {
                    let op = self.take();
                    let rhs = self.parse_expression(r_bp)?;
                    lhs = Expr::Binary {
                        left: Box::new(lhs),
                        op,
                        right: Box::new(rhs),
                    };
                }
            }
        }

        Ok(lhs)
    }

    /// Parses IN, BETWEEN, LIKE and MEMBER OF, optionally negated.
    fn parse_predicate(
        &mut self,
        lhs: Expr,
        not: Option<String>,
        r_bp: u8,
    ) -> Result<Expr, ParseError> {
        let mut keyword = not.unwrap_or_default();
        let expr = Box::new(lhs);
        match self.current.as_keyword() {
            Some(Keyword::In) => {
                push_word(&mut keyword, &self.take());
                let list = Box::new(self.parse_in_list()?);
                Ok(Expr::In {
                    expr,
                    keyword,
                    list,
                })
            }
            Some(Keyword::Between) => {
                push_word(&mut keyword, &self.take());
                let low = Box::new(self.parse_expression(r_bp)?);
                let and_keyword = self.expect_keyword(Keyword::And)?;
                let high = Box::new(self.parse_expression(r_bp)?);
                Ok(Expr::Between {
                    expr,
                    keyword,
                    low,
                    and_keyword,
                    high,
                })
            }
            Some(Keyword::Like | Keyword::Ilike) => {
                push_word(&mut keyword, &self.take());
                let pattern = Box::new(self.parse_expression(r_bp)?);
                let escape = match self.take_if(Keyword::Escape) {
                    Some(escape) => Some((escape, Box::new(self.parse_expression(r_bp)?))),
                    None => None,
                };
                Ok(Expr::Like {
                    expr,
                    keyword,
                    pattern,
                    escape,
                })
            }
            Some(Keyword::Member) => {
                push_word(&mut keyword, &self.take());
                if let Some(of) = self.take_if(Keyword::Of) {
                    push_word(&mut keyword, &of);
                }
                let collection = Box::new(self.parse_expression(r_bp)?);
                Ok(Expr::MemberOf {
                    expr,
                    keyword,
                    collection,
                })
            }
            _ => Err(self.unexpected("IN, BETWEEN, LIKE, or MEMBER")),
        }
    }

    /// Parses the right-hand side of IN: a list, a sub-query, a parameter
    /// or a collection path.
    fn parse_in_list(&mut self) -> Result<Expr, ParseError> {
        if !self.eat(&TokenKind::LeftParen) {
            return self.parse_primary();
        }
        if self.is_query_start() {
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(Expr::Subquery(Box::new(query)));
        }
        let list = self.parse_expression_list()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Tuple(list))
    }

    /// Parses `IS [NOT] NULL|EMPTY|TRUE|FALSE` and `IS [NOT] DISTINCT FROM`.
    fn parse_is(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr, ParseError> {
        let mut keyword = self.take();
        if let Some(not) = self.take_if(Keyword::Not) {
            push_word(&mut keyword, &not);
        }
        match self.current.as_keyword() {
            Some(Keyword::Null | Keyword::Empty | Keyword::True | Keyword::False) => {
                push_word(&mut keyword, &self.take());
                Ok(Expr::Is {
                    expr: Box::new(lhs),
                    keyword,
                })
            }
            Some(Keyword::Distinct) => {
                push_word(&mut keyword, &self.take());
                push_word(&mut keyword, &self.expect_keyword(Keyword::From)?);
                let rhs = self.parse_expression(r_bp)?;
                Ok(Expr::Binary {
                    left: Box::new(lhs),
                    op: keyword,
                    right: Box::new(rhs),
                })
            }
            _ => Err(self.unexpected("NULL, EMPTY, TRUE, FALSE, or DISTINCT FROM")),
        }
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some(bp) = prefix_binding_power(&self.current.kind) {
            let op = self.take();
            let operand = self.parse_expression(bp)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current.kind {
            // Literals
            TokenKind::Number
            | TokenKind::String
            | TokenKind::Keyword(Keyword::True | Keyword::False | Keyword::Null) => {
                Ok(Expr::Literal(self.take()))
            }

            // Named parameter :name
            TokenKind::Colon => {
                self.advance();
                if !self.previous.span.touches(self.current.span) {
                    return Err(self.unexpected("parameter name"));
                }
                let name = self.expect_name_segment()?;
                Ok(Expr::Parameter(format!(":{name}")))
            }

            // Positional parameter ? or ?1
            TokenKind::Question => {
                self.advance();
                if self.check(&TokenKind::Number) && self.previous.span.touches(self.current.span)
                {
                    Ok(Expr::Parameter(format!("?{}", self.take())))
                } else {
                    Ok(Expr::Parameter(String::from("?")))
                }
            }

            TokenKind::Star => {
                self.advance();
                Ok(Expr::Star)
            }

            // Sub-query, tuple or parenthesized expression
            TokenKind::LeftParen => {
                self.advance();
                if self.is_query_start() {
                    let query = self.parse_query()?;
                    self.expect(&TokenKind::RightParen)?;
                    return Ok(Expr::Subquery(Box::new(query)));
                }
                let first = self.parse_expression(0)?;
                if self.eat(&TokenKind::Comma) {
                    let mut items = vec![first];
                    items.extend(self.parse_expression_list()?);
                    self.expect(&TokenKind::RightParen)?;
                    return Ok(Expr::Tuple(items));
                }
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Nested(Box::new(first)))
            }

            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),

            TokenKind::Keyword(Keyword::Exists) => {
                let keyword = self.take();
                let query = Box::new(self.parse_parenthesized_query()?);
                Ok(Expr::Exists { keyword, query })
            }

            TokenKind::Keyword(Keyword::All | Keyword::Any | Keyword::Some)
                if self.peek_kind() == TokenKind::LeftParen =>
            {
                let keyword = self.take();
                let query = Box::new(self.parse_parenthesized_query()?);
                Ok(Expr::Quantified { keyword, query })
            }

            TokenKind::Keyword(Keyword::New) => self.parse_constructor_expression(),

            TokenKind::Keyword(Keyword::Cast | Keyword::Treat) => self.parse_cast_expression(),

            // left() and right() string functions
            TokenKind::Keyword(Keyword::Left | Keyword::Right)
                if self.peek_kind() == TokenKind::LeftParen =>
            {
                let name = self.take();
                self.parse_function_call(name)
            }

            TokenKind::Identifier(_) => self.parse_path_or_function(),
            TokenKind::Keyword(kw) if kw.is_soft() || kw.can_be_alias() => {
                self.parse_path_or_function()
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_path_or_function(&mut self) -> Result<Expr, ParseError> {
        let mut path = self.take();
        if self.check(&TokenKind::LeftParen) {
            return self.parse_function_call(path);
        }
        while self.eat(&TokenKind::Dot) {
            path.push('.');
            path.push_str(&self.expect_name_segment()?);
        }
        Ok(Expr::Path(path))
    }

    /// Parses a function call's argument list.
    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let distinct = self.take_if(Keyword::Distinct);

        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_function_argument()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Function(FunctionCall {
            name,
            distinct,
            args,
        }))
    }

    /// Parses a function argument, including the `FROM` forms of `trim` and
    /// `extract` and the `LEADING`/`TRAILING`/`BOTH` trim specifications.
    fn parse_function_argument(&mut self) -> Result<Expr, ParseError> {
        if self.is_trim_specification() {
            let mut op = self.take();
            if let Some(from) = self.take_if(Keyword::From) {
                push_word(&mut op, &from);
                let operand = self.parse_expression(0)?;
                return Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                });
            }
            let operand = self.parse_function_argument()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        let expr = self.parse_expression(0)?;
        if let Some(from) = self.take_if(Keyword::From) {
            let source = self.parse_expression(0)?;
            return Ok(Expr::Binary {
                left: Box::new(expr),
                op: from,
                right: Box::new(source),
            });
        }
        Ok(expr)
    }

    fn is_trim_specification(&self) -> bool {
        let TokenKind::Identifier(word) = &self.current.kind else {
            return false;
        };
        ["leading", "trailing", "both"]
            .iter()
            .any(|spec| word.eq_ignore_ascii_case(spec))
            && !matches!(
                self.peek_kind(),
                TokenKind::LeftParen | TokenKind::Dot | TokenKind::Comma | TokenKind::RightParen
            )
    }

    /// Parses `CAST(expr AS type)` or `TREAT(path AS Subtype)`.
    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        let function = self.take();
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        let keyword = self.expect_keyword(Keyword::As)?;
        let target = self.parse_type_name()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Cast {
            function,
            expr: Box::new(expr),
            keyword,
            target,
        })
    }

    /// Parses a type name with optional length or precision, e.g.
    /// `String` or `varchar(20)`.
    fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.parse_dotted_name()?;
        if self.check(&TokenKind::LeftParen) {
            let start = self.current.span.start;
            while !self.check(&TokenKind::RightParen) {
                if self.current.is_eof() {
                    return Err(self.unexpected("')'"));
                }
                self.advance();
            }
            let end = self.current.span.end;
            self.advance();
            name.push_str(Span::new(start, end).source(self.input));
        }
        Ok(name)
    }

    /// Parses `NEW com.example.Dto(items)`.
    fn parse_constructor_expression(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.take();
        let class = self.parse_dotted_name()?;
        self.expect(&TokenKind::LeftParen)?;
        let args = self.parse_select_items()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Constructor {
            keyword,
            class,
            args,
        })
    }

    /// Parses a CASE expression.
    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        let keyword = self.take();

        // Simple CASE has an operand
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut whens = Vec::new();
        while let Some(when) = self.take_if(Keyword::When) {
            let condition = self.parse_expression(0)?;
            let then_keyword = self.expect_keyword(Keyword::Then)?;
            let result = self.parse_expression(0)?;
            whens.push(WhenClause {
                keyword: when,
                condition,
                then_keyword,
                result,
            });
        }
        if whens.is_empty() {
            return Err(self.unexpected("WHEN"));
        }

        let else_clause = match self.take_if(Keyword::Else) {
            Some(keyword) => Some(ElseClause {
                keyword,
                result: Box::new(self.parse_expression(0)?),
            }),
            None => None,
        };

        let end = self.expect_keyword(Keyword::End)?;

        Ok(Expr::Case {
            keyword,
            operand,
            whens,
            else_clause,
            end,
        })
    }

    fn parse_parenthesized_query(&mut self) -> Result<Query, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let query = self.parse_query()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(query)
    }

    /// Parses a comma-separated list of expressions.
    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expression(0)?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expression(0)?);
        }
        Ok(exprs)
    }

    /// Parses a possibly qualified name such as `com.example.Person`. Entity
    /// and class names may be keywords, as in `from Order o`.
    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_name_segment()?;
        while self.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_name_segment()?);
        }
        Ok(name)
    }

    // --- Helper methods ---

    /// Advances to the next token.
    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Returns the kind of the token after the current one.
    fn peek_kind(&self) -> TokenKind {
        self.lexer.clone().next_token().kind
    }

    /// Returns the source spelling of the current token and advances.
    fn take(&mut self) -> String {
        let text = self.current.span.source(self.input).to_string();
        self.advance();
        text
    }

    /// Takes the current token if it is the given keyword.
    fn take_if(&mut self, keyword: Keyword) -> Option<String> {
        self.check_keyword(keyword).then(|| self.take())
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Consumes the current token if it matches the given kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        let matched = self.check(kind);
        if matched {
            self.advance();
        }
        matched
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("{kind:?}")))
        }
    }

    /// Expects the current token to be the given keyword and returns its
    /// source spelling.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<String, ParseError> {
        self.take_if(keyword)
            .ok_or_else(|| self.unexpected(keyword.as_str()))
    }

    /// Returns true if the current token starts a nested query.
    fn is_query_start(&self) -> bool {
        self.check_keyword(Keyword::Select)
            || (self.dialect.supports_from_first() && self.check_keyword(Keyword::From))
    }

    /// Expects and returns an identifier. Soft keywords and keywords usable
    /// as variables count as identifiers.
    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(_) => Ok(self.take()),
            TokenKind::Keyword(kw) if kw.is_soft() || kw.can_be_alias() => Ok(self.take()),
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Expects a path segment after a dot, where any keyword is allowed.
    fn expect_name_segment(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(_) | TokenKind::Keyword(_) => Ok(self.take()),
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Builds an error for the current token.
    fn unexpected(&self, expected: &str) -> ParseError {
        match &self.current.kind {
            TokenKind::Eof => ParseError::unexpected_eof(expected, self.current.span),
            TokenKind::Error(message) => ParseError::new(message.clone(), self.current.span),
            kind => ParseError::unexpected(expected, kind.clone(), self.current.span),
        }
    }
}

/// Appends a keyword to a keyword phrase, separated by a single space.
fn push_word(phrase: &mut String, word: &str) {
    if !phrase.is_empty() {
        phrase.push(' ');
    }
    phrase.push_str(word);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{EqlDialect, HqlDialect, JpqlDialect};

    fn parse(query: &str) -> Result<Statement, ParseError> {
        Parser::new(query, &JpqlDialect).parse_statement()
    }

    fn parse_hql(query: &str) -> Result<Statement, ParseError> {
        Parser::new(query, &HqlDialect).parse_statement()
    }

    fn select(statement: &Statement) -> &SelectQuery {
        match statement {
            Statement::Select(query) => query.body.first_select(),
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_select() {
        let stmt = parse("select p from Person p").unwrap();
        let query = select(&stmt);
        let from = query.from.as_ref().unwrap();
        assert_eq!(from.roots[0].source, RootSource::Entity(String::from("Person")));
        assert_eq!(from.roots[0].alias, Some(Alias::bare("p")));
        assert!(query.select_first);
    }

    #[test]
    fn test_keywords_keep_source_spelling() {
        let stmt = parse("SeLeCt DISTINCT p FROM Person AS p").unwrap();
        let query = select(&stmt);
        let clause = query.select.as_ref().unwrap();
        assert_eq!(clause.keyword, "SeLeCt");
        assert_eq!(clause.distinct.as_deref(), Some("DISTINCT"));
        let alias = query.from.as_ref().unwrap().roots[0].alias.as_ref().unwrap();
        assert_eq!(alias.keyword.as_deref(), Some("AS"));
    }

    #[test]
    fn test_select_with_joins() {
        let stmt =
            parse("select p from Person p left outer join fetch p.address a join p.roles r")
                .unwrap();
        let joins = &select(&stmt).from.as_ref().unwrap().roots[0].joins;
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].keyword, "left outer join");
        assert_eq!(joins[0].fetch.as_deref(), Some("fetch"));
        assert_eq!(joins[0].alias, Some(Alias::bare("a")));
        assert_eq!(joins[1].keyword, "join");
    }

    #[test]
    fn test_expression_precedence() {
        let stmt = parse("select p from Person p where p.a = 1 or p.b = 2 and p.c = 3").unwrap();
        let condition = select(&stmt).where_clause.as_ref().unwrap();
        // OR at the top, AND nested on the right
        match &condition.expr {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, "or");
                assert!(matches!(right.as_ref(), Expr::Binary { op, .. } if op == "and"));
            }
            other => panic!("Expected binary OR, got {other:?}"),
        }
    }

    #[test]
    fn test_negated_predicates() {
        let stmt = parse(
            "select p from Person p where p.id not in :ids and p.name not like 'A%' \
             and p.age not between 1 and 5 and :r not member of p.roles",
        )
        .unwrap();
        let condition = select(&stmt).where_clause.as_ref().unwrap();
        assert!(condition.expr.any(&|e| matches!(e, Expr::In { keyword, .. } if keyword == "not in")));
        assert!(condition.expr.any(&|e| matches!(e, Expr::Like { keyword, .. } if keyword == "not like")));
        assert!(condition
            .expr
            .any(&|e| matches!(e, Expr::Between { keyword, .. } if keyword == "not between")));
        assert!(condition
            .expr
            .any(&|e| matches!(e, Expr::MemberOf { keyword, .. } if keyword == "not member of")));
    }

    #[test]
    fn test_is_predicates() {
        let stmt =
            parse("select p from Person p where p.name is not null and p.roles is empty").unwrap();
        let condition = select(&stmt).where_clause.as_ref().unwrap();
        assert!(condition
            .expr
            .any(&|e| matches!(e, Expr::Is { keyword, .. } if keyword == "is not null")));
        assert!(condition
            .expr
            .any(&|e| matches!(e, Expr::Is { keyword, .. } if keyword == "is empty")));
    }

    #[test]
    fn test_parameters() {
        let stmt = parse("select p from Person p where p.a = :name and p.b = ?1 and p.c = ?")
            .unwrap();
        let condition = select(&stmt).where_clause.as_ref().unwrap();
        for expected in [":name", "?1", "?"] {
            assert!(condition
                .expr
                .any(&|e| matches!(e, Expr::Parameter(p) if p == expected)));
        }
    }

    #[test]
    fn test_detached_colon_is_an_error() {
        assert!(parse("select p from Person p where p.a = : name").is_err());
    }

    #[test]
    fn test_constructor_expression() {
        let stmt =
            parse("select new com.example.Dto(p.name, p.age) from Person p").unwrap();
        let item = &select(&stmt).select.as_ref().unwrap().items[0];
        match &item.expr {
            Expr::Constructor { class, args, .. } => {
                assert_eq!(class, "com.example.Dto");
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected constructor, got {other:?}"),
        }
    }

    #[test]
    fn test_case_expression() {
        let stmt = parse(
            "select case when p.age > 18 then 'adult' else 'minor' end from Person p",
        )
        .unwrap();
        let item = &select(&stmt).select.as_ref().unwrap().items[0];
        assert!(matches!(&item.expr, Expr::Case { whens, else_clause: Some(_), .. } if whens.len() == 1));
    }

    #[test]
    fn test_functions() {
        let stmt = parse(
            "select count(distinct p), trim(leading 'x' from p.name), upper(p.name) \
             from Person p",
        )
        .unwrap();
        let items = &select(&stmt).select.as_ref().unwrap().items;
        assert!(matches!(&items[0].expr, Expr::Function(f) if f.distinct.is_some()));
        assert!(matches!(&items[1].expr, Expr::Function(f) if f.args.len() == 1));
        assert!(matches!(&items[2].expr, Expr::Function(f) if f.name == "upper"));
    }

    #[test]
    fn test_subqueries() {
        let stmt = parse(
            "select p from Person p where exists (select a from Address a where a.owner = p) \
             and p.age > all (select q.age from Person q)",
        )
        .unwrap();
        let condition = select(&stmt).where_clause.as_ref().unwrap();
        assert!(condition.expr.any(&|e| matches!(e, Expr::Exists { .. })));
        assert!(condition.expr.any(&|e| matches!(e, Expr::Quantified { .. })));
    }

    #[test]
    fn test_order_by() {
        let stmt = parse("select p from Person p order by p.name desc nulls last, p.id").unwrap();
        let Statement::Select(query) = stmt else {
            panic!("Expected SELECT");
        };
        let order_by = query.order_by.unwrap();
        assert_eq!(order_by.items.len(), 2);
        assert_eq!(order_by.items[0].direction.as_deref(), Some("desc"));
        assert_eq!(order_by.items[0].nulls.as_deref(), Some("nulls last"));
        assert_eq!(order_by.items[1].direction, None);
    }

    #[test]
    fn test_update_and_delete() {
        let update = parse("update Person p set p.name = :name where p.id = 1").unwrap();
        assert!(matches!(update, Statement::Update(ref u) if u.assignments.len() == 1));
        let delete = parse("delete from Person p where p.id = 1").unwrap();
        assert!(matches!(delete, Statement::Delete(ref d) if d.alias == Some(Alias::bare("p"))));
    }

    #[test]
    fn test_keywords_as_entity_names() {
        let stmt = parse("select o from Order o where o.total > 100").unwrap();
        let root = &select(&stmt).from.as_ref().unwrap().roots[0];
        assert_eq!(root.source, RootSource::Entity(String::from("Order")));
        assert_eq!(root.alias, Some(Alias::bare("o")));

        let update = parse("update Set s set s.value = 1").unwrap();
        assert!(matches!(update, Statement::Update(ref u) if u.entity == "Set"));
        let delete = parse("delete from Group g where g.id = 1").unwrap();
        assert!(matches!(delete, Statement::Delete(ref d) if d.entity == "Group"));
        let stmt = parse_hql("from Member m").unwrap();
        assert_eq!(
            select(&stmt).from.as_ref().unwrap().roots[0].source,
            RootSource::Entity(String::from("Member"))
        );

        let stmt = parse("select new com.x.Order(p.name) from Person p").unwrap();
        assert!(matches!(
            &select(&stmt).select.as_ref().unwrap().items[0].expr,
            Expr::Constructor { class, .. } if class == "com.x.Order"
        ));
    }

    #[test]
    fn test_keywords_as_variables() {
        let stmt = parse("select some.name from Person some where some.age > 18").unwrap();
        let query = select(&stmt);
        assert_eq!(
            query.from.as_ref().unwrap().roots[0].alias,
            Some(Alias::bare("some"))
        );
        assert_eq!(
            query.select.as_ref().unwrap().items[0].expr,
            Expr::Path(String::from("some.name"))
        );
        // Clause keywords still end the root
        let stmt = parse("select p from Order where p.id = 1").unwrap();
        assert_eq!(select(&stmt).from.as_ref().unwrap().roots[0].alias, None);
    }

    #[test]
    fn test_hql_from_first_subquery_in_list() {
        let stmt = parse_hql("from Person p where p.id in (from Person q where q.age > 18)").unwrap();
        let condition = select(&stmt).where_clause.as_ref().unwrap();
        assert!(condition.expr.any(&|e| matches!(e, Expr::Subquery(_))));
        // JPQL sub-queries still need SELECT
        assert!(parse("select p from Person p where p.id in (from Person q)").is_err());
    }

    #[test]
    fn test_select_without_projection_is_an_error() {
        let err = parse("select from Person p").unwrap_err();
        assert_eq!(err.expected.as_deref(), Some("expression"));
    }

    #[test]
    fn test_trailing_input_is_an_error() {
        let err = parse("select p from Person p p").unwrap_err();
        assert_eq!(err.expected.as_deref(), Some("end of input"));
    }

    #[test]
    fn test_jpql_rejects_vendor_extensions() {
        assert!(parse("from Person p").is_err());
        assert!(parse("select p from Person p union select q from Person q").is_err());
        assert!(parse("select p from Person p limit 10").is_err());
        assert!(parse("insert into Person (name) values ('x')").is_err());
    }

    #[test]
    fn test_eql_set_operations() {
        let stmt = Parser::new(
            "select p from Person p union all select q from Person q",
            &EqlDialect,
        )
        .parse_statement()
        .unwrap();
        let Statement::Select(query) = stmt else {
            panic!("Expected SELECT");
        };
        assert!(matches!(query.body, QueryBody::SetOperation { ref operator, .. } if operator == "union all"));
    }

    #[test]
    fn test_hql_from_first_and_limits() {
        let stmt = parse_hql("from Person p where p.age > 18 limit 10 offset 5").unwrap();
        let Statement::Select(query) = stmt else {
            panic!("Expected SELECT");
        };
        assert!(query.body.first_select().select.is_none());
        assert_eq!(query.limits.len(), 2);

        let stmt = parse_hql("from Person p select p.name").unwrap();
        let query = select(&stmt);
        assert!(query.select.is_some());
        assert!(!query.select_first);
    }

    #[test]
    fn test_hql_fetch_first() {
        let stmt =
            parse_hql("select p from Person p order by p.id fetch first 10 rows only").unwrap();
        let Statement::Select(query) = stmt else {
            panic!("Expected SELECT");
        };
        assert_eq!(query.limits[0].keyword, "fetch first");
        assert_eq!(query.limits[0].suffix.as_deref(), Some("rows only"));
    }

    #[test]
    fn test_hql_join_with_and_derived_root() {
        let stmt = parse_hql(
            "select d.name from (select p.name as name from Person p) d \
             join Address a with a.owner = d.name",
        )
        .unwrap();
        let root = &select(&stmt).from.as_ref().unwrap().roots[0];
        assert!(matches!(root.source, RootSource::Subquery { .. }));
        assert_eq!(
            root.joins[0].condition.as_ref().map(|c| c.keyword.as_str()),
            Some("with")
        );
    }

    #[test]
    fn test_hql_insert() {
        let stmt = parse_hql("insert into Person (id, name) values (1, 'a'), (2, 'b')").unwrap();
        match stmt {
            Statement::Insert(insert) => {
                assert_eq!(insert.columns, vec!["id", "name"]);
                assert!(matches!(insert.source, InsertSource::Values { ref rows, .. } if rows.len() == 2));
            }
            other => panic!("Expected INSERT, got {other:?}"),
        }
    }

    #[test]
    fn test_sort_expressions() {
        let parse_sort =
            |text: &str| Parser::new(text, &JpqlDialect).parse_sort_expression();
        assert_eq!(parse_sort("p.name").unwrap(), Expr::Path(String::from("p.name")));
        assert!(parse_sort("length(p.name)").is_ok());
        assert!(parse_sort("case when p.age > 18 then 1 else 0 end").is_ok());

        assert!(parse_sort("").is_err());
        assert!(parse_sort("p.").is_err());
        let err = parse_sort("p.name desc, p.password").unwrap_err();
        assert_eq!(err.expected.as_deref(), Some("end of input"));
    }

    #[test]
    fn test_lexer_errors_surface() {
        let err = parse("select p from Person p where p.name = 'oops").unwrap_err();
        assert!(err.message.contains("Unterminated string literal"));
    }
}
