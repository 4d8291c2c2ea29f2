//! Queries: `SELECT`, `VALUES`, `TABLE`, set operations, and their clauses.

use sqltree_ast::*;
use sqltree_core::{check_stack_depth, Location};
use sqltree_diagnostics::{messages, Result};
use sqltree_scanner::{Keyword, TokenKind};

use crate::parser::Parser;
use crate::precedence::Precedence;
use crate::utilities::{is_bare_label, is_col_id, is_type_function_name};

/// A `LIMIT`/`OFFSET`/`FETCH` group before it is merged into a statement.
#[derive(Clone, Copy)]
struct SelectLimit<'a> {
    offset: Option<Node<'a>>,
    count: Option<Node<'a>>,
    option: LimitOption,
}

impl<'t, 'c, 'a> Parser<'t, 'c, 'a> {
    // ========================================================================
    // Statement forms
    // ========================================================================

    /// A query with or without enclosing parentheses, optionally led by
    /// `WITH`.
    pub(crate) fn parse_select_stmt(&mut self) -> Result<SelectStmt<'a>> {
        let with = if self.at_keyword(Keyword::With) {
            Some(self.parse_with_clause()?)
        } else {
            None
        };
        self.parse_select_rest(with)
    }

    pub(crate) fn parse_select_after_with(&mut self, with: &'a WithClause<'a>) -> Result<SelectStmt<'a>> {
        self.parse_select_rest(Some(with))
    }

    fn parse_select_rest(&mut self, with: Option<&'a WithClause<'a>>) -> Result<SelectStmt<'a>> {
        let _guard = check_stack_depth()?;
        let mut select = self.parse_set_expr(0)?;
        self.parse_select_tail(&mut select, with)?;
        Ok(select)
    }

    /// `'(' query ')'`
    pub(crate) fn parse_select_with_parens(&mut self) -> Result<&'a SelectStmt<'a>> {
        let _guard = check_stack_depth()?;
        self.expect_char(b'(')?;
        let select = self.parse_select_stmt()?;
        self.expect_char(b')')?;
        Ok(self.f.payload(select))
    }

    /// Set operations over query primaries. `INTERSECT` binds tighter than
    /// `UNION` and `EXCEPT`; all are left-associative.
    fn parse_set_expr(&mut self, min_prec: u8) -> Result<SelectStmt<'a>> {
        let mut left = self.parse_select_primary()?;
        loop {
            let (op, prec) = match self.current().keyword() {
                Some(Keyword::Union) => (SetOperation::Union, 1),
                Some(Keyword::Except) => (SetOperation::Except, 1),
                Some(Keyword::Intersect) => (SetOperation::Intersect, 2),
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let all = if self.eat_keyword(Keyword::All) {
                true
            } else {
                self.eat_keyword(Keyword::Distinct);
                false
            };
            let right = {
                let _guard = check_stack_depth()?;
                self.parse_set_expr(prec + 1)?
            };
            left = SelectStmt {
                op,
                all,
                larg: Some(self.f.payload(left)),
                rarg: Some(self.f.payload(right)),
                ..SelectStmt::EMPTY
            };
        }
        Ok(left)
    }

    fn parse_select_primary(&mut self) -> Result<SelectStmt<'a>> {
        match self.kind() {
            TokenKind::Char(b'(') => Ok(*self.parse_select_with_parens()?),
            TokenKind::Keyword(Keyword::Select) => {
                self.bump();
                self.parse_select_body()
            }
            TokenKind::Keyword(Keyword::Values) => self.parse_values(),
            TokenKind::Keyword(Keyword::Table) => {
                self.bump();
                let relation = self.parse_relation_expr()?;
                // Same as SELECT * FROM relation.
                let star = self.f.star(Location::UNKNOWN);
                let target = self.f.res_target(None, Some(star), Location::UNKNOWN);
                Ok(SelectStmt {
                    target_list: self.f.list(vec![target]),
                    from_clause: self.f.list(vec![self.f.node(relation)]),
                    ..SelectStmt::EMPTY
                })
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// Everything after the `SELECT` keyword up to `ORDER BY`.
    pub(crate) fn parse_select_body(&mut self) -> Result<SelectStmt<'a>> {
        let mut select = SelectStmt::EMPTY;

        if !self.eat_keyword(Keyword::All) && self.eat_keyword(Keyword::Distinct) {
            select.distinct_clause = Some(if self.eat_keyword(Keyword::On) {
                self.expect_char(b'(')?;
                let exprs = self.parse_expr_list()?;
                self.expect_char(b')')?;
                self.f.list(exprs)
            } else {
                &[]
            });
        }

        if !self.at_target_list_end() {
            select.target_list = self.parse_target_list()?;
        }
        if self.at_keyword(Keyword::Into) {
            select.into_clause = Some(self.parse_into_clause()?);
        }
        if self.eat_keyword(Keyword::From) {
            select.from_clause = self.parse_from_list()?;
        }
        if self.eat_keyword(Keyword::Where) {
            select.where_clause = Some(self.parse_expr()?);
        }
        if self.at_keyword(Keyword::Group) {
            self.bump();
            self.expect_keyword(Keyword::By)?;
            if !self.eat_keyword(Keyword::All) && self.eat_keyword(Keyword::Distinct) {
                select.group_distinct = true;
            }
            select.group_clause = self.parse_group_by_list()?;
        }
        if self.eat_keyword(Keyword::Having) {
            select.having_clause = Some(self.parse_expr()?);
        }
        if self.eat_keyword(Keyword::Window) {
            select.window_clause = self.parse_window_clause()?;
        }
        Ok(select)
    }

    fn parse_values(&mut self) -> Result<SelectStmt<'a>> {
        self.expect_keyword(Keyword::Values)?;
        let mut rows = Vec::new();
        loop {
            self.expect_char(b'(')?;
            let row = self.parse_expr_list()?;
            self.expect_char(b')')?;
            rows.push(self.f.list_node(row));
            if !self.eat_char(b',') {
                break;
            }
        }
        Ok(SelectStmt {
            values_lists: self.f.list(rows),
            ..SelectStmt::EMPTY
        })
    }

    fn at_target_list_end(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Eof
                | TokenKind::Char(b';' | b')')
                | TokenKind::Keyword(
                    Keyword::From
                        | Keyword::Into
                        | Keyword::Where
                        | Keyword::Group
                        | Keyword::Having
                        | Keyword::Window
                        | Keyword::Union
                        | Keyword::Intersect
                        | Keyword::Except
                        | Keyword::Order
                        | Keyword::Limit
                        | Keyword::Offset
                        | Keyword::Fetch
                        | Keyword::For
                )
        )
    }

    // ========================================================================
    // ORDER BY, LIMIT, locking
    // ========================================================================

    /// Trailing `ORDER BY`, `LIMIT`/`OFFSET`/`FETCH`, and locking clauses,
    /// merged into `select` along with a leading `WITH`.
    pub(crate) fn parse_select_tail(&mut self, select: &mut SelectStmt<'a>, with: Option<&'a WithClause<'a>>) -> Result<()> {
        let sort = if self.at_keyword(Keyword::Order) {
            self.bump();
            self.expect_keyword(Keyword::By)?;
            self.parse_sort_list()?
        } else {
            Vec::new()
        };

        let mut limit = self.parse_opt_select_limit()?;
        let mut locking = Vec::new();
        if self.at_keyword(Keyword::For) {
            locking = self.parse_locking_clauses()?;
            if limit.is_none() {
                limit = self.parse_opt_select_limit()?;
            }
        }

        if !sort.is_empty() {
            if !select.sort_clause.is_empty() {
                let location = leftmost_location(sort.iter().copied());
                return Err(self.error_at(&messages::MULTIPLE_ORDER_BY_CLAUSES, location));
            }
            select.sort_clause = self.f.list(sort);
        }
        if !locking.is_empty() {
            let mut all = select.locking_clause.to_vec();
            all.extend(locking);
            select.locking_clause = self.f.list(all);
        }
        if let Some(limit) = limit {
            if let Some(offset) = limit.offset {
                if select.limit_offset.is_some() {
                    return Err(self.error_at(&messages::MULTIPLE_OFFSET_CLAUSES, expr_location(offset)));
                }
                select.limit_offset = Some(offset);
            }
            if let Some(count) = limit.count {
                if select.limit_count.is_some() {
                    return Err(self.error_at(&messages::MULTIPLE_LIMIT_CLAUSES, expr_location(count)));
                }
                select.limit_count = Some(count);
            }
            if limit.option == LimitOption::WithTies && select.sort_clause.is_empty() {
                let location = limit.count.map_or(Location::UNKNOWN, expr_location);
                return Err(self.error_at(&messages::WITH_TIES_WITHOUT_ORDER_BY, location));
            }
            select.limit_option = limit.option;
        }
        if let Some(with) = with {
            if select.with_clause.is_some() {
                return Err(self.error_at(&messages::MULTIPLE_WITH_CLAUSES, with.location));
            }
            select.with_clause = Some(with);
        }
        Ok(())
    }

    /// `sortby [, ...]`
    pub(crate) fn parse_sort_list(&mut self) -> Result<Vec<Node<'a>>> {
        let mut items = vec![self.parse_sort_by()?];
        while self.eat_char(b',') {
            items.push(self.parse_sort_by()?);
        }
        Ok(items)
    }

    fn parse_sort_by(&mut self) -> Result<Node<'a>> {
        let node = self.parse_expr()?;
        let mut location = Location::UNKNOWN;
        let mut use_op: NameList<'a> = &[];
        let dir = if self.eat_keyword(Keyword::Using) {
            if !self.at_operator() {
                return Err(self.syntax_error());
            }
            location = self.loc();
            use_op = self.f.arena().alloc_vec(vec![self.operator_text()]);
            self.bump();
            SortByDir::Using
        } else if self.eat_keyword(Keyword::Asc) {
            SortByDir::Asc
        } else if self.eat_keyword(Keyword::Desc) {
            SortByDir::Desc
        } else {
            SortByDir::Default
        };
        let nulls = self.parse_opt_nulls_order()?;
        Ok(self.f.sort_by(node, dir, nulls, use_op, location))
    }

    fn parse_opt_nulls_order(&mut self) -> Result<SortByNulls> {
        if !self.eat_keyword(Keyword::Nulls) {
            return Ok(SortByNulls::Default);
        }
        if self.eat_keyword(Keyword::First) {
            Ok(SortByNulls::First)
        } else {
            self.expect_keyword(Keyword::Last)?;
            Ok(SortByNulls::Last)
        }
    }

    fn parse_opt_select_limit(&mut self) -> Result<Option<SelectLimit<'a>>> {
        let mut limit = SelectLimit {
            offset: None,
            count: None,
            option: LimitOption::Count,
        };
        if self.at_keyword(Keyword::Limit) || self.at_keyword(Keyword::Fetch) {
            self.parse_limit_clause(&mut limit)?;
            if self.at_keyword(Keyword::Offset) {
                limit.offset = Some(self.parse_offset_clause()?);
            }
        } else if self.at_keyword(Keyword::Offset) {
            limit.offset = Some(self.parse_offset_clause()?);
            if self.at_keyword(Keyword::Limit) || self.at_keyword(Keyword::Fetch) {
                self.parse_limit_clause(&mut limit)?;
            }
        } else {
            return Ok(None);
        }
        Ok(Some(limit))
    }

    fn parse_limit_clause(&mut self, limit: &mut SelectLimit<'a>) -> Result<()> {
        if self.eat_keyword(Keyword::Limit) {
            limit.count = Some(if self.at_keyword(Keyword::All) {
                let location = self.loc();
                self.bump();
                self.f.null_const(location)
            } else {
                self.parse_expr()?
            });
            return Ok(());
        }

        // FETCH { FIRST | NEXT } [ count ] { ROW | ROWS } { ONLY | WITH TIES }
        self.expect_keyword(Keyword::Fetch)?;
        if !self.eat_keyword(Keyword::First) {
            self.expect_keyword(Keyword::Next)?;
        }
        limit.count = Some(if self.at_keyword(Keyword::Row) || self.at_keyword(Keyword::Rows) {
            self.f.int_const(1, Location::UNKNOWN)
        } else {
            self.parse_expr_bp(Precedence::Unary)?
        });
        if !self.eat_keyword(Keyword::Row) {
            self.expect_keyword(Keyword::Rows)?;
        }
        if self.eat_keyword(Keyword::With) {
            self.expect_keyword(Keyword::Ties)?;
            limit.option = LimitOption::WithTies;
        } else {
            self.expect_keyword(Keyword::Only)?;
        }
        Ok(())
    }

    fn parse_offset_clause(&mut self) -> Result<Node<'a>> {
        self.expect_keyword(Keyword::Offset)?;
        let offset = self.parse_expr()?;
        if !self.eat_keyword(Keyword::Row) {
            self.eat_keyword(Keyword::Rows);
        }
        Ok(offset)
    }

    fn parse_locking_clauses(&mut self) -> Result<Vec<Node<'a>>> {
        let mut clauses = Vec::new();
        while self.at_keyword(Keyword::For) {
            self.bump();
            // FOR READ ONLY adds nothing.
            if self.kind() == TokenKind::Ident && self.current().value == "read" {
                self.bump();
                self.expect_keyword(Keyword::Only)?;
                continue;
            }
            let strength = match self.current().keyword() {
                Some(Keyword::Update) => {
                    self.bump();
                    LockClauseStrength::ForUpdate
                }
                Some(Keyword::No) => {
                    self.bump();
                    self.expect_keyword(Keyword::Key)?;
                    self.expect_keyword(Keyword::Update)?;
                    LockClauseStrength::ForNoKeyUpdate
                }
                Some(Keyword::Share) => {
                    self.bump();
                    LockClauseStrength::ForShare
                }
                Some(Keyword::Key) => {
                    self.bump();
                    self.expect_keyword(Keyword::Share)?;
                    LockClauseStrength::ForKeyShare
                }
                _ => return Err(self.syntax_error()),
            };
            let mut locked_rels = Vec::new();
            if self.eat_keyword(Keyword::Of) {
                loop {
                    let rel = self.parse_qualified_name()?;
                    locked_rels.push(self.f.node(rel));
                    if !self.eat_char(b',') {
                        break;
                    }
                }
            }
            let wait_policy = if self.eat_keyword(Keyword::Nowait) {
                LockWaitPolicy::Error
            } else if self.eat_keyword(Keyword::Skip) {
                self.expect_keyword(Keyword::Locked)?;
                LockWaitPolicy::Skip
            } else {
                LockWaitPolicy::Block
            };
            clauses.push(self.f.node(LockingClause {
                locked_rels: self.f.list(locked_rels),
                strength,
                wait_policy,
            }));
        }
        Ok(clauses)
    }

    // ========================================================================
    // Target list and INTO
    // ========================================================================

    pub(crate) fn parse_target_list(&mut self) -> Result<NodeList<'a>> {
        let mut targets = vec![self.parse_target_el()?];
        while self.eat_char(b',') {
            targets.push(self.parse_target_el()?);
        }
        Ok(self.f.list(targets))
    }

    fn parse_target_el(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        if self.eat_char(b'*') {
            let star = self.f.star(location);
            return Ok(self.f.res_target(None, Some(star), location));
        }
        let val = self.parse_expr()?;
        let name = if self.eat_keyword(Keyword::As) {
            Some(self.parse_col_label()?)
        } else if is_bare_label(self.current()) {
            let name = self.name_of(self.current());
            self.bump();
            Some(name)
        } else {
            None
        };
        Ok(self.f.node(ResTarget {
            name,
            indirection: &[],
            val: Some(val),
            location,
        }))
    }

    fn parse_into_clause(&mut self) -> Result<&'a IntoClause<'a>> {
        self.expect_keyword(Keyword::Into)?;
        let relpersistence = if self.eat_keyword(Keyword::Temporary) || self.eat_keyword(Keyword::Temp) {
            RelPersistence::Temp
        } else if self.eat_keyword(Keyword::Unlogged) {
            RelPersistence::Unlogged
        } else {
            RelPersistence::Permanent
        };
        self.eat_keyword(Keyword::Table);
        let rel = RangeVar {
            relpersistence,
            ..self.parse_qualified_name()?
        };
        Ok(self.f.payload(IntoClause {
            rel: self.f.payload(rel),
            col_names: &[],
            view_query: None,
        }))
    }

    // ========================================================================
    // FROM
    // ========================================================================

    pub(crate) fn parse_from_list(&mut self) -> Result<NodeList<'a>> {
        let mut items = vec![self.parse_table_ref()?];
        while self.eat_char(b',') {
            items.push(self.parse_table_ref()?);
        }
        Ok(self.f.list(items))
    }

    /// A FROM item followed by any number of joins.
    pub(crate) fn parse_table_ref(&mut self) -> Result<Node<'a>> {
        let _guard = check_stack_depth()?;
        let mut left = self.parse_table_primary()?;
        loop {
            let natural = self.at_keyword(Keyword::Natural);
            let jointype = match self.peek_at(natural as usize).keyword() {
                Some(Keyword::Cross) if !natural => {
                    self.bump();
                    self.expect_keyword(Keyword::Join)?;
                    let right = self.parse_table_primary()?;
                    left = self.f.node(JoinExpr {
                        jointype: JoinType::Inner,
                        is_natural: false,
                        larg: left,
                        rarg: right,
                        using_clause: &[],
                        join_using_alias: None,
                        quals: None,
                        alias: None,
                    });
                    continue;
                }
                Some(Keyword::Join | Keyword::Inner) => JoinType::Inner,
                Some(Keyword::Left) => JoinType::Left,
                Some(Keyword::Right) => JoinType::Right,
                Some(Keyword::Full) => JoinType::Full,
                _ if natural => {
                    self.bump();
                    return Err(self.syntax_error());
                }
                _ => break,
            };
            if natural {
                self.bump();
            }
            if !self.eat_keyword(Keyword::Join) {
                self.bump();
                self.eat_keyword(Keyword::Outer);
                self.expect_keyword(Keyword::Join)?;
            }

            if natural {
                let right = self.parse_table_primary()?;
                left = self.f.node(JoinExpr {
                    jointype,
                    is_natural: true,
                    larg: left,
                    rarg: right,
                    using_clause: &[],
                    join_using_alias: None,
                    quals: None,
                    alias: None,
                });
                continue;
            }

            let right = self.parse_table_ref()?;
            let mut join = JoinExpr {
                jointype,
                is_natural: false,
                larg: left,
                rarg: right,
                using_clause: &[],
                join_using_alias: None,
                quals: None,
                alias: None,
            };
            if self.eat_keyword(Keyword::On) {
                join.quals = Some(self.parse_expr()?);
            } else if self.eat_keyword(Keyword::Using) {
                join.using_clause = self.parse_paren_name_list()?;
                if self.eat_keyword(Keyword::As) {
                    let aliasname = self.parse_col_id()?;
                    join.join_using_alias = Some(self.f.payload(Alias { aliasname, colnames: &[] }));
                }
            } else {
                return Err(self.syntax_error());
            }
            left = self.f.node(join);
        }
        Ok(left)
    }

    fn parse_table_primary(&mut self) -> Result<Node<'a>> {
        if self.eat_keyword(Keyword::Lateral) {
            return match self.kind() {
                TokenKind::Char(b'(') => {
                    let subquery = self.parse_select_with_parens()?;
                    self.range_subselect(true, subquery)
                }
                _ => self.parse_function_table(true),
            };
        }

        match self.kind() {
            TokenKind::Char(b'(') => {
                if let Some(subquery) = self.try_select_with_parens()? {
                    return self.range_subselect(false, subquery);
                }
                self.bump();
                let inner = self.parse_table_ref()?;
                self.expect_char(b')')?;
                let alias = self.parse_opt_alias()?;
                match (inner, alias) {
                    (Node::JoinExpr(join), Some(alias)) => Ok(self.f.node(JoinExpr {
                        alias: Some(alias),
                        ..*join
                    })),
                    (_, Some(_)) => Err(self.syntax_error()),
                    (inner, None) => Ok(inner),
                }
            }
            TokenKind::Keyword(Keyword::Only) => self.parse_relation_with_alias(),
            TokenKind::Keyword(Keyword::Rows) if self.peek_keyword(1, Keyword::From) => self.parse_function_table(false),
            TokenKind::Keyword(
                Keyword::Coalesce
                | Keyword::Greatest
                | Keyword::Least
                | Keyword::Nullif
                | Keyword::CurrentDate
                | Keyword::CurrentTime
                | Keyword::CurrentTimestamp
                | Keyword::Localtime
                | Keyword::Localtimestamp
                | Keyword::CurrentRole
                | Keyword::CurrentUser
                | Keyword::SessionUser
                | Keyword::SystemUser
                | Keyword::User
                | Keyword::CurrentCatalog
                | Keyword::CurrentSchema,
            ) => self.parse_function_table(false),
            _ if self.at_function_name() => self.parse_function_table(false),
            _ => self.parse_relation_with_alias(),
        }
    }

    /// Whether the current token starts `name[.name...] (`.
    fn at_function_name(&self) -> bool {
        if !is_type_function_name(self.current()) && !is_col_id(self.current()) {
            return false;
        }
        let mut offset = 1;
        while self.peek_at(offset).is_char(b'.') {
            offset += 2;
        }
        self.peek_at(offset).is_char(b'(')
    }

    fn range_subselect(&mut self, lateral: bool, subquery: &'a SelectStmt<'a>) -> Result<Node<'a>> {
        let alias = self.parse_opt_alias()?;
        Ok(self.f.node(RangeSubselect {
            lateral,
            subquery: subquery.into_node(),
            alias,
        }))
    }

    /// `func(...)` or `ROWS FROM (func(...), ...)` in FROM.
    fn parse_function_table(&mut self, lateral: bool) -> Result<Node<'a>> {
        let (functions, is_rowsfrom) = if self.at_keyword(Keyword::Rows) && self.peek_keyword(1, Keyword::From) {
            self.bump();
            self.bump();
            self.expect_char(b'(')?;
            let mut functions = vec![self.parse_primary()?];
            while self.eat_char(b',') {
                functions.push(self.parse_primary()?);
            }
            self.expect_char(b')')?;
            (functions, true)
        } else {
            (vec![self.parse_primary()?], false)
        };
        let ordinality = if self.at_keyword(Keyword::With) && self.peek_keyword(1, Keyword::Ordinality) {
            self.bump();
            self.bump();
            true
        } else {
            false
        };
        let alias = self.parse_opt_alias()?;
        Ok(self.f.node(RangeFunction {
            lateral,
            ordinality,
            is_rowsfrom,
            functions: self.f.list(functions),
            alias,
        }))
    }

    /// `relation_expr [alias] [TABLESAMPLE ...]`
    fn parse_relation_with_alias(&mut self) -> Result<Node<'a>> {
        let relation = self.parse_relation_expr()?;
        let alias = self.parse_opt_alias()?;
        let relation = self.f.node(RangeVar { alias, ..relation });
        if !self.at_keyword(Keyword::Tablesample) {
            return Ok(relation);
        }

        let location = self.loc();
        self.bump();
        let method = self.parse_any_name()?;
        self.expect_char(b'(')?;
        let args = self.parse_expr_list()?;
        self.expect_char(b')')?;
        let repeatable = if self.eat_keyword(Keyword::Repeatable) {
            self.expect_char(b'(')?;
            let seed = self.parse_expr()?;
            self.expect_char(b')')?;
            Some(seed)
        } else {
            None
        };
        Ok(self.f.node(RangeTableSample {
            relation,
            method,
            args: self.f.list(args),
            repeatable,
            location,
        }))
    }

    /// `[ONLY] qualified_name [*]` or `ONLY ( qualified_name )`.
    pub(crate) fn parse_relation_expr(&mut self) -> Result<RangeVar<'a>> {
        if self.eat_keyword(Keyword::Only) {
            let parens = self.eat_char(b'(');
            let relation = self.parse_qualified_name()?;
            if parens {
                self.expect_char(b')')?;
            }
            return Ok(RangeVar { inh: false, ..relation });
        }
        let relation = self.parse_qualified_name()?;
        self.eat_char(b'*');
        Ok(relation)
    }

    /// `[AS] ColId ['(' name, ... ')']`
    pub(crate) fn parse_opt_alias(&mut self) -> Result<Option<&'a Alias<'a>>> {
        if !self.eat_keyword(Keyword::As) && !is_col_id(self.current()) {
            return Ok(None);
        }
        let aliasname = self.parse_col_id()?;
        let colnames = if self.at_char(b'(') {
            self.parse_paren_name_list()?
        } else {
            &[]
        };
        Ok(Some(self.f.payload(Alias { aliasname, colnames })))
    }

    // ========================================================================
    // GROUP BY and WINDOW
    // ========================================================================

    fn parse_group_by_list(&mut self) -> Result<NodeList<'a>> {
        let mut items = vec![self.parse_group_by_item()?];
        while self.eat_char(b',') {
            items.push(self.parse_group_by_item()?);
        }
        Ok(self.f.list(items))
    }

    fn parse_group_by_item(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        if self.at_char(b'(') && self.peek_at(1).is_char(b')') {
            self.bump();
            self.bump();
            return Ok(self.grouping_set(GroupingSetKind::Empty, Vec::new(), location));
        }
        let kind = match self.current().keyword() {
            Some(Keyword::Rollup) if self.peek_at(1).is_char(b'(') => GroupingSetKind::Rollup,
            Some(Keyword::Cube) if self.peek_at(1).is_char(b'(') => GroupingSetKind::Cube,
            Some(Keyword::Grouping) if self.peek_keyword(1, Keyword::Sets) => {
                self.bump();
                self.bump();
                let _guard = check_stack_depth()?;
                self.expect_char(b'(')?;
                let mut content = vec![self.parse_group_by_item()?];
                while self.eat_char(b',') {
                    content.push(self.parse_group_by_item()?);
                }
                self.expect_char(b')')?;
                return Ok(self.grouping_set(GroupingSetKind::Sets, content, location));
            }
            _ => return self.parse_expr(),
        };
        self.bump();
        self.expect_char(b'(')?;
        let content = self.parse_expr_list()?;
        self.expect_char(b')')?;
        Ok(self.grouping_set(kind, content, location))
    }

    fn grouping_set(&self, kind: GroupingSetKind, content: Vec<Node<'a>>, location: Location) -> Node<'a> {
        self.f.node(GroupingSet {
            kind,
            content: self.f.list(content),
            location,
        })
    }

    /// `name AS (spec) [, ...]`
    fn parse_window_clause(&mut self) -> Result<NodeList<'a>> {
        let mut windows = Vec::new();
        loop {
            let name = self.parse_col_id()?;
            self.expect_keyword(Keyword::As)?;
            let spec = self.parse_window_specification(Some(name))?;
            windows.push(self.f.node(spec));
            if !self.eat_char(b',') {
                break;
            }
        }
        Ok(self.f.list(windows))
    }

    // ========================================================================
    // WITH
    // ========================================================================

    pub(crate) fn parse_with_clause(&mut self) -> Result<&'a WithClause<'a>> {
        let location = self.loc();
        self.expect_keyword(Keyword::With)?;
        let recursive = self.eat_keyword(Keyword::Recursive);
        let mut ctes = vec![self.parse_common_table_expr()?];
        while self.eat_char(b',') {
            ctes.push(self.parse_common_table_expr()?);
        }
        Ok(self.f.payload(WithClause {
            ctes: self.f.list(ctes),
            recursive,
            location,
        }))
    }

    fn parse_common_table_expr(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        let ctename = self.parse_col_id()?;
        let aliascolnames = if self.at_char(b'(') {
            self.parse_paren_name_list()?
        } else {
            &[]
        };
        self.expect_keyword(Keyword::As)?;
        let ctematerialized = if self.eat_keyword(Keyword::Materialized) {
            CteMaterialize::Always
        } else if self.at_keyword(Keyword::Not) && self.peek_keyword(1, Keyword::Materialized) {
            self.bump();
            self.bump();
            CteMaterialize::Never
        } else {
            CteMaterialize::Default
        };
        let _guard = check_stack_depth()?;
        self.expect_char(b'(')?;
        let ctequery = self.parse_preparable_statement()?;
        self.expect_char(b')')?;
        Ok(self.f.node(CommonTableExpr {
            ctename,
            aliascolnames,
            ctematerialized,
            ctequery,
            location,
        }))
    }
}
