//! Data modification statements: `INSERT`, `UPDATE`, `DELETE`, `MERGE`.

use sqltree_ast::*;
use sqltree_diagnostics::{messages, Result};
use sqltree_scanner::Keyword;

use crate::parser::Parser;
use crate::utilities::is_col_id;

impl<'t, 'c, 'a> Parser<'t, 'c, 'a> {
    // ========================================================================
    // INSERT
    // ========================================================================

    pub(crate) fn parse_insert(&mut self, with_clause: Option<&'a WithClause<'a>>) -> Result<Node<'a>> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let mut relation = self.parse_qualified_name()?;
        if self.eat_keyword(Keyword::As) {
            let aliasname = self.parse_col_id()?;
            relation.alias = Some(self.f.payload(Alias { aliasname, colnames: &[] }));
        }

        let cols = if self.at_char(b'(') && !self.parens_lead_to_select() {
            self.parse_insert_columns()?
        } else {
            &[]
        };
        let override_ = self.parse_opt_overriding()?;
        let select_stmt = if self.at_keyword(Keyword::Default) {
            self.bump();
            self.expect_keyword(Keyword::Values)?;
            None
        } else {
            let select = self.parse_select_stmt()?;
            Some(self.f.node(select))
        };

        let on_conflict_clause = if self.at_keyword(Keyword::On) && self.peek_keyword(1, Keyword::Conflict) {
            Some(self.parse_on_conflict()?)
        } else {
            None
        };
        let returning_list = self.parse_opt_returning()?;

        Ok(self.f.node(InsertStmt {
            relation: self.f.payload(relation),
            cols,
            select_stmt,
            on_conflict_clause,
            returning_list,
            with_clause,
            override_,
        }))
    }

    /// `'(' col [indirection], ... ')'`
    fn parse_insert_columns(&mut self) -> Result<NodeList<'a>> {
        self.expect_char(b'(')?;
        let mut cols = vec![self.parse_set_target()?];
        while self.eat_char(b',') {
            cols.push(self.parse_set_target()?);
        }
        self.expect_char(b')')?;
        Ok(self.f.list(cols))
    }

    /// `OVERRIDING { USER | SYSTEM } VALUE`
    fn parse_opt_overriding(&mut self) -> Result<OverridingKind> {
        if !self.eat_keyword(Keyword::Overriding) {
            return Ok(OverridingKind::NotSet);
        }
        let kind = if self.eat_keyword(Keyword::User) {
            OverridingKind::UserValue
        } else {
            self.expect_keyword(Keyword::System)?;
            OverridingKind::SystemValue
        };
        self.expect_keyword(Keyword::Value)?;
        Ok(kind)
    }

    fn parse_on_conflict(&mut self) -> Result<&'a OnConflictClause<'a>> {
        let location = self.loc();
        self.expect_keyword(Keyword::On)?;
        self.expect_keyword(Keyword::Conflict)?;

        let infer = if self.at_char(b'(') {
            let infer_location = self.loc();
            self.bump();
            let mut index_elems = vec![self.parse_index_elem()?];
            while self.eat_char(b',') {
                index_elems.push(self.parse_index_elem()?);
            }
            self.expect_char(b')')?;
            let where_clause = if self.eat_keyword(Keyword::Where) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            Some(self.f.payload(InferClause {
                index_elems: self.f.list(index_elems),
                where_clause,
                conname: None,
                location: infer_location,
            }))
        } else if self.at_keyword(Keyword::On) {
            let infer_location = self.loc();
            self.bump();
            self.expect_keyword(Keyword::Constraint)?;
            let conname = self.parse_col_id()?;
            Some(self.f.payload(InferClause {
                index_elems: &[],
                where_clause: None,
                conname: Some(conname),
                location: infer_location,
            }))
        } else {
            None
        };

        self.expect_keyword(Keyword::Do)?;
        let clause = if self.eat_keyword(Keyword::Nothing) {
            OnConflictClause {
                action: OnConflictAction::Nothing,
                infer,
                target_list: &[],
                where_clause: None,
                location,
            }
        } else {
            self.expect_keyword(Keyword::Update)?;
            self.expect_keyword(Keyword::Set)?;
            let target_list = self.parse_set_clause_list()?;
            let where_clause = if self.eat_keyword(Keyword::Where) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            OnConflictClause {
                action: OnConflictAction::Update,
                infer,
                target_list,
                where_clause,
                location,
            }
        };
        Ok(self.f.payload(clause))
    }

    /// A conflict-target column or expression with its index options.
    fn parse_index_elem(&mut self) -> Result<Node<'a>> {
        let (name, expr) = if self.at_char(b'(') {
            self.bump();
            let expr = self.parse_expr()?;
            self.expect_char(b')')?;
            (None, Some(expr))
        } else if is_col_id(self.current()) && !self.peek_at(1).is_char(b'(') {
            (Some(self.parse_col_id()?), None)
        } else {
            (None, Some(self.parse_primary()?))
        };
        let collation = if self.eat_keyword(Keyword::Collate) {
            self.parse_any_name()?
        } else {
            &[]
        };
        let opclass = if is_col_id(self.current()) && !self.at_keyword(Keyword::Nulls) {
            self.parse_any_name()?
        } else {
            &[]
        };
        let ordering = if self.eat_keyword(Keyword::Asc) {
            SortByDir::Asc
        } else if self.eat_keyword(Keyword::Desc) {
            SortByDir::Desc
        } else {
            SortByDir::Default
        };
        let nulls_ordering = if self.eat_keyword(Keyword::Nulls) {
            if self.eat_keyword(Keyword::First) {
                SortByNulls::First
            } else {
                self.expect_keyword(Keyword::Last)?;
                SortByNulls::Last
            }
        } else {
            SortByNulls::Default
        };
        Ok(self.f.node(IndexElem {
            name,
            expr,
            collation,
            opclass,
            ordering,
            nulls_ordering,
        }))
    }

    // ========================================================================
    // UPDATE and DELETE
    // ========================================================================

    pub(crate) fn parse_update(&mut self, with_clause: Option<&'a WithClause<'a>>) -> Result<Node<'a>> {
        self.expect_keyword(Keyword::Update)?;
        let relation = self.parse_relation_opt_alias(Keyword::Set)?;
        self.expect_keyword(Keyword::Set)?;
        let target_list = self.parse_set_clause_list()?;
        let from_clause = if self.eat_keyword(Keyword::From) {
            self.parse_from_list()?
        } else {
            &[]
        };
        let where_clause = self.parse_where_or_current()?;
        let returning_list = self.parse_opt_returning()?;
        Ok(self.f.node(UpdateStmt {
            relation,
            target_list,
            where_clause,
            from_clause,
            returning_list,
            with_clause,
        }))
    }

    pub(crate) fn parse_delete(&mut self, with_clause: Option<&'a WithClause<'a>>) -> Result<Node<'a>> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let relation = self.parse_relation_opt_alias(Keyword::Using)?;
        let using_clause = if self.eat_keyword(Keyword::Using) {
            self.parse_from_list()?
        } else {
            &[]
        };
        let where_clause = self.parse_where_or_current()?;
        let returning_list = self.parse_opt_returning()?;
        Ok(self.f.node(DeleteStmt {
            relation,
            using_clause,
            where_clause,
            returning_list,
            with_clause,
        }))
    }

    /// A target relation with an optional alias; `follower` is the keyword
    /// that may come next and so cannot be a bare alias.
    fn parse_relation_opt_alias(&mut self, follower: Keyword) -> Result<&'a RangeVar<'a>> {
        let mut relation = self.parse_relation_expr()?;
        let has_alias = self.eat_keyword(Keyword::As) || (is_col_id(self.current()) && !self.at_keyword(follower));
        if has_alias {
            let aliasname = self.parse_col_id()?;
            relation.alias = Some(self.f.payload(Alias { aliasname, colnames: &[] }));
        }
        Ok(self.f.payload(relation))
    }

    /// `WHERE expr` or `WHERE CURRENT OF cursor`.
    fn parse_where_or_current(&mut self) -> Result<Option<Node<'a>>> {
        if !self.eat_keyword(Keyword::Where) {
            return Ok(None);
        }
        if self.at_keyword(Keyword::Current) && self.peek_keyword(1, Keyword::Of) {
            self.bump();
            self.bump();
            let cursor_name = self.parse_col_id()?;
            return Ok(Some(self.f.node(CurrentOfExpr { cursor_name })));
        }
        Ok(Some(self.parse_expr()?))
    }

    fn parse_opt_returning(&mut self) -> Result<NodeList<'a>> {
        if self.eat_keyword(Keyword::Returning) {
            self.parse_target_list()
        } else {
            Ok(&[])
        }
    }

    /// `col = expr` and `(col, ...) = expr` assignments.
    ///
    /// A multi-column assignment yields one target per column, each holding
    /// a `MultiAssignRef` to the shared source.
    pub(crate) fn parse_set_clause_list(&mut self) -> Result<NodeList<'a>> {
        let mut targets = Vec::new();
        loop {
            if self.at_char(b'(') {
                self.bump();
                let mut columns = vec![self.parse_set_target()?];
                while self.eat_char(b',') {
                    columns.push(self.parse_set_target()?);
                }
                self.expect_char(b')')?;
                self.expect_char(b'=')?;
                let source = self.parse_expr()?;

                let ncolumns = columns.len() as i32;
                if let Node::RowExpr(row) = source {
                    if row.args.len() as i32 != ncolumns {
                        return Err(self.error_at(&messages::ROW_VALUE_MISMATCH, expr_location(source)));
                    }
                }
                for (colno, column) in (1..).zip(columns) {
                    let Node::ResTarget(target) = column else {
                        continue;
                    };
                    let val = self.f.node(MultiAssignRef {
                        source,
                        colno,
                        ncolumns,
                    });
                    targets.push(self.f.node(ResTarget {
                        val: Some(val),
                        ..*target
                    }));
                }
            } else {
                let target = self.parse_set_target()?;
                self.expect_char(b'=')?;
                let val = self.parse_expr()?;
                if let Node::ResTarget(target) = target {
                    targets.push(self.f.node(ResTarget {
                        val: Some(val),
                        ..*target
                    }));
                }
            }
            if !self.eat_char(b',') {
                break;
            }
        }
        Ok(self.f.list(targets))
    }

    /// `ColId [indirection]` as a `ResTarget` without a value.
    fn parse_set_target(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        let name = self.parse_col_id()?;
        let indirection = self.parse_opt_indirection()?;
        Ok(self.f.node(ResTarget {
            name: Some(name),
            indirection,
            val: None,
            location,
        }))
    }

    // ========================================================================
    // MERGE
    // ========================================================================

    pub(crate) fn parse_merge(&mut self, with_clause: Option<&'a WithClause<'a>>) -> Result<Node<'a>> {
        self.expect_keyword(Keyword::Merge)?;
        self.expect_keyword(Keyword::Into)?;
        let relation = self.parse_relation_opt_alias(Keyword::Using)?;
        self.expect_keyword(Keyword::Using)?;
        let source_relation = self.parse_table_ref()?;
        self.expect_keyword(Keyword::On)?;
        let join_condition = self.parse_expr()?;

        let mut clauses = Vec::new();
        while self.at_keyword(Keyword::When) {
            clauses.push(self.parse_merge_when_clause()?);
        }
        if clauses.is_empty() {
            return Err(self.syntax_error());
        }
        let returning_list = self.parse_opt_returning()?;

        Ok(self.f.node(MergeStmt {
            relation,
            source_relation,
            join_condition,
            merge_when_clauses: self.f.list(clauses),
            returning_list,
            with_clause,
        }))
    }

    fn parse_merge_when_clause(&mut self) -> Result<Node<'a>> {
        self.expect_keyword(Keyword::When)?;
        let match_kind = if self.eat_keyword(Keyword::Matched) {
            MergeMatchKind::Matched
        } else {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Matched)?;
            if self.eat_keyword(Keyword::By) {
                if self.eat_keyword(Keyword::Source) {
                    MergeMatchKind::NotMatchedBySource
                } else {
                    self.expect_keyword(Keyword::Target)?;
                    MergeMatchKind::NotMatchedByTarget
                }
            } else {
                MergeMatchKind::NotMatchedByTarget
            }
        };
        let condition = if self.eat_keyword(Keyword::And) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect_keyword(Keyword::Then)?;

        let mut clause = MergeWhenClause {
            match_kind,
            command_type: CmdType::Nothing,
            override_: OverridingKind::NotSet,
            condition,
            target_list: &[],
            values: &[],
        };
        let inserting = match_kind == MergeMatchKind::NotMatchedByTarget;
        match self.current().keyword() {
            Some(Keyword::Do) => {
                self.bump();
                self.expect_keyword(Keyword::Nothing)?;
            }
            Some(Keyword::Update) if !inserting => {
                self.bump();
                self.expect_keyword(Keyword::Set)?;
                clause.command_type = CmdType::Update;
                clause.target_list = self.parse_set_clause_list()?;
            }
            Some(Keyword::Delete) if !inserting => {
                self.bump();
                clause.command_type = CmdType::Delete;
            }
            Some(Keyword::Insert) if inserting => {
                self.bump();
                clause.command_type = CmdType::Insert;
                if self.at_char(b'(') {
                    clause.target_list = self.parse_insert_columns()?;
                }
                clause.override_ = self.parse_opt_overriding()?;
                if self.eat_keyword(Keyword::Default) {
                    self.expect_keyword(Keyword::Values)?;
                } else {
                    self.expect_keyword(Keyword::Values)?;
                    self.expect_char(b'(')?;
                    let values = self.parse_expr_list()?;
                    self.expect_char(b')')?;
                    clause.values = self.f.list(values);
                }
            }
            _ => return Err(self.syntax_error()),
        }
        Ok(self.f.node(clause))
    }
}
