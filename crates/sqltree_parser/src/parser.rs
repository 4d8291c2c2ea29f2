//! The recursive descent parser.
//!
//! Consumes the scanner's token vector and builds the raw tree through a
//! [`NodeFactory`]. Statement-level grammar lives here; queries, data
//! modification, expressions, and type names are split across sibling
//! modules as further `impl Parser` blocks.
//!
//! The grammar is LL with one bounded exception: a `(` that may open either
//! a parenthesized query or a parenthesized expression is resolved by trying
//! the query first and backtracking on a syntax error. Failed attempts are
//! remembered per token so nested ambiguities stay polynomial.

use sqltree_ast::*;
use sqltree_core::{ArenaContext, Location};
use sqltree_diagnostics::{messages, DiagnosticMessage, Error, Result};
use sqltree_nodebuilder::NodeFactory;
use sqltree_options::ParseMode;
use sqltree_scanner::{Keyword, Token, TokenKind};

use crate::utilities::{is_col_id, is_col_label, starts_select, utility_statement_name};

/// The raw parser for one query text.
pub struct Parser<'t, 'c, 'a> {
    text: &'t str,
    tokens: Vec<Token>,
    pos: usize,
    mode: ParseMode,
    pub(crate) f: NodeFactory<'c, 'a>,
    /// Furthest syntax error seen in an abandoned attempt.
    deferred: Option<Error>,
    /// For each `(`, the index of the first token after its run of `(`.
    paren_run_end: Vec<usize>,
    /// Token positions where a parenthesized query is known not to start.
    failed_select: Vec<bool>,
}

impl<'t, 'c, 'a> Parser<'t, 'c, 'a> {
    pub fn new(text: &'t str, mut tokens: Vec<Token>, mode: ParseMode, arena: &'c ArenaContext<'a>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, text.len(), text.len()));
        }

        let mut paren_run_end = vec![0; tokens.len()];
        for i in (0..tokens.len()).rev() {
            paren_run_end[i] = if tokens[i].is_char(b'(') && i + 1 < tokens.len() && tokens[i + 1].is_char(b'(') {
                paren_run_end[i + 1]
            } else {
                i + 1
            };
        }
        let failed_select = vec![false; tokens.len()];

        Self {
            text,
            tokens,
            pos: 0,
            mode,
            f: NodeFactory::new(arena),
            deferred: None,
            paren_run_end,
            failed_select,
        }
    }

    /// Parse the whole input according to the mode.
    pub fn parse(mut self) -> Result<NodeList<'a>> {
        let list = match self.mode {
            ParseMode::Default => self.parse_statement_list()?,
            ParseMode::TypeName => {
                let type_name = self.parse_type_name()?;
                self.expect_eof()?;
                vec![self.f.node(type_name)]
            }
            ParseMode::PlpgsqlExpr => {
                let location = self.loc();
                let select = self.parse_plpgsql_expr()?;
                self.expect_eof()?;
                let stmt = self.f.node(select);
                vec![self.f.raw_stmt(stmt, location, 0)]
            }
            ParseMode::PlpgsqlAssign1 | ParseMode::PlpgsqlAssign2 | ParseMode::PlpgsqlAssign3 => {
                let location = self.loc();
                let assign = self.parse_plpgsql_assign()?;
                self.expect_eof()?;
                vec![self.f.raw_stmt(assign, location, 0)]
            }
        };
        Ok(self.f.list(list))
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        self.peek_at(0)
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn bump(&mut self) {
        if self.kind() != TokenKind::Eof {
            self.pos += 1;
        }
    }

    /// Location of the current token.
    #[inline]
    pub(crate) fn loc(&self) -> Location {
        Location::new(self.current().start)
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    #[inline]
    pub(crate) fn at_keyword(&self, kw: Keyword) -> bool {
        self.current().is_keyword(kw)
    }

    #[inline]
    pub(crate) fn peek_keyword(&self, offset: usize, kw: Keyword) -> bool {
        self.peek_at(offset).is_keyword(kw)
    }

    pub(crate) fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, kw: Keyword) -> Result<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.syntax_error())
        }
    }

    #[inline]
    pub(crate) fn at_char(&self, c: u8) -> bool {
        self.current().is_char(c)
    }

    pub(crate) fn eat_char(&mut self, c: u8) -> bool {
        if self.at_char(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_char(&mut self, c: u8) -> Result<()> {
        if self.eat_char(c) {
            Ok(())
        } else {
            Err(self.syntax_error())
        }
    }

    pub(crate) fn eat_kind(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.syntax_error())
        }
    }

    /// The current token's text as written.
    pub(crate) fn token_text(&self) -> &'t str {
        let token = self.current();
        self.text.get(token.start..token.end).unwrap_or("")
    }

    /// Operator spelling of the current token.
    pub(crate) fn operator_text(&self) -> &'a str {
        let token = self.current();
        if token.value.is_empty() {
            self.f.str(self.token_text())
        } else {
            self.f.str(&token.value)
        }
    }

    /// The current token's string value, copied into the arena.
    pub(crate) fn token_value(&self) -> &'a str {
        self.f.str(&self.current().value)
    }

    // ========================================================================
    // Errors and backtracking
    // ========================================================================

    /// A syntax error at the current token.
    pub(crate) fn syntax_error(&self) -> Error {
        let token = self.current();
        if let Some(deferred) = &self.deferred {
            if deferred.cursor().is_some_and(|cursor| cursor > token.start) {
                return deferred.clone();
            }
        }
        if token.kind == TokenKind::Eof {
            Error::syntax(&messages::SYNTAX_ERROR_AT_END_OF_INPUT, &[], self.text.len())
        } else {
            Error::syntax(&messages::SYNTAX_ERROR_AT_OR_NEAR, &[self.token_text()], token.start)
        }
    }

    /// An error with a specific message, pointing at `location` or, when
    /// that is unknown, at the current token.
    pub(crate) fn error_at(&self, message: &DiagnosticMessage, location: Location) -> Error {
        let cursor = location.offset().unwrap_or(self.current().start);
        Error::syntax(message, &[], cursor)
    }

    /// Run `f`, rewinding and returning `None` if it fails with a syntax
    /// error. Resource and internal errors still propagate.
    pub(crate) fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<Option<T>> {
        let saved = self.pos;
        match f(self) {
            Ok(value) => Ok(Some(value)),
            Err(err @ Error::Syntax { .. }) => {
                self.defer(err);
                self.pos = saved;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn defer(&mut self, err: Error) {
        let further = match (&self.deferred, err.cursor()) {
            (Some(existing), Some(cursor)) => existing.cursor().map_or(true, |c| cursor > c),
            _ => true,
        };
        if further {
            self.deferred = Some(err);
        }
    }

    /// Whether the current `(` (and any directly following `(`) opens a
    /// query.
    pub(crate) fn parens_lead_to_select(&self) -> bool {
        if !self.at_char(b'(') || self.failed_select[self.pos] {
            return false;
        }
        let end = self.paren_run_end[self.pos];
        self.tokens.get(end).is_some_and(starts_select)
    }

    /// Try to parse a parenthesized query at the current `(`.
    pub(crate) fn try_select_with_parens(&mut self) -> Result<Option<&'a SelectStmt<'a>>> {
        if !self.parens_lead_to_select() {
            return Ok(None);
        }
        let start = self.pos;
        let result = self.attempt(|p| p.parse_select_with_parens())?;
        if result.is_none() {
            self.failed_select[start] = true;
        }
        Ok(result)
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// The name carried by an identifier or keyword token.
    pub(crate) fn name_of(&self, token: &Token) -> &'a str {
        match token.kind {
            TokenKind::Keyword(kw) => kw.text(),
            _ => self.f.str(&token.value),
        }
    }

    /// `ColId`
    pub(crate) fn parse_col_id(&mut self) -> Result<&'a str> {
        if !is_col_id(self.current()) {
            return Err(self.syntax_error());
        }
        let name = self.name_of(self.current());
        self.bump();
        Ok(name)
    }

    /// `ColLabel`
    pub(crate) fn parse_col_label(&mut self) -> Result<&'a str> {
        if !is_col_label(self.current()) {
            return Err(self.syntax_error());
        }
        let name = self.name_of(self.current());
        self.bump();
        Ok(name)
    }

    /// `ColId [. ColLabel ...]`
    pub(crate) fn parse_any_name(&mut self) -> Result<NameList<'a>> {
        let mut names = vec![self.parse_col_id()?];
        while self.at_char(b'.') && is_col_label(self.peek_at(1)) {
            self.bump();
            names.push(self.parse_col_label()?);
        }
        Ok(self.f.arena().alloc_vec(names))
    }

    /// `'(' ColId, ... ')'`
    pub(crate) fn parse_paren_name_list(&mut self) -> Result<NameList<'a>> {
        self.expect_char(b'(')?;
        let mut names = vec![self.parse_col_id()?];
        while self.eat_char(b',') {
            names.push(self.parse_col_id()?);
        }
        self.expect_char(b')')?;
        Ok(self.f.arena().alloc_vec(names))
    }

    /// `qualified_name`: up to three dotted parts, as a relation.
    pub(crate) fn parse_qualified_name(&mut self) -> Result<RangeVar<'a>> {
        let location = self.loc();
        let names = self.parse_any_name()?;
        let (catalogname, schemaname, relname) = match *names {
            [rel] => (None, None, rel),
            [schema, rel] => (None, Some(schema), rel),
            [catalog, schema, rel] => (Some(catalog), Some(schema), rel),
            _ => {
                let joined = names.join(".");
                return Err(Error::syntax(&messages::IMPROPER_QUALIFIED_NAME, &[&joined], location.offset().unwrap_or(0)));
            }
        };
        Ok(RangeVar {
            catalogname,
            schemaname,
            relname,
            inh: true,
            relpersistence: RelPersistence::Permanent,
            alias: None,
            location,
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// `stmt [; stmt ...]`, each wrapped in a `RawStmt`.
    fn parse_statement_list(&mut self) -> Result<Vec<Node<'a>>> {
        // (statement, location, length) until the list is complete.
        let mut stmts: Vec<(Node<'a>, Location, i32)> = Vec::new();
        let mut location = Location(0);
        loop {
            let parsed = match self.parse_statement()? {
                Some(stmt) => {
                    stmts.push((stmt, location, 0));
                    true
                }
                None => false,
            };
            if self.at_char(b';') {
                let semicolon = self.current().start;
                if let Some(last) = stmts.last_mut().filter(|_| parsed) {
                    last.2 = semicolon as i32 - last.1.0;
                }
                self.bump();
                location = Location::new(semicolon + 1);
            } else if self.at_eof() {
                break;
            } else {
                return Err(self.syntax_error());
            }
        }
        tracing::trace!(statements = stmts.len(), "parsed statement list");
        Ok(stmts
            .into_iter()
            .map(|(stmt, location, len)| self.f.raw_stmt(stmt, location, len))
            .collect())
    }

    /// One statement, or `None` for an empty one.
    fn parse_statement(&mut self) -> Result<Option<Node<'a>>> {
        let stmt = match self.kind() {
            TokenKind::Eof | TokenKind::Char(b';') => return Ok(None),
            TokenKind::Char(b'(') => self.parse_select_node()?,
            TokenKind::Keyword(Keyword::Select | Keyword::Values | Keyword::Table) => self.parse_select_node()?,
            TokenKind::Keyword(Keyword::With) => self.parse_with_led_statement()?,
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert(None)?,
            TokenKind::Keyword(Keyword::Update) => self.parse_update(None)?,
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete(None)?,
            TokenKind::Keyword(Keyword::Merge) => self.parse_merge(None)?,
            _ => self.parse_utility_statement()?,
        };
        Ok(Some(stmt))
    }

    fn parse_select_node(&mut self) -> Result<Node<'a>> {
        let select = self.parse_select_stmt()?;
        Ok(self.f.node(select))
    }

    /// A statement that starts with a `WITH` clause.
    fn parse_with_led_statement(&mut self) -> Result<Node<'a>> {
        let with = self.parse_with_clause()?;
        match self.current().keyword() {
            Some(Keyword::Insert) => self.parse_insert(Some(with)),
            Some(Keyword::Update) => self.parse_update(Some(with)),
            Some(Keyword::Delete) => self.parse_delete(Some(with)),
            Some(Keyword::Merge) => self.parse_merge(Some(with)),
            _ => {
                let select = self.parse_select_after_with(with)?;
                Ok(self.f.node(select))
            }
        }
    }

    /// A `PreparableStmt`, as allowed in a common table expression.
    pub(crate) fn parse_preparable_statement(&mut self) -> Result<Node<'a>> {
        match self.current().keyword() {
            Some(Keyword::Insert) => self.parse_insert(None),
            Some(Keyword::Update) => self.parse_update(None),
            Some(Keyword::Delete) => self.parse_delete(None),
            Some(Keyword::Merge) => self.parse_merge(None),
            Some(Keyword::With) => self.parse_with_led_statement(),
            _ => self.parse_select_node(),
        }
    }

    /// A utility statement, captured whole as an `Unrecognized` node.
    fn parse_utility_statement(&mut self) -> Result<Node<'a>> {
        let words: Vec<&str> = (0..4).map(|i| leading_word(self.peek_at(i))).collect();
        let Some(mut name) = utility_statement_name(&words) else {
            return Err(self.syntax_error());
        };

        let first = self.current().start;
        let mut last_end = self.current().end;
        let mut depth = 0usize;
        let mut creates_from_query = false;
        while !self.at_eof() && !(depth == 0 && self.at_char(b';')) {
            match self.kind() {
                TokenKind::Char(b'(') => depth += 1,
                TokenKind::Char(b')') => depth = depth.saturating_sub(1),
                TokenKind::Keyword(Keyword::As) if depth == 0 => {
                    let next = self.peek_at(1);
                    creates_from_query |= starts_select(next) || next.is_char(b'(');
                }
                _ => {}
            }
            last_end = self.current().end;
            self.bump();
        }
        if name == "CreateStmt" && creates_from_query {
            name = "CreateTableAsStmt";
        }

        let text = self.text.get(first..last_end).unwrap_or("");
        tracing::debug!(kind = name, "captured utility statement");
        Ok(self.f.unrecognized(name, Location::new(first), text))
    }

    // ========================================================================
    // PL/pgSQL modes
    // ========================================================================

    /// An expression, or a target list with optional trailing clauses,
    /// returned as a `SELECT` without the keyword.
    fn parse_plpgsql_expr(&mut self) -> Result<SelectStmt<'a>> {
        let mut select = self.parse_select_body()?;
        self.parse_select_tail(&mut select, None)?;
        Ok(select)
    }

    /// `target [indirection] := expr`
    fn parse_plpgsql_assign(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        let name = if self.kind() == TokenKind::Param {
            let name = format!("${}", self.current().ival);
            self.bump();
            self.f.str(&name)
        } else {
            self.parse_col_id()?
        };
        let indirection = self.parse_opt_indirection()?;
        if !self.eat_kind(TokenKind::ColonEquals) {
            self.expect_char(b'=')?;
        }
        let val = self.parse_plpgsql_expr()?;
        let nnames = self.mode.assign_names().unwrap_or(1) as i32;
        Ok(self.f.node(PlAssignStmt {
            name,
            indirection,
            nnames,
            val: self.f.payload(val),
            location,
        }))
    }
}

/// Lower-case text of a word token, or empty.
fn leading_word(token: &Token) -> &str {
    match token.kind {
        TokenKind::Keyword(kw) => kw.text(),
        TokenKind::Ident => &token.value,
        _ => "",
    }
}
