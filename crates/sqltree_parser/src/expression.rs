//! Expressions: operators by precedence climbing, then primaries, function
//! calls, window specifications, and subscripts.

use sqltree_ast::*;
use sqltree_core::{check_stack_depth, Location};
use sqltree_diagnostics::{messages, Result};
use sqltree_scanner::{Keyword, TokenKind};

use crate::parser::Parser;
use crate::precedence::{infix_precedence, Precedence};
use crate::utilities::{is_col_id, is_col_label, is_type_function_name, is_type_keyword};

impl<'t, 'c, 'a> Parser<'t, 'c, 'a> {
    // ========================================================================
    // Operators
    // ========================================================================

    pub(crate) fn parse_expr(&mut self) -> Result<Node<'a>> {
        self.parse_expr_bp(Precedence::Lowest)
    }

    /// `expr [, expr ...]`
    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Node<'a>>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat_char(b',') {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    /// An expression whose operators all bind at least as tightly as `min`.
    pub(crate) fn parse_expr_bp(&mut self, min: Precedence) -> Result<Node<'a>> {
        let _guard = check_stack_depth()?;
        let mut lhs = self.parse_prefix()?;
        let mut previous = None;
        while let Some(prec) = infix_precedence(self.current(), self.peek_at(1)) {
            if prec < min {
                break;
            }
            if !prec.is_associative() && previous == Some(prec) {
                return Err(self.syntax_error());
            }
            lhs = self.parse_infix(lhs, prec)?;
            previous = Some(prec);
        }
        Ok(lhs)
    }

    /// Whether the current token is an operator usable in `USING op` or
    /// as a binary operator.
    pub(crate) fn at_operator(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Op
                | TokenKind::LessEquals
                | TokenKind::GreaterEquals
                | TokenKind::NotEquals
                | TokenKind::Char(b'+' | b'-' | b'*' | b'/' | b'%' | b'^' | b'<' | b'>' | b'=')
        )
    }

    fn operator_name(&self) -> &'a str {
        match self.kind() {
            TokenKind::LessEquals => "<=",
            TokenKind::GreaterEquals => ">=",
            TokenKind::NotEquals => "<>",
            _ => self.operator_text(),
        }
    }

    fn parse_prefix(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        match self.kind() {
            TokenKind::Keyword(Keyword::Not) => {
                self.bump();
                let arg = self.parse_expr_bp(Precedence::Not)?;
                Ok(self.f.not_expr(arg, location))
            }
            TokenKind::Char(b'-') => {
                self.bump();
                let arg = self.parse_expr_bp(Precedence::Unary)?;
                Ok(self.negate(arg, location))
            }
            TokenKind::Char(b'+') => {
                self.bump();
                let arg = self.parse_expr_bp(Precedence::Unary)?;
                Ok(self.f.simple_a_expr("+", None, Some(arg), location))
            }
            TokenKind::Op => {
                let op = self.operator_name();
                self.bump();
                let arg = self.parse_expr_bp(Precedence::Op.next())?;
                Ok(self.f.simple_a_expr(op, None, Some(arg), location))
            }
            _ => self.parse_primary(),
        }
    }

    /// Unary minus, folded into a numeric constant operand.
    fn negate(&self, arg: Node<'a>, location: Location) -> Node<'a> {
        if let Node::AConst(constant) = arg {
            match constant.val {
                ConstValue::Integer(ival) => return self.f.int_const(-ival, location),
                ConstValue::Float(fval) => {
                    let negated = match fval.strip_prefix('-') {
                        Some(positive) => positive.to_string(),
                        None => format!("-{fval}"),
                    };
                    return self.f.float_const(&negated, location);
                }
                _ => {}
            }
        }
        self.f.simple_a_expr("-", None, Some(arg), location)
    }

    fn parse_infix(&mut self, lhs: Node<'a>, prec: Precedence) -> Result<Node<'a>> {
        let location = self.loc();
        match self.kind() {
            TokenKind::Keyword(Keyword::Or) => {
                self.bump();
                let rhs = self.parse_expr_bp(prec.next())?;
                Ok(self.f.or_expr(lhs, rhs, location))
            }
            TokenKind::Keyword(Keyword::And) => {
                self.bump();
                let rhs = self.parse_expr_bp(prec.next())?;
                Ok(self.f.and_expr(lhs, rhs, location))
            }
            TokenKind::Keyword(Keyword::Is) => {
                self.bump();
                self.parse_is_test(lhs, location)
            }
            TokenKind::Keyword(Keyword::Isnull) => {
                self.bump();
                Ok(self.f.null_test(lhs, NullTestType::IsNull, location))
            }
            TokenKind::Keyword(Keyword::Notnull) => {
                self.bump();
                Ok(self.f.null_test(lhs, NullTestType::IsNotNull, location))
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.bump();
                self.parse_pattern_op(lhs, true, location)
            }
            TokenKind::Keyword(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Ilike | Keyword::Similar) => {
                self.parse_pattern_op(lhs, false, location)
            }
            TokenKind::Keyword(Keyword::At) => {
                self.bump();
                if self.eat_keyword(Keyword::Local) {
                    return Ok(self.f.system_func_call("timezone", vec![lhs], location));
                }
                self.expect_keyword(Keyword::Time)?;
                self.expect_keyword(Keyword::Zone)?;
                let zone = self.parse_expr_bp(prec.next())?;
                Ok(self.f.system_func_call("timezone", vec![zone, lhs], location))
            }
            TokenKind::Keyword(Keyword::Collate) => {
                self.bump();
                let collname = self.parse_any_name()?;
                Ok(self.f.node(CollateClause {
                    arg: Some(lhs),
                    collname,
                    location,
                }))
            }
            TokenKind::Typecast => {
                self.bump();
                let type_name = self.parse_type_name()?;
                Ok(self.f.type_cast(lhs, self.f.payload(type_name), location))
            }
            _ => self.parse_binary_op(lhs, prec, location),
        }
    }

    fn parse_binary_op(&mut self, lhs: Node<'a>, prec: Precedence, location: Location) -> Result<Node<'a>> {
        let op = self.f.names(&[self.operator_name()]);
        self.bump();

        let quantifier = match self.current().keyword() {
            Some(Keyword::Any | Keyword::Some) => Some(SubLinkType::Any),
            Some(Keyword::All) => Some(SubLinkType::All),
            _ => None,
        };
        if let Some(sub_link_type) = quantifier.filter(|_| self.peek_at(1).is_char(b'(')) {
            self.bump();
            if let Some(select) = self.try_select_with_parens()? {
                return Ok(self.sub_link(sub_link_type, Some(lhs), op, select, location));
            }
            self.expect_char(b'(')?;
            let rhs = self.parse_expr()?;
            self.expect_char(b')')?;
            let kind = if sub_link_type == SubLinkType::All {
                AExprKind::OpAll
            } else {
                AExprKind::OpAny
            };
            return Ok(self.f.a_expr(kind, op, Some(lhs), Some(rhs), location));
        }

        let rhs = self.parse_expr_bp(prec.next())?;
        Ok(self.f.a_expr(AExprKind::Op, op, Some(lhs), Some(rhs), location))
    }

    /// After `IS`: `[NOT] NULL | TRUE | FALSE | UNKNOWN | DISTINCT FROM expr`.
    fn parse_is_test(&mut self, lhs: Node<'a>, location: Location) -> Result<Node<'a>> {
        let negated = self.eat_keyword(Keyword::Not);
        let booltesttype = match self.current().keyword() {
            Some(Keyword::Null) => {
                self.bump();
                let kind = if negated { NullTestType::IsNotNull } else { NullTestType::IsNull };
                return Ok(self.f.null_test(lhs, kind, location));
            }
            Some(Keyword::Distinct) => {
                self.bump();
                self.expect_keyword(Keyword::From)?;
                let rhs = self.parse_expr_bp(Precedence::Is.next())?;
                let kind = if negated { AExprKind::NotDistinct } else { AExprKind::Distinct };
                return Ok(self.f.a_expr(kind, self.f.names(&["="]), Some(lhs), Some(rhs), location));
            }
            Some(Keyword::True) if negated => BoolTestType::IsNotTrue,
            Some(Keyword::True) => BoolTestType::IsTrue,
            Some(Keyword::False) if negated => BoolTestType::IsNotFalse,
            Some(Keyword::False) => BoolTestType::IsFalse,
            Some(Keyword::Unknown) if negated => BoolTestType::IsNotUnknown,
            Some(Keyword::Unknown) => BoolTestType::IsUnknown,
            _ => return Err(self.syntax_error()),
        };
        self.bump();
        Ok(self.f.node(BooleanTest {
            arg: lhs,
            booltesttype,
            location,
        }))
    }

    /// `[NOT] IN | BETWEEN | LIKE | ILIKE | SIMILAR TO`, with `location`
    /// at `NOT` when negated.
    fn parse_pattern_op(&mut self, lhs: Node<'a>, negated: bool, location: Location) -> Result<Node<'a>> {
        match self.current().keyword() {
            Some(Keyword::In) => {
                self.bump();
                self.parse_in(lhs, negated, location)
            }
            Some(Keyword::Between) => {
                self.bump();
                self.parse_between(lhs, negated, location)
            }
            Some(Keyword::Like) => {
                self.bump();
                let op = if negated { "!~~" } else { "~~" };
                self.parse_like(lhs, AExprKind::Like, op, "like_escape", location)
            }
            Some(Keyword::Ilike) => {
                self.bump();
                let op = if negated { "!~~*" } else { "~~*" };
                self.parse_like(lhs, AExprKind::ILike, op, "like_escape", location)
            }
            Some(Keyword::Similar) => {
                self.bump();
                self.expect_keyword(Keyword::To)?;
                let op = if negated { "!~" } else { "~" };
                self.parse_like(lhs, AExprKind::Similar, op, "similar_to_escape", location)
            }
            _ => Err(self.syntax_error()),
        }
    }

    fn parse_in(&mut self, lhs: Node<'a>, negated: bool, location: Location) -> Result<Node<'a>> {
        if !self.at_char(b'(') {
            return Err(self.syntax_error());
        }
        if let Some(select) = self.try_select_with_parens()? {
            let link = self.sub_link(SubLinkType::Any, Some(lhs), &[], select, location);
            return Ok(if negated { self.f.not_expr(link, location) } else { link });
        }
        self.bump();
        let list = self.parse_expr_list()?;
        self.expect_char(b')')?;
        let op = if negated { "<>" } else { "=" };
        let rhs = self.f.list_node(list);
        Ok(self.f.a_expr(AExprKind::In, self.f.names(&[op]), Some(lhs), Some(rhs), location))
    }

    fn parse_between(&mut self, lhs: Node<'a>, negated: bool, location: Location) -> Result<Node<'a>> {
        let symmetric = if self.eat_keyword(Keyword::Symmetric) {
            true
        } else {
            self.eat_keyword(Keyword::Asymmetric);
            false
        };
        let lower = self.parse_expr_bp(Precedence::Like.next())?;
        self.expect_keyword(Keyword::And)?;
        let upper = self.parse_expr_bp(Precedence::Like.next())?;
        let (kind, name) = match (negated, symmetric) {
            (false, false) => (AExprKind::Between, "BETWEEN"),
            (true, false) => (AExprKind::NotBetween, "NOT BETWEEN"),
            (false, true) => (AExprKind::BetweenSym, "BETWEEN SYMMETRIC"),
            (true, true) => (AExprKind::NotBetweenSym, "NOT BETWEEN SYMMETRIC"),
        };
        let bounds = self.f.list_node(vec![lower, upper]);
        Ok(self.f.a_expr(kind, self.f.names(&[name]), Some(lhs), Some(bounds), location))
    }

    /// The pattern operand of `LIKE`, `ILIKE`, and `SIMILAR TO`, with an
    /// optional `ESCAPE`. `SIMILAR TO` always goes through its escape
    /// function; the `LIKE` forms only when `ESCAPE` is given.
    fn parse_like(
        &mut self,
        lhs: Node<'a>,
        kind: AExprKind,
        op: &str,
        escape_func: &str,
        location: Location,
    ) -> Result<Node<'a>> {
        let pattern = self.parse_expr_bp(Precedence::Like.next())?;
        let escape = if self.eat_keyword(Keyword::Escape) {
            Some(self.parse_expr_bp(Precedence::Escape.next())?)
        } else {
            None
        };
        let rhs = if escape.is_some() || kind == AExprKind::Similar {
            let args = self.f.list(std::iter::once(pattern).chain(escape).collect());
            let call = self.f.func_call(
                self.f.names(&["pg_catalog", escape_func]),
                args,
                CoercionForm::ExplicitCall,
                location,
            );
            self.f.node(call)
        } else {
            pattern
        };
        Ok(self.f.a_expr(kind, self.f.names(&[op]), Some(lhs), Some(rhs), location))
    }

    fn sub_link(
        &self,
        sub_link_type: SubLinkType,
        testexpr: Option<Node<'a>>,
        oper_name: NameList<'a>,
        subselect: &'a SelectStmt<'a>,
        location: Location,
    ) -> Node<'a> {
        self.f.node(SubLink {
            sub_link_type,
            sub_link_id: 0,
            testexpr,
            oper_name,
            subselect: subselect.into_node(),
            location,
        })
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    /// A constant, reference, parenthesized expression, or call. Nested
    /// expressions recurse through [`Self::parse_expr_bp`], which holds the
    /// depth guard.
    pub(crate) fn parse_primary(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        match self.kind() {
            TokenKind::IConst => {
                let ival = self.current().ival;
                self.bump();
                Ok(self.f.int_const(ival, location))
            }
            TokenKind::FConst => {
                let node = self.f.float_const(&self.current().value, location);
                self.bump();
                Ok(node)
            }
            TokenKind::SConst => {
                let node = self.f.string_const(&self.current().value, location);
                self.bump();
                Ok(node)
            }
            TokenKind::BConst | TokenKind::XConst => {
                let node = self.f.bit_string_const(&self.current().value, location);
                self.bump();
                Ok(node)
            }
            TokenKind::Param => {
                let number = self.current().ival;
                self.bump();
                let param = self.f.param_ref(number, location);
                self.with_indirection(param)
            }
            TokenKind::Char(b'(') => self.parse_paren_expr(),
            TokenKind::Keyword(kw) => self.parse_keyword_primary(kw),
            TokenKind::Ident => self.parse_name_expr(),
            _ => Err(self.syntax_error()),
        }
    }

    fn parse_keyword_primary(&mut self, kw: Keyword) -> Result<Node<'a>> {
        let location = self.loc();
        let followed_by_paren = self.peek_at(1).is_char(b'(');
        match kw {
            Keyword::True | Keyword::False => {
                self.bump();
                Ok(self.f.bool_const(kw == Keyword::True, location))
            }
            Keyword::Null => {
                self.bump();
                Ok(self.f.null_const(location))
            }
            Keyword::Default => {
                self.bump();
                Ok(self.f.set_to_default(location))
            }
            Keyword::Case => self.parse_case(),
            Keyword::Cast => {
                self.bump();
                self.expect_char(b'(')?;
                let arg = self.parse_expr()?;
                self.expect_keyword(Keyword::As)?;
                let type_name = self.parse_type_name()?;
                self.expect_char(b')')?;
                Ok(self.f.type_cast(arg, self.f.payload(type_name), location))
            }
            Keyword::Exists if followed_by_paren => {
                self.bump();
                let select = self.parse_select_with_parens()?;
                Ok(self.sub_link(SubLinkType::Exists, None, &[], select, location))
            }
            Keyword::Array => self.parse_array(),
            Keyword::Row if followed_by_paren => {
                self.bump();
                let args = self.parse_row_body()?;
                self.finish_row(args, CoercionForm::ExplicitCall, location)
            }
            Keyword::Coalesce | Keyword::Greatest | Keyword::Least | Keyword::Nullif | Keyword::Grouping
                if followed_by_paren =>
            {
                self.parse_builtin_call(kw)
            }
            Keyword::SystemUser => {
                self.bump();
                Ok(self.f.system_func_call("system_user", Vec::new(), location))
            }
            Keyword::CurrentSchema if followed_by_paren => self.parse_name_expr(),
            Keyword::CurrentDate
            | Keyword::CurrentTime
            | Keyword::CurrentTimestamp
            | Keyword::Localtime
            | Keyword::Localtimestamp
            | Keyword::CurrentRole
            | Keyword::CurrentUser
            | Keyword::User
            | Keyword::SessionUser
            | Keyword::CurrentCatalog
            | Keyword::CurrentSchema => self.parse_sql_value_function(kw),
            _ if is_type_keyword(kw) => self.parse_type_keyword_expr(),
            _ => self.parse_name_expr(),
        }
    }

    /// `(query)`, `(expr)`, or an implicit row `(expr, expr, ...)`.
    fn parse_paren_expr(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        if let Some(select) = self.try_select_with_parens()? {
            let link = self.sub_link(SubLinkType::Expr, None, &[], select, location);
            return self.with_indirection(link);
        }
        self.expect_char(b'(')?;
        let first = self.parse_expr()?;
        if self.eat_char(b',') {
            let mut args = vec![first];
            args.extend(self.parse_expr_list()?);
            self.expect_char(b')')?;
            return self.finish_row(args, CoercionForm::ImplicitCast, location);
        }
        self.expect_char(b')')?;
        self.with_indirection(first)
    }

    /// `'(' [expr, ...] ')'` after `ROW`.
    fn parse_row_body(&mut self) -> Result<Vec<Node<'a>>> {
        self.expect_char(b'(')?;
        let args = if self.at_char(b')') {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        self.expect_char(b')')?;
        Ok(args)
    }

    fn finish_row(&mut self, args: Vec<Node<'a>>, row_format: CoercionForm, location: Location) -> Result<Node<'a>> {
        if self.at_keyword(Keyword::Overlaps) {
            return self.parse_overlaps(args, location);
        }
        Ok(self.f.node(RowExpr {
            args: self.f.list(args),
            colnames: &[],
            row_format,
            location,
        }))
    }

    /// `row OVERLAPS row`, each side a pair.
    fn parse_overlaps(&mut self, left: Vec<Node<'a>>, left_location: Location) -> Result<Node<'a>> {
        let location = self.loc();
        self.bump();
        if left.len() != 2 {
            return Err(self.error_at(&messages::WRONG_NUMBER_OF_PARAMETERS, left_location));
        }
        let right_location = self.loc();
        let right = if self.eat_keyword(Keyword::Row) {
            self.parse_row_body()?
        } else {
            self.expect_char(b'(')?;
            let mut right = vec![self.parse_expr()?];
            self.expect_char(b',')?;
            right.extend(self.parse_expr_list()?);
            self.expect_char(b')')?;
            right
        };
        if right.len() != 2 {
            return Err(self.error_at(&messages::WRONG_NUMBER_OF_PARAMETERS_RIGHT, right_location));
        }
        let mut args = left;
        args.extend(right);
        Ok(self.f.system_func_call("overlaps", args, location))
    }

    fn parse_case(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        self.expect_keyword(Keyword::Case)?;
        let arg = if self.at_keyword(Keyword::When) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let mut whens = Vec::new();
        while self.at_keyword(Keyword::When) {
            let when_location = self.loc();
            self.bump();
            let expr = self.parse_expr()?;
            self.expect_keyword(Keyword::Then)?;
            let result = self.parse_expr()?;
            whens.push(self.f.node(CaseWhen {
                expr,
                result,
                location: when_location,
            }));
        }
        if whens.is_empty() {
            return Err(self.syntax_error());
        }
        let defresult = if self.eat_keyword(Keyword::Else) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;
        Ok(self.f.node(CaseExpr {
            arg,
            args: self.f.list(whens),
            defresult,
            location,
        }))
    }

    /// `ARRAY (query)` or `ARRAY [...]`.
    fn parse_array(&mut self) -> Result<Node<'a>> {
        let location = self.loc();
        self.expect_keyword(Keyword::Array)?;
        if self.at_char(b'(') {
            let select = self.parse_select_with_parens()?;
            return Ok(self.sub_link(SubLinkType::Array, None, &[], select, location));
        }
        if !self.at_char(b'[') {
            return Err(self.syntax_error());
        }
        let array = self.parse_array_brackets()?;
        Ok(self.f.node(AArrayExpr { location, ..array }))
    }

    fn parse_array_brackets(&mut self) -> Result<AArrayExpr<'a>> {
        let _guard = check_stack_depth()?;
        let location = self.loc();
        self.expect_char(b'[')?;
        let mut elements = Vec::new();
        if self.at_char(b'[') {
            loop {
                let inner = self.parse_array_brackets()?;
                elements.push(self.f.node(inner));
                if !self.eat_char(b',') {
                    break;
                }
            }
        } else if !self.at_char(b']') {
            elements = self.parse_expr_list()?;
        }
        self.expect_char(b']')?;
        Ok(AArrayExpr {
            elements: self.f.list(elements),
            location,
        })
    }

    /// `COALESCE`, `GREATEST`, `LEAST`, `NULLIF`, and `GROUPING`, which have
    /// their own node kinds.
    fn parse_builtin_call(&mut self, kw: Keyword) -> Result<Node<'a>> {
        let location = self.loc();
        self.bump();
        self.expect_char(b'(')?;
        let args = self.parse_expr_list()?;
        self.expect_char(b')')?;
        let node = match kw {
            Keyword::Coalesce => self.f.node(CoalesceExpr {
                args: self.f.list(args),
                location,
            }),
            Keyword::Greatest | Keyword::Least => self.f.node(MinMaxExpr {
                op: if kw == Keyword::Greatest { MinMaxOp::Greatest } else { MinMaxOp::Least },
                args: self.f.list(args),
                location,
            }),
            Keyword::Nullif => {
                let &[lhs, rhs] = args.as_slice() else {
                    return Err(self.syntax_error());
                };
                self.f.a_expr(AExprKind::NullIf, self.f.names(&["="]), Some(lhs), Some(rhs), location)
            }
            _ => self.f.node(GroupingFunc {
                args: self.f.list(args),
                location,
            }),
        };
        Ok(node)
    }

    fn parse_sql_value_function(&mut self, kw: Keyword) -> Result<Node<'a>> {
        use SqlValueFunctionOp as Op;

        let location = self.loc();
        self.bump();
        let (op, with_precision) = match kw {
            Keyword::CurrentDate => (Op::CurrentDate, None),
            Keyword::CurrentTime => (Op::CurrentTime, Some(Op::CurrentTimeN)),
            Keyword::CurrentTimestamp => (Op::CurrentTimestamp, Some(Op::CurrentTimestampN)),
            Keyword::Localtime => (Op::Localtime, Some(Op::LocaltimeN)),
            Keyword::Localtimestamp => (Op::Localtimestamp, Some(Op::LocaltimestampN)),
            Keyword::CurrentRole => (Op::CurrentRole, None),
            Keyword::CurrentUser => (Op::CurrentUser, None),
            Keyword::User => (Op::User, None),
            Keyword::SessionUser => (Op::SessionUser, None),
            Keyword::CurrentCatalog => (Op::CurrentCatalog, None),
            _ => (Op::CurrentSchema, None),
        };
        match with_precision {
            Some(precise) if self.at_char(b'(') => {
                self.bump();
                let typmod = self.expect_iconst()?;
                self.expect_char(b')')?;
                Ok(self.f.sql_value_function(precise, typmod, location))
            }
            _ => Ok(self.f.sql_value_function(op, -1, location)),
        }
    }

    /// An integer literal's value.
    pub(crate) fn expect_iconst(&mut self) -> Result<i32> {
        if self.kind() != TokenKind::IConst {
            return Err(self.syntax_error());
        }
        let ival = self.current().ival;
        self.bump();
        Ok(ival)
    }

    /// A built-in type keyword: a typed literal such as `INTEGER '1'` when
    /// a string follows the type, otherwise a column or function name.
    fn parse_type_keyword_expr(&mut self) -> Result<Node<'a>> {
        let literal = self.attempt(|p| {
            let interval = p.at_keyword(Keyword::Interval);
            let type_name = p.parse_simple_type_name(true)?;
            if p.kind() != TokenKind::SConst {
                return Err(p.syntax_error());
            }
            p.parse_typed_literal(type_name, interval)
        })?;
        match literal {
            Some(node) => Ok(node),
            None => self.parse_name_expr(),
        }
    }

    /// `type 'string'`, positioned at the string.
    fn parse_typed_literal(&mut self, mut type_name: TypeName<'a>, interval: bool) -> Result<Node<'a>> {
        let location = self.loc();
        let literal = self.current().value.clone();
        self.bump();
        if interval && type_name.typmods.is_empty() {
            type_name.typmods = self.parse_opt_interval()?;
        }
        Ok(self.f.string_const_cast(&literal, location, self.f.payload(type_name)))
    }

    /// A column reference, function call, or `name 'string'` literal.
    fn parse_name_expr(&mut self) -> Result<Node<'a>> {
        let callable = is_type_function_name(self.current());
        let followed_by_paren = self.peek_at(1).is_char(b'(');
        if !is_col_id(self.current()) && !(callable && followed_by_paren) {
            return Err(self.syntax_error());
        }
        if self.kind() == TokenKind::Ident && followed_by_paren {
            if let Some(call) = self.parse_sql_syntax_function()? {
                return Ok(call);
            }
        }

        let location = self.loc();
        let mut names = vec![self.name_of(self.current())];
        self.bump();
        let mut star = false;
        while self.at_char(b'.') {
            if self.peek_at(1).is_char(b'*') {
                self.bump();
                self.bump();
                star = true;
                break;
            }
            if !is_col_label(self.peek_at(1)) {
                break;
            }
            self.bump();
            names.push(self.parse_col_label()?);
        }

        if !star && self.at_char(b'(') && (callable || names.len() > 1) {
            let funcname = self.f.arena().alloc_vec(names);
            return self.parse_func_call(funcname, location);
        }
        if !star && self.kind() == TokenKind::SConst {
            let type_name = self.f.type_name(self.f.arena().alloc_vec(names), location);
            return self.parse_typed_literal(type_name, false);
        }

        let mut fields: Vec<ColumnField<'a>> = names.into_iter().map(ColumnField::Name).collect();
        if star {
            fields.push(ColumnField::Star);
            return Ok(self.f.column_ref_fields(fields, location));
        }
        let column = self.f.column_ref_fields(fields, location);
        self.with_indirection(column)
    }

    // ========================================================================
    // Function calls
    // ========================================================================

    /// `EXTRACT`, `POSITION`, `SUBSTRING`, and `TRIM`, whose arguments use
    /// keywords instead of commas. Returns `None` for any other name.
    fn parse_sql_syntax_function(&mut self) -> Result<Option<Node<'a>>> {
        let location = self.loc();
        let name = self.token_text();
        let call = if name.eq_ignore_ascii_case("extract") {
            self.bump();
            self.expect_char(b'(')?;
            let field_location = self.loc();
            let field = match self.kind() {
                TokenKind::Ident | TokenKind::Keyword(_) => self.name_of(self.current()),
                TokenKind::SConst => self.token_value(),
                _ => return Err(self.syntax_error()),
            };
            self.bump();
            self.expect_keyword(Keyword::From)?;
            let source = self.parse_expr()?;
            self.expect_char(b')')?;
            let field = self.f.string_const(field, field_location);
            self.f.system_func_call("extract", vec![field, source], location)
        } else if name.eq_ignore_ascii_case("position") {
            self.bump();
            self.expect_char(b'(')?;
            let needle = self.parse_expr_bp(Precedence::Like.next())?;
            self.expect_keyword(Keyword::In)?;
            let haystack = self.parse_expr_bp(Precedence::Like.next())?;
            self.expect_char(b')')?;
            self.f.system_func_call("position", vec![haystack, needle], location)
        } else if name.eq_ignore_ascii_case("substring") {
            self.bump();
            self.parse_substring(location)?
        } else if name.eq_ignore_ascii_case("trim") {
            self.bump();
            self.parse_trim(location)?
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }

    fn parse_substring(&mut self, location: Location) -> Result<Node<'a>> {
        self.expect_char(b'(')?;
        if self.eat_char(b')') {
            let call = self.f.func_call(self.f.names(&["substring"]), &[], CoercionForm::ExplicitCall, location);
            return Ok(self.f.node(call));
        }
        let source = self.parse_expr()?;
        if !self.at_keyword(Keyword::From) && !self.at_keyword(Keyword::For) {
            let mut args = vec![source];
            while self.eat_char(b',') {
                args.push(self.parse_expr()?);
            }
            self.expect_char(b')')?;
            let call = self.f.func_call(
                self.f.names(&["substring"]),
                self.f.list(args),
                CoercionForm::ExplicitCall,
                location,
            );
            return Ok(self.f.node(call));
        }

        let (mut start, mut count) = (None, None);
        if self.eat_keyword(Keyword::From) {
            start = Some(self.parse_expr()?);
            if self.eat_keyword(Keyword::For) {
                count = Some(self.parse_expr()?);
            }
        } else {
            self.expect_keyword(Keyword::For)?;
            count = Some(self.parse_expr()?);
            if self.eat_keyword(Keyword::From) {
                start = Some(self.parse_expr()?);
            }
        }
        self.expect_char(b')')?;
        let args = match (start, count) {
            (Some(start), Some(count)) => vec![source, start, count],
            (Some(start), None) => vec![source, start],
            (None, count) => {
                let one = self.f.int_const(1, Location::UNKNOWN);
                std::iter::once(source).chain(Some(one)).chain(count).collect()
            }
        };
        Ok(self.f.system_func_call("substring", args, location))
    }

    /// `TRIM([BOTH | LEADING | TRAILING] [chars] FROM string)`
    fn parse_trim(&mut self, location: Location) -> Result<Node<'a>> {
        self.expect_char(b'(')?;
        let func = if self.eat_keyword(Keyword::Leading) {
            "ltrim"
        } else if self.eat_keyword(Keyword::Trailing) {
            "rtrim"
        } else {
            self.eat_keyword(Keyword::Both);
            "btrim"
        };
        let args = if self.eat_keyword(Keyword::From) {
            self.parse_expr_list()?
        } else {
            let first = self.parse_expr()?;
            if self.eat_keyword(Keyword::From) {
                let mut args = self.parse_expr_list()?;
                args.push(first);
                args
            } else {
                let mut args = vec![first];
                while self.eat_char(b',') {
                    args.push(self.parse_expr()?);
                }
                args
            }
        };
        self.expect_char(b')')?;
        Ok(self.f.system_func_call(func, args, location))
    }

    /// `name(args) [WITHIN GROUP (...)] [FILTER (...)] [OVER ...]`,
    /// positioned at the `(`.
    fn parse_func_call(&mut self, funcname: NameList<'a>, location: Location) -> Result<Node<'a>> {
        self.expect_char(b'(')?;
        let mut call = self.f.func_call(funcname, &[], CoercionForm::ExplicitCall, location);

        if self.at_char(b'*') && self.peek_at(1).is_char(b')') {
            self.bump();
            call.agg_star = true;
        } else if !self.at_char(b')') {
            if !self.eat_keyword(Keyword::All) && self.eat_keyword(Keyword::Distinct) {
                call.agg_distinct = true;
            }
            let mut args = Vec::new();
            loop {
                if self.eat_keyword(Keyword::Variadic) {
                    call.func_variadic = true;
                    args.push(self.parse_func_arg()?);
                    break;
                }
                args.push(self.parse_func_arg()?);
                if !self.eat_char(b',') {
                    break;
                }
            }
            call.args = self.f.list(args);
            if self.at_keyword(Keyword::Order) {
                self.bump();
                self.expect_keyword(Keyword::By)?;
                let order = self.parse_sort_list()?;
                call.agg_order = self.f.list(order);
            }
        }
        self.expect_char(b')')?;

        if self.at_keyword(Keyword::Within) && self.peek_keyword(1, Keyword::Group) {
            self.bump();
            self.bump();
            self.expect_char(b'(')?;
            self.expect_keyword(Keyword::Order)?;
            self.expect_keyword(Keyword::By)?;
            let order = self.parse_sort_list()?;
            call.agg_order = self.f.list(order);
            call.agg_within_group = true;
            self.expect_char(b')')?;
        }
        if self.at_keyword(Keyword::Filter) && self.peek_at(1).is_char(b'(') {
            self.bump();
            self.bump();
            self.expect_keyword(Keyword::Where)?;
            call.agg_filter = Some(self.parse_expr()?);
            self.expect_char(b')')?;
        }
        if self.at_keyword(Keyword::Over) && (self.peek_at(1).is_char(b'(') || is_col_id(self.peek_at(1))) {
            self.bump();
            let over = if self.at_char(b'(') {
                self.parse_window_specification(None)?
            } else {
                let name_location = self.loc();
                let name = self.parse_col_id()?;
                WindowDef {
                    name: Some(name),
                    refname: None,
                    partition_clause: &[],
                    order_clause: &[],
                    frame_options: FrameOptions::DEFAULTS,
                    start_offset: None,
                    end_offset: None,
                    location: name_location,
                }
            };
            call.over = Some(self.f.payload(over));
        }
        Ok(self.f.node(call))
    }

    /// An argument, possibly named with `=>` or `:=`.
    fn parse_func_arg(&mut self) -> Result<Node<'a>> {
        let named = is_type_function_name(self.current())
            && matches!(self.peek_at(1).kind, TokenKind::EqualsGreater | TokenKind::ColonEquals);
        if !named {
            return self.parse_expr();
        }
        let location = self.loc();
        let name = self.name_of(self.current());
        self.bump();
        self.bump();
        let arg = self.parse_expr()?;
        Ok(self.f.node(NamedArgExpr {
            arg,
            name,
            argnumber: -1,
            location,
        }))
    }

    // ========================================================================
    // Window specifications
    // ========================================================================

    /// `'(' [refname] [PARTITION BY ...] [ORDER BY ...] [frame] ')'`
    pub(crate) fn parse_window_specification(&mut self, name: Option<&'a str>) -> Result<WindowDef<'a>> {
        let location = self.loc();
        self.expect_char(b'(')?;

        let refname = if is_col_id(self.current())
            && !matches!(
                self.current().keyword(),
                Some(Keyword::Partition | Keyword::Range | Keyword::Rows | Keyword::Groups)
            ) {
            Some(self.parse_col_id()?)
        } else {
            None
        };
        let partition_clause = if self.at_keyword(Keyword::Partition) {
            self.bump();
            self.expect_keyword(Keyword::By)?;
            let partition = self.parse_expr_list()?;
            self.f.list(partition)
        } else {
            &[]
        };
        let order_clause = if self.at_keyword(Keyword::Order) {
            self.bump();
            self.expect_keyword(Keyword::By)?;
            let order = self.parse_sort_list()?;
            self.f.list(order)
        } else {
            &[]
        };
        let (frame_options, start_offset, end_offset) = self.parse_opt_frame_clause()?;
        self.expect_char(b')')?;

        Ok(WindowDef {
            name,
            refname,
            partition_clause,
            order_clause,
            frame_options,
            start_offset,
            end_offset,
            location,
        })
    }

    fn parse_opt_frame_clause(&mut self) -> Result<(FrameOptions, Option<Node<'a>>, Option<Node<'a>>)> {
        let mode = match self.current().keyword() {
            Some(Keyword::Range) => FrameOptions::RANGE,
            Some(Keyword::Rows) => FrameOptions::ROWS,
            Some(Keyword::Groups) => FrameOptions::GROUPS,
            _ => return Ok((FrameOptions::DEFAULTS, None, None)),
        };
        self.bump();

        let (mut options, start_offset, end_offset) = if self.eat_keyword(Keyword::Between) {
            let start_location = self.loc();
            let (start, start_offset) = self.parse_frame_bound()?;
            self.expect_keyword(Keyword::And)?;
            let end_location = self.loc();
            let (end, end_offset) = self.parse_frame_bound()?;

            // Bound flags are parsed as START_*; shifting converts to END_*.
            let options = start | FrameOptions::from_bits_retain(end.bits() << 1) | FrameOptions::BETWEEN;
            if options.contains(FrameOptions::START_UNBOUNDED_FOLLOWING) {
                return Err(self.error_at(&messages::FRAME_START_CANNOT_BE_UNBOUNDED_FOLLOWING, start_location));
            }
            if options.contains(FrameOptions::END_UNBOUNDED_PRECEDING) {
                return Err(self.error_at(&messages::FRAME_END_CANNOT_BE_UNBOUNDED_PRECEDING, end_location));
            }
            if options.contains(FrameOptions::START_CURRENT_ROW)
                && options.contains(FrameOptions::END_OFFSET_PRECEDING)
            {
                return Err(self.error_at(&messages::FRAME_CURRENT_ROW_CANNOT_HAVE_PRECEDING_ROWS, end_location));
            }
            if options.contains(FrameOptions::START_OFFSET_FOLLOWING)
                && options.intersects(FrameOptions::END_OFFSET_PRECEDING | FrameOptions::END_CURRENT_ROW)
            {
                return Err(self.error_at(&messages::FRAME_FOLLOWING_ROW_CANNOT_HAVE_PRECEDING_ROWS, end_location));
            }
            (options, start_offset, end_offset)
        } else {
            let start_location = self.loc();
            let (start, start_offset) = self.parse_frame_bound()?;
            if start.contains(FrameOptions::START_UNBOUNDED_FOLLOWING) {
                return Err(self.error_at(&messages::FRAME_START_CANNOT_BE_UNBOUNDED_FOLLOWING, start_location));
            }
            if start.contains(FrameOptions::START_OFFSET_FOLLOWING) {
                return Err(self.error_at(&messages::FRAME_FOLLOWING_ROW_CANNOT_END_WITH_CURRENT_ROW, start_location));
            }
            (start | FrameOptions::END_CURRENT_ROW, start_offset, None)
        };
        options |= FrameOptions::NONDEFAULT | mode;

        if self.eat_keyword(Keyword::Exclude) {
            if self.eat_keyword(Keyword::Current) {
                self.expect_keyword(Keyword::Row)?;
                options |= FrameOptions::EXCLUDE_CURRENT_ROW;
            } else if self.eat_keyword(Keyword::Group) {
                options |= FrameOptions::EXCLUDE_GROUP;
            } else if self.eat_keyword(Keyword::Ties) {
                options |= FrameOptions::EXCLUDE_TIES;
            } else {
                self.expect_keyword(Keyword::No)?;
                self.expect_keyword(Keyword::Others)?;
            }
        }
        Ok((options, start_offset, end_offset))
    }

    /// One frame bound, reported with `START_*` flags.
    fn parse_frame_bound(&mut self) -> Result<(FrameOptions, Option<Node<'a>>)> {
        if self.at_keyword(Keyword::Unbounded) {
            if self.peek_keyword(1, Keyword::Preceding) {
                self.bump();
                self.bump();
                return Ok((FrameOptions::START_UNBOUNDED_PRECEDING, None));
            }
            if self.peek_keyword(1, Keyword::Following) {
                self.bump();
                self.bump();
                return Ok((FrameOptions::START_UNBOUNDED_FOLLOWING, None));
            }
        }
        if self.at_keyword(Keyword::Current) && self.peek_keyword(1, Keyword::Row) {
            self.bump();
            self.bump();
            return Ok((FrameOptions::START_CURRENT_ROW, None));
        }
        let offset = self.parse_expr()?;
        if self.eat_keyword(Keyword::Preceding) {
            Ok((FrameOptions::START_OFFSET_PRECEDING, Some(offset)))
        } else {
            self.expect_keyword(Keyword::Following)?;
            Ok((FrameOptions::START_OFFSET_FOLLOWING, Some(offset)))
        }
    }

    // ========================================================================
    // Indirection
    // ========================================================================

    /// `.name`, `.*`, and `[...]` suffixes.
    pub(crate) fn parse_opt_indirection(&mut self) -> Result<NodeList<'a>> {
        let mut items = Vec::new();
        loop {
            if self.eat_char(b'.') {
                if self.eat_char(b'*') {
                    items.push(self.f.node(AStar {}));
                } else {
                    let name = self.parse_col_label()?;
                    items.push(self.f.string_value(name));
                }
            } else if self.at_char(b'[') {
                items.push(self.parse_subscript()?);
            } else {
                break;
            }
        }
        Ok(self.f.list(items))
    }

    fn parse_subscript(&mut self) -> Result<Node<'a>> {
        self.expect_char(b'[')?;
        let lower = if self.at_char(b':') {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let indices = if self.eat_char(b':') {
            let upper = if self.at_char(b']') {
                None
            } else {
                Some(self.parse_expr()?)
            };
            AIndices {
                is_slice: true,
                lidx: lower,
                uidx: upper,
            }
        } else {
            AIndices {
                is_slice: false,
                lidx: None,
                uidx: lower,
            }
        };
        self.expect_char(b']')?;
        Ok(self.f.node(indices))
    }

    fn with_indirection(&mut self, arg: Node<'a>) -> Result<Node<'a>> {
        if !self.at_char(b'.') && !self.at_char(b'[') {
            return Ok(arg);
        }
        let indirection = self.parse_opt_indirection()?;
        Ok(self.f.node(AIndirection { arg, indirection }))
    }
}
