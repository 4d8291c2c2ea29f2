//! Parser integration tests.
//!
//! Parses query text with the built-in raw parser and checks the shape of
//! the resulting tree, the statement boundaries, and the syntax errors
//! reported for malformed input.

use sqltree_ast::*;
use sqltree_core::{ArenaContext, Location, MemoryScope};
use sqltree_diagnostics::Error;
use sqltree_options::{ParseMode, ParseOptions};
use sqltree_parser::{RawParser, SqlParser};

/// Helper: parse `sql` in the default mode and return the `RawStmt` nodes.
fn parse_raw<'a>(arena: &ArenaContext<'a>, sql: &str) -> Vec<&'a RawStmt<'a>> {
    parse_raw_with(arena, sql, &ParseOptions::default())
}

fn parse_raw_with<'a>(arena: &ArenaContext<'a>, sql: &str, options: &ParseOptions) -> Vec<&'a RawStmt<'a>> {
    let list = SqlParser.parse(sql, options, arena).unwrap();
    list.iter()
        .map(|node| node.downcast::<RawStmt>().expect("top-level node is a RawStmt"))
        .collect()
}

/// Helper: the statement of a single-statement input.
fn parse_one<'a>(arena: &ArenaContext<'a>, sql: &str) -> Node<'a> {
    let stmts = parse_raw(arena, sql);
    assert_eq!(stmts.len(), 1, "expected one statement in {sql:?}");
    stmts[0].stmt
}

fn parse_select<'a>(arena: &ArenaContext<'a>, sql: &str) -> &'a SelectStmt<'a> {
    parse_one(arena, sql).downcast::<SelectStmt>().expect("SelectStmt")
}

/// Helper: the value of the first target of `SELECT <expr>`.
fn parse_expr<'a>(arena: &ArenaContext<'a>, expr: &str) -> Node<'a> {
    let select = parse_select(arena, &format!("SELECT {expr}"));
    target_value(select.target_list[0])
}

fn target_value(target: Node<'_>) -> Node<'_> {
    target.downcast::<ResTarget>().and_then(|t| t.val).expect("ResTarget with a value")
}

/// Helper: the syntax error produced by `sql`.
fn parse_error(sql: &str) -> (String, usize) {
    parse_error_with(sql, &ParseOptions::default())
}

fn parse_error_with(sql: &str, options: &ParseOptions) -> (String, usize) {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    match SqlParser.parse(sql, options, &arena) {
        Err(Error::Syntax { message, cursor, .. }) => (message, cursor),
        Err(other) => panic!("expected a syntax error, got {other:?}"),
        Ok(_) => panic!("expected {sql:?} to fail"),
    }
}

fn names<'a>(list: NameList<'a>) -> Vec<&'a str> {
    list.to_vec()
}

fn int_value(node: Node<'_>) -> Option<i32> {
    match node {
        Node::AConst(AConst {
            val: ConstValue::Integer(ival),
            ..
        }) => Some(*ival),
        _ => None,
    }
}

// ============================================================================
// Statement lists
// ============================================================================

#[test]
fn test_select_one() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmts = parse_raw(&arena, "SELECT 1");
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].stmt_location, Location(0));
    assert_eq!(stmts[0].stmt_len, 0);

    let select = stmts[0].stmt.downcast::<SelectStmt>().unwrap();
    assert_eq!(select.target_list.len(), 1);
    let value = target_value(select.target_list[0]);
    assert_eq!(int_value(value), Some(1));
    assert_eq!(expr_location(value), Location(7));
}

#[test]
fn test_statement_boundaries() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmts = parse_raw(&arena, "SELECT 1; SELECT 2");
    assert_eq!(stmts.len(), 2);
    assert_eq!((stmts[0].stmt_location, stmts[0].stmt_len), (Location(0), 8));
    assert_eq!((stmts[1].stmt_location, stmts[1].stmt_len), (Location(9), 0));
}

#[test]
fn test_empty_statements_are_skipped() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    assert!(parse_raw(&arena, "").is_empty());
    assert!(parse_raw(&arena, " ; ;").is_empty());
    assert_eq!(parse_raw(&arena, "SELECT 1;;").len(), 1);
}

#[test]
fn test_syntax_error_at_token() {
    let (message, cursor) = parse_error("SELEC 1");
    assert_eq!(message, "syntax error at or near \"SELEC\"");
    assert_eq!(cursor, 0);

    let (message, cursor) = parse_error("SELECT 1 FROM WHERE");
    assert_eq!(message, "syntax error at or near \"WHERE\"");
    assert_eq!(cursor, 14);
}

#[test]
fn test_syntax_error_at_end_of_input() {
    let sql = "SELECT 1 +";
    let (message, cursor) = parse_error(sql);
    assert_eq!(message, "syntax error at end of input");
    assert_eq!(cursor, sql.len());
}

#[test]
fn test_utility_statements_are_captured() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmts = parse_raw(&arena, "CREATE TABLE t (a int); CREATE TABLE u AS SELECT 1; VACUUM");
    let captured: Vec<_> = stmts
        .iter()
        .map(|raw| {
            let node = raw.stmt.downcast::<Unrecognized>().expect("Unrecognized");
            (node.name, node.text)
        })
        .collect();
    assert_eq!(
        captured,
        vec![
            ("CreateStmt", "CREATE TABLE t (a int)"),
            ("CreateTableAsStmt", "CREATE TABLE u AS SELECT 1"),
            ("VacuumStmt", "VACUUM"),
        ]
    );
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_arithmetic_precedence() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "1 + 2 * 3");
    let Node::AExpr(add) = expr else {
        panic!("expected A_Expr, got {expr:?}");
    };
    assert_eq!(names(add.name), vec!["+"]);
    assert_eq!(add.lexpr.and_then(int_value), Some(1));
    let Some(Node::AExpr(mul)) = add.rexpr else {
        panic!("expected multiplication on the right");
    };
    assert_eq!(names(mul.name), vec!["*"]);
}

#[test]
fn test_boolean_flattening() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "a AND b AND c OR d");
    let Node::BoolExpr(or) = expr else {
        panic!("expected BoolExpr");
    };
    assert_eq!(or.boolop, BoolExprType::Or);
    assert_eq!(or.args.len(), 2);
    let Node::BoolExpr(and) = or.args[0] else {
        panic!("expected AND on the left");
    };
    assert_eq!(and.boolop, BoolExprType::And);
    assert_eq!(and.args.len(), 3);
}

#[test]
fn test_negative_literals_fold() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "-5");
    assert_eq!(int_value(expr), Some(-5));
    assert_eq!(expr_location(expr), Location(7));

    let expr = parse_expr(&arena, "-a");
    assert!(matches!(expr, Node::AExpr(e) if e.lexpr.is_none() && names(e.name) == ["-"]));
}

#[test]
fn test_comparisons_do_not_chain() {
    let (message, cursor) = parse_error("SELECT 1 < 2 < 3");
    assert_eq!(message, "syntax error at or near \"<\"");
    assert_eq!(cursor, 13);
}

#[test]
fn test_in_list_and_subquery() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "a IN (1, 2)");
    let Node::AExpr(in_list) = expr else {
        panic!("expected A_Expr");
    };
    assert_eq!(in_list.kind, AExprKind::In);
    assert_eq!(names(in_list.name), vec!["="]);
    assert!(matches!(in_list.rexpr, Some(Node::List(l)) if l.items.len() == 2));

    let expr = parse_expr(&arena, "a NOT IN (SELECT b FROM t)");
    let Node::BoolExpr(not) = expr else {
        panic!("expected NOT");
    };
    assert_eq!(not.boolop, BoolExprType::Not);
    assert!(matches!(not.args[0], Node::SubLink(s) if s.sub_link_type == SubLinkType::Any));
}

#[test]
fn test_between_and_like() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "x NOT BETWEEN 1 AND 10");
    assert!(matches!(expr, Node::AExpr(e) if e.kind == AExprKind::NotBetween && names(e.name) == ["NOT BETWEEN"]));

    let expr = parse_expr(&arena, "name LIKE 'a%' ESCAPE '!'");
    let Node::AExpr(like) = expr else {
        panic!("expected A_Expr");
    };
    assert_eq!(like.kind, AExprKind::Like);
    assert_eq!(names(like.name), vec!["~~"]);
    let Some(Node::FuncCall(escape)) = like.rexpr else {
        panic!("expected like_escape call");
    };
    assert_eq!(names(escape.funcname), vec!["pg_catalog", "like_escape"]);
    assert_eq!(escape.args.len(), 2);
}

#[test]
fn test_null_and_distinct_tests() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "a IS NOT NULL");
    assert!(matches!(expr, Node::NullTest(t) if t.nulltesttype == NullTestType::IsNotNull));

    let expr = parse_expr(&arena, "a IS DISTINCT FROM b");
    assert!(matches!(expr, Node::AExpr(e) if e.kind == AExprKind::Distinct));

    let expr = parse_expr(&arena, "a IS NOT TRUE");
    assert!(matches!(expr, Node::BooleanTest(t) if t.booltesttype == BoolTestType::IsNotTrue));
}

#[test]
fn test_typecasts() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "'1'::int");
    let Node::TypeCast(cast) = expr else {
        panic!("expected TypeCast");
    };
    assert_eq!(names(cast.type_name.names), vec!["pg_catalog", "int4"]);
    assert_eq!(cast.location, Location(10));
    assert_eq!(expr_location(expr), Location(7));

    let expr = parse_expr(&arena, "CAST(x AS varchar(20))");
    let Node::TypeCast(cast) = expr else {
        panic!("expected TypeCast");
    };
    assert_eq!(names(cast.type_name.names), vec!["pg_catalog", "varchar"]);
    assert_eq!(cast.type_name.typmods.len(), 1);
}

#[test]
fn test_typed_literals() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "date '2024-01-01'");
    let Node::TypeCast(cast) = expr else {
        panic!("expected TypeCast");
    };
    assert_eq!(names(cast.type_name.names), vec!["date"]);
    assert_eq!(cast.location, Location::UNKNOWN);
    assert!(matches!(cast.arg, Node::AConst(c) if c.val == ConstValue::String("2024-01-01")));

    let expr = parse_expr(&arena, "interval '1' day");
    let Node::TypeCast(cast) = expr else {
        panic!("expected TypeCast");
    };
    assert_eq!(names(cast.type_name.names), vec!["pg_catalog", "interval"]);
    assert_eq!(cast.type_name.typmods.first().copied().and_then(int_value), Some(1 << 3));
}

#[test]
fn test_function_call_modifiers() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "count(*)");
    assert!(matches!(expr, Node::FuncCall(f) if f.agg_star && f.args.is_empty()));

    let expr = parse_expr(
        &arena,
        "sum(DISTINCT x ORDER BY x) FILTER (WHERE x > 0) OVER (PARTITION BY y ORDER BY z)",
    );
    let Node::FuncCall(call) = expr else {
        panic!("expected FuncCall");
    };
    assert!(call.agg_distinct);
    assert_eq!(call.agg_order.len(), 1);
    assert!(call.agg_filter.is_some());
    let over = call.over.expect("window");
    assert_eq!(over.partition_clause.len(), 1);
    assert_eq!(over.order_clause.len(), 1);
    assert_eq!(over.frame_options, FrameOptions::DEFAULTS);
}

#[test]
fn test_named_arguments() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "make_interval(days => 10)");
    let Node::FuncCall(call) = expr else {
        panic!("expected FuncCall");
    };
    assert!(matches!(call.args[0], Node::NamedArgExpr(n) if n.name == "days" && n.argnumber == -1));
}

#[test]
fn test_window_frame() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "sum(x) OVER (ORDER BY y ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)");
    let Node::FuncCall(call) = expr else {
        panic!("expected FuncCall");
    };
    let frame = call.over.unwrap().frame_options;
    assert!(frame.contains(
        FrameOptions::NONDEFAULT
            | FrameOptions::ROWS
            | FrameOptions::BETWEEN
            | FrameOptions::START_UNBOUNDED_PRECEDING
            | FrameOptions::END_CURRENT_ROW
    ));
}

#[test]
fn test_invalid_window_frames() {
    let (message, _) = parse_error("SELECT sum(x) OVER (ROWS BETWEEN UNBOUNDED FOLLOWING AND CURRENT ROW)");
    assert_eq!(message, "frame start cannot be UNBOUNDED FOLLOWING");
    let (message, _) = parse_error("SELECT sum(x) OVER (ROWS BETWEEN CURRENT ROW AND 1 PRECEDING)");
    assert_eq!(message, "frame starting from current row cannot have preceding rows");
}

#[test]
fn test_case_expression() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "CASE WHEN a THEN 1 WHEN b THEN 2 ELSE 3 END");
    let Node::CaseExpr(case) = expr else {
        panic!("expected CaseExpr");
    };
    assert!(case.arg.is_none());
    assert_eq!(case.args.len(), 2);
    assert!(case.args.iter().all(|w| matches!(w, Node::CaseWhen(_))));
    assert_eq!(case.defresult.and_then(int_value), Some(3));
}

#[test]
fn test_rows_and_overlaps() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "(1, 2)");
    assert!(matches!(expr, Node::RowExpr(r) if r.args.len() == 2 && r.row_format == CoercionForm::ImplicitCast));

    let expr = parse_expr(&arena, "(a, b) OVERLAPS (c, d)");
    assert!(matches!(expr, Node::FuncCall(f) if names(f.funcname) == ["pg_catalog", "overlaps"] && f.args.len() == 4));

    let (message, cursor) = parse_error("SELECT (a, b, c) OVERLAPS (d, e)");
    assert_eq!(message, "wrong number of parameters on left side of OVERLAPS expression");
    assert_eq!(cursor, 7);
}

#[test]
fn test_indirection() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "SELECT (a).b[1], c[1:2], t.*");

    let Node::AIndirection(field) = target_value(select.target_list[0]) else {
        panic!("expected A_Indirection");
    };
    assert!(matches!(field.indirection[0], Node::String(s) if s.sval == "b"));
    assert!(matches!(field.indirection[1], Node::AIndices(i) if !i.is_slice && i.uidx.is_some()));

    let Node::AIndirection(slice) = target_value(select.target_list[1]) else {
        panic!("expected A_Indirection");
    };
    assert!(matches!(slice.indirection[0], Node::AIndices(i) if i.is_slice));

    let Node::ColumnRef(star) = target_value(select.target_list[2]) else {
        panic!("expected ColumnRef");
    };
    assert_eq!(star.fields, &[ColumnField::Name("t"), ColumnField::Star]);
}

#[test]
fn test_special_syntax_functions() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "extract(year FROM ts)");
    let Node::FuncCall(call) = expr else {
        panic!("expected FuncCall");
    };
    assert_eq!(names(call.funcname), vec!["pg_catalog", "extract"]);
    assert_eq!(call.funcformat, CoercionForm::SqlSyntax);
    assert!(matches!(call.args[0], Node::AConst(c) if c.val == ConstValue::String("year")));

    let expr = parse_expr(&arena, "trim(both 'x' FROM s)");
    let Node::FuncCall(call) = expr else {
        panic!("expected FuncCall");
    };
    assert_eq!(names(call.funcname), vec!["pg_catalog", "btrim"]);
    assert!(matches!(call.args[0], Node::ColumnRef(_)));
}

#[test]
fn test_sql_value_functions() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let expr = parse_expr(&arena, "current_timestamp(3)");
    assert!(matches!(expr, Node::SqlValueFunction(f) if f.op == SqlValueFunctionOp::CurrentTimestampN && f.typmod == 3));
    let expr = parse_expr(&arena, "current_user");
    assert!(matches!(expr, Node::SqlValueFunction(f) if f.op == SqlValueFunctionOp::CurrentUser && f.typmod == -1));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_joins() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "SELECT * FROM a JOIN b ON a.id = b.id LEFT JOIN c USING (id)");
    assert_eq!(select.from_clause.len(), 1);
    let Node::JoinExpr(outer) = select.from_clause[0] else {
        panic!("expected JoinExpr");
    };
    assert_eq!(outer.jointype, JoinType::Left);
    assert_eq!(names(outer.using_clause), vec!["id"]);
    let Node::JoinExpr(inner) = outer.larg else {
        panic!("expected nested JoinExpr");
    };
    assert_eq!(inner.jointype, JoinType::Inner);
    assert!(inner.quals.is_some());
}

#[test]
fn test_from_items() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(
        &arena,
        "SELECT * FROM ONLY s.t AS x (a, b), LATERAL (SELECT 1) sub, generate_series(1, 3) WITH ORDINALITY g",
    );
    assert_eq!(select.from_clause.len(), 3);

    let Node::RangeVar(rel) = select.from_clause[0] else {
        panic!("expected RangeVar");
    };
    assert_eq!((rel.schemaname, rel.relname, rel.inh), (Some("s"), "t", false));
    let alias = rel.alias.unwrap();
    assert_eq!((alias.aliasname, names(alias.colnames)), ("x", vec!["a", "b"]));

    assert!(matches!(select.from_clause[1], Node::RangeSubselect(r) if r.lateral && r.alias.is_some()));
    assert!(matches!(select.from_clause[2], Node::RangeFunction(f) if f.ordinality && f.functions.len() == 1));
}

#[test]
fn test_set_operation_precedence() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "SELECT 1 UNION ALL SELECT 2 INTERSECT SELECT 3");
    assert_eq!(select.op, SetOperation::Union);
    assert!(select.all);
    let rarg = select.rarg.unwrap();
    assert_eq!(rarg.op, SetOperation::Intersect);
    assert!(!rarg.all);
}

#[test]
fn test_group_by_and_having() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(
        &arena,
        "SELECT a, count(*) FROM t GROUP BY ROLLUP (a, b), GROUPING SETS ((), a) HAVING count(*) > 1",
    );
    assert_eq!(select.group_clause.len(), 2);
    assert!(matches!(select.group_clause[0], Node::GroupingSet(g) if g.kind == GroupingSetKind::Rollup && g.content.len() == 2));
    let Node::GroupingSet(sets) = select.group_clause[1] else {
        panic!("expected GroupingSet");
    };
    assert_eq!(sets.kind, GroupingSetKind::Sets);
    assert!(matches!(sets.content[0], Node::GroupingSet(g) if g.kind == GroupingSetKind::Empty));
    assert!(select.having_clause.is_some());
}

#[test]
fn test_order_limit_offset() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "SELECT a FROM t ORDER BY a DESC NULLS LAST LIMIT 10 OFFSET 5");
    let Node::SortBy(sort) = select.sort_clause[0] else {
        panic!("expected SortBy");
    };
    assert_eq!((sort.sortby_dir, sort.sortby_nulls), (SortByDir::Desc, SortByNulls::Last));
    assert_eq!(select.limit_count.and_then(int_value), Some(10));
    assert_eq!(select.limit_offset.and_then(int_value), Some(5));
    assert_eq!(select.limit_option, LimitOption::Count);

    let select = parse_select(&arena, "SELECT a FROM t ORDER BY a FETCH FIRST 3 ROWS WITH TIES");
    assert_eq!(select.limit_option, LimitOption::WithTies);
    assert_eq!(select.limit_count.and_then(int_value), Some(3));
}

#[test]
fn test_clause_conflicts() {
    let (message, cursor) = parse_error("(SELECT 1 ORDER BY 1) ORDER BY 1");
    assert_eq!(message, "multiple ORDER BY clauses not allowed");
    assert_eq!(cursor, 31);

    let (message, _) = parse_error("(SELECT 1 LIMIT 1) LIMIT 2");
    assert_eq!(message, "multiple LIMIT clauses not allowed");

    let (message, _) = parse_error("SELECT a FROM t FETCH FIRST 3 ROWS WITH TIES");
    assert_eq!(message, "WITH TIES cannot be specified without ORDER BY clause");
}

#[test]
fn test_locking_clauses() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "SELECT * FROM t FOR UPDATE OF t SKIP LOCKED");
    let Node::LockingClause(lock) = select.locking_clause[0] else {
        panic!("expected LockingClause");
    };
    assert_eq!(lock.strength, LockClauseStrength::ForUpdate);
    assert_eq!(lock.wait_policy, LockWaitPolicy::Skip);
    assert_eq!(lock.locked_rels.len(), 1);
}

#[test]
fn test_with_clause() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "WITH RECURSIVE x (n) AS NOT MATERIALIZED (SELECT 1) SELECT n FROM x");
    let with = select.with_clause.expect("WITH clause");
    assert!(with.recursive);
    let Node::CommonTableExpr(cte) = with.ctes[0] else {
        panic!("expected CommonTableExpr");
    };
    assert_eq!(cte.ctename, "x");
    assert_eq!(names(cte.aliascolnames), vec!["n"]);
    assert_eq!(cte.ctematerialized, CteMaterialize::Never);
    assert!(matches!(cte.ctequery, Node::SelectStmt(_)));
}

#[test]
fn test_values_and_table() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "VALUES (1, 'a'), (2, 'b')");
    assert_eq!(select.values_lists.len(), 2);
    assert!(matches!(select.values_lists[0], Node::List(l) if l.items.len() == 2));

    let select = parse_select(&arena, "TABLE t");
    assert_eq!(select.from_clause.len(), 1);
    assert!(matches!(target_value(select.target_list[0]), Node::ColumnRef(c) if c.fields == [ColumnField::Star]));
}

#[test]
fn test_select_into() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let select = parse_select(&arena, "SELECT a INTO TEMP TABLE snapshot FROM t");
    let into = select.into_clause.expect("INTO clause");
    assert_eq!(into.rel.relname, "snapshot");
    assert_eq!(into.rel.relpersistence, RelPersistence::Temp);
    assert_eq!(select.from_clause.len(), 1);
}

// ============================================================================
// Data modification
// ============================================================================

#[test]
fn test_insert_on_conflict() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmt = parse_one(
        &arena,
        "INSERT INTO t (a, b) VALUES (1, 2) ON CONFLICT (a) DO UPDATE SET b = excluded.b RETURNING *",
    );
    let Node::InsertStmt(insert) = stmt else {
        panic!("expected InsertStmt");
    };
    assert_eq!(insert.relation.relname, "t");
    assert_eq!(insert.cols.len(), 2);
    assert!(matches!(insert.select_stmt, Some(Node::SelectStmt(s)) if s.values_lists.len() == 1));
    let conflict = insert.on_conflict_clause.expect("ON CONFLICT");
    assert_eq!(conflict.action, OnConflictAction::Update);
    let infer = conflict.infer.expect("conflict target");
    assert!(matches!(infer.index_elems[0], Node::IndexElem(e) if e.name == Some("a")));
    assert_eq!(conflict.target_list.len(), 1);
    assert_eq!(insert.returning_list.len(), 1);
}

#[test]
fn test_insert_forms() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let Node::InsertStmt(insert) = parse_one(&arena, "INSERT INTO t DEFAULT VALUES") else {
        panic!("expected InsertStmt");
    };
    assert!(insert.select_stmt.is_none());

    let Node::InsertStmt(insert) = parse_one(&arena, "INSERT INTO t OVERRIDING SYSTEM VALUE SELECT * FROM u") else {
        panic!("expected InsertStmt");
    };
    assert_eq!(insert.override_, OverridingKind::SystemValue);
    assert!(insert.select_stmt.is_some());

    let Node::InsertStmt(insert) = parse_one(&arena, "INSERT INTO t (SELECT 1) ON CONFLICT ON CONSTRAINT pk DO NOTHING") else {
        panic!("expected InsertStmt");
    };
    assert!(insert.cols.is_empty());
    let conflict = insert.on_conflict_clause.unwrap();
    assert_eq!(conflict.action, OnConflictAction::Nothing);
    assert_eq!(conflict.infer.and_then(|i| i.conname), Some("pk"));
}

#[test]
fn test_update_multi_assignment() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmt = parse_one(&arena, "UPDATE t SET (a, b) = (1, 2), c = 3 WHERE id = 1");
    let Node::UpdateStmt(update) = stmt else {
        panic!("expected UpdateStmt");
    };
    assert_eq!(update.target_list.len(), 3);
    let assigned: Vec<_> = update.target_list[..2]
        .iter()
        .map(|t| match target_value(*t) {
            Node::MultiAssignRef(m) => (m.colno, m.ncolumns),
            other => panic!("expected MultiAssignRef, got {other:?}"),
        })
        .collect();
    assert_eq!(assigned, vec![(1, 2), (2, 2)]);
    assert!(update.where_clause.is_some());
}

#[test]
fn test_update_row_mismatch() {
    let (message, cursor) = parse_error("UPDATE t SET (a, b) = (1, 2, 3)");
    assert_eq!(message, "number of columns does not match number of values");
    assert_eq!(cursor, 22);
}

#[test]
fn test_update_where_current_of() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let Node::UpdateStmt(update) = parse_one(&arena, "UPDATE t AS x SET a = DEFAULT WHERE CURRENT OF cur") else {
        panic!("expected UpdateStmt");
    };
    assert_eq!(update.relation.alias.map(|a| a.aliasname), Some("x"));
    assert!(matches!(target_value(update.target_list[0]), Node::SetToDefault(_)));
    assert!(matches!(update.where_clause, Some(Node::CurrentOfExpr(c)) if c.cursor_name == "cur"));
}

#[test]
fn test_delete_using() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmt = parse_one(&arena, "DELETE FROM t x USING u WHERE x.id = u.id RETURNING x.id");
    let Node::DeleteStmt(delete) = stmt else {
        panic!("expected DeleteStmt");
    };
    assert_eq!(delete.relation.alias.map(|a| a.aliasname), Some("x"));
    assert_eq!(delete.using_clause.len(), 1);
    assert!(delete.where_clause.is_some());
    assert_eq!(delete.returning_list.len(), 1);
}

#[test]
fn test_merge() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmt = parse_one(
        &arena,
        "MERGE INTO t USING s ON t.id = s.id \
         WHEN MATCHED AND s.gone THEN DELETE \
         WHEN MATCHED THEN UPDATE SET v = s.v \
         WHEN NOT MATCHED THEN INSERT (id, v) VALUES (s.id, s.v)",
    );
    let Node::MergeStmt(merge) = stmt else {
        panic!("expected MergeStmt");
    };
    assert!(matches!(merge.source_relation, Node::RangeVar(r) if r.relname == "s"));
    let clauses: Vec<_> = merge
        .merge_when_clauses
        .iter()
        .map(|c| {
            let c = c.downcast::<MergeWhenClause>().unwrap();
            (c.match_kind, c.command_type, c.condition.is_some(), c.values.len())
        })
        .collect();
    assert_eq!(
        clauses,
        vec![
            (MergeMatchKind::Matched, CmdType::Delete, true, 0),
            (MergeMatchKind::Matched, CmdType::Update, false, 0),
            (MergeMatchKind::NotMatchedByTarget, CmdType::Insert, false, 2),
        ]
    );
}

#[test]
fn test_merge_rejects_insert_when_matched() {
    let (message, _) = parse_error("MERGE INTO t USING s ON true WHEN MATCHED THEN INSERT VALUES (1)");
    assert_eq!(message, "syntax error at or near \"INSERT\"");
}

#[test]
fn test_with_led_dml() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let stmt = parse_one(&arena, "WITH gone AS (DELETE FROM t RETURNING id) INSERT INTO log SELECT id FROM gone");
    let Node::InsertStmt(insert) = stmt else {
        panic!("expected InsertStmt");
    };
    let with = insert.with_clause.expect("WITH clause");
    assert!(matches!(with.ctes[0], Node::CommonTableExpr(c) if matches!(c.ctequery, Node::DeleteStmt(_))));
}

// ============================================================================
// Parse modes
// ============================================================================

#[test]
fn test_type_name_mode() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let options = ParseOptions::with_mode(ParseMode::TypeName);
    let list = SqlParser.parse("varchar(10)[]", &options, &arena).unwrap();
    let type_name = list[0].downcast::<TypeName>().expect("TypeName");
    assert_eq!(names(type_name.names), vec!["pg_catalog", "varchar"]);
    assert_eq!(type_name.typmods.first().copied().and_then(int_value), Some(10));
    assert_eq!(type_name.array_bounds, &[-1]);

    let (message, _) = parse_error_with("float(54)", &options);
    assert_eq!(message, "precision for type float must be less than 54 bits");
}

#[test]
fn test_plpgsql_expr_mode() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let options = ParseOptions::with_mode(ParseMode::PlpgsqlExpr);
    let stmts = parse_raw_with(&arena, "a + 1", &options);
    let select = stmts[0].stmt.downcast::<SelectStmt>().unwrap();
    assert_eq!(select.target_list.len(), 1);
    assert!(select.from_clause.is_empty());
}

#[test]
fn test_plpgsql_assign_mode() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let options = ParseOptions::with_mode(ParseMode::PlpgsqlAssign2);
    let stmts = parse_raw_with(&arena, "rec.field := x * 2", &options);
    let assign = stmts[0].stmt.downcast::<PlAssignStmt>().expect("PLAssignStmt");
    assert_eq!(assign.name, "rec");
    assert_eq!(assign.nnames, 2);
    assert_eq!(assign.indirection.len(), 1);
    assert_eq!(assign.val.target_list.len(), 1);
}

// ============================================================================
// Resource limits
// ============================================================================

#[test]
fn test_deep_nesting_is_bounded() {
    // Every nesting level costs several native frames before the depth check trips.
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let depth = 10_000;
            let sql = format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth));
            let scope = MemoryScope::new("test");
            let arena = ArenaContext::new(&scope);
            let result = SqlParser.parse(&sql, &ParseOptions::default(), &arena);
            matches!(result, Err(Error::StackDepth(_)))
        })
        .unwrap();
    assert!(handle.join().unwrap());
}

#[test]
fn test_tree_serializes_with_canonical_names() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let list = SqlParser.parse("SELECT 1", &ParseOptions::default(), &arena).unwrap();
    let json = serde_json::to_value(list).unwrap();
    assert!(json[0]["RawStmt"]["stmt"]["SelectStmt"]["targetList"][0]["ResTarget"].is_object());
}
