//! Traversal tests.
//!
//! Builds small trees with the node factory and checks the walker's visit
//! order and abort behaviour, the mutator's copy semantics, sub-query
//! boundaries, and source location recovery.

use sqltree_ast::*;
use sqltree_core::{stack, ArenaContext, Location, MemoryScope};
use sqltree_diagnostics::{sink, DiagnosticCategory, Error, Result};
use sqltree_nodebuilder::NodeFactory;

/// Helper: `a + 1 > b` with the operators at 2 and 6.
fn comparison<'a>(f: &NodeFactory<'_, 'a>) -> Node<'a> {
    let sum = f.simple_a_expr(
        "+",
        Some(f.column_ref(&["a"], Location(0))),
        Some(f.int_const(1, Location(4))),
        Location(2),
    );
    f.simple_a_expr(">", Some(sum), Some(f.column_ref(&["b"], Location(8))), Location(6))
}

/// Helper: `(SELECT x)` as an expression sub-query at `location`.
fn scalar_subquery<'a>(f: &NodeFactory<'_, 'a>, location: Location) -> Node<'a> {
    let target = f.res_target(None, Some(f.column_ref(&["x"], Location(location.0 + 8))), Location(location.0 + 8));
    f.node(SubLink {
        sub_link_type: SubLinkType::Expr,
        sub_link_id: 0,
        testexpr: None,
        oper_name: &[],
        subselect: f.simple_select(vec![target]),
        location,
    })
}

/// Helper: the tags seen by a full walk of `node`.
fn visit_order(node: Node<'_>) -> Vec<NodeTag> {
    let mut seen = Vec::new();
    let mut record = |n: Node<'_>, seen: &mut Vec<NodeTag>| {
        seen.push(n.tag());
        false
    };
    walk(node, &mut record, &mut seen).unwrap();
    seen
}

fn column_name(node: Node<'_>) -> Option<&str> {
    match node.downcast::<ColumnRef>()?.fields {
        [ColumnField::Name(name)] => Some(*name),
        _ => None,
    }
}

/// Visits everything, sub-queries included.
struct Descend;

impl<'a> NodeVisitor<'a, Vec<NodeTag>> for Descend {
    fn visit(&mut self, node: Node<'a>, seen: &mut Vec<NodeTag>) -> bool {
        seen.push(node.tag());
        false
    }

    fn descend_into_subquery(&mut self, _query: Node<'a>, _seen: &mut Vec<NodeTag>) -> bool {
        true
    }
}

/// Replaces every reference to one column.
struct ReplaceColumn<'a> {
    name: &'static str,
    with: Node<'a>,
}

impl<'a> NodeTransformer<'a, usize> for ReplaceColumn<'a> {
    fn transform(&mut self, node: Node<'a>, replaced: &mut usize, _arena: &ArenaContext<'a>) -> Result<Option<Node<'a>>> {
        if column_name(node) == Some(self.name) {
            *replaced += 1;
            return Ok(Some(self.with));
        }
        Ok(None)
    }
}

// ============================================================================
// Walker
// ============================================================================

#[test]
fn test_walk_visits_operands_in_order() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let expr = comparison(&f);

    assert_eq!(
        visit_order(expr),
        vec![NodeTag::AExpr, NodeTag::AExpr, NodeTag::ColumnRef, NodeTag::AConst, NodeTag::ColumnRef]
    );
}

#[test]
fn test_walk_aborts_on_true() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let expr = comparison(&f);

    let mut seen = Vec::new();
    let mut stop_at_const = |n: Node<'_>, seen: &mut Vec<NodeTag>| {
        seen.push(n.tag());
        n.tag() == NodeTag::AConst
    };
    assert!(walk(expr, &mut stop_at_const, &mut seen).unwrap());
    assert_eq!(seen.last(), Some(&NodeTag::AConst));
    assert_eq!(seen.iter().filter(|&&t| t == NodeTag::ColumnRef).count(), 1);
}

#[test]
fn test_walk_children_skips_root() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let expr = comparison(&f);

    let mut seen = Vec::new();
    let mut record = |n: Node<'_>, seen: &mut Vec<NodeTag>| {
        seen.push(n.tag());
        false
    };
    walk_children(expr, &mut record, &mut seen).unwrap();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], NodeTag::AExpr);
}

#[test]
fn test_subquery_is_shallow_unless_descended() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let sublink = scalar_subquery(&f, Location(7));

    assert_eq!(visit_order(sublink), vec![NodeTag::SubLink, NodeTag::SelectStmt]);

    let mut seen = Vec::new();
    walk(sublink, &mut Descend, &mut seen).unwrap();
    assert_eq!(
        seen,
        vec![NodeTag::SubLink, NodeTag::SelectStmt, NodeTag::ResTarget, NodeTag::ColumnRef]
    );
    assert_eq!(collect_nodes(sublink).unwrap().len(), 4);
}

#[test]
fn test_unrecognized_kind_warns_and_walk_continues() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let list = [
        f.column_ref(&["a"], Location(0)),
        f.unrecognized("CreateStmt", Location(3), "CREATE TABLE t ()"),
        f.column_ref(&["b"], Location(22)),
    ];

    let capture = sink::capture();
    let mut seen = Vec::new();
    let mut record = |n: Node<'_>, seen: &mut Vec<NodeTag>| {
        seen.push(n.tag());
        false
    };
    assert!(!walk_list(&list, &mut record, &mut seen).unwrap());
    let diagnostics = capture.finish();

    assert_eq!(seen, vec![NodeTag::ColumnRef, NodeTag::Unrecognized, NodeTag::ColumnRef]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message_text, "unrecognized node type: CreateStmt");
    assert_eq!(diagnostics[0].category, DiagnosticCategory::Warning);
    assert_eq!(diagnostics[0].location, Location(3));
}

#[test]
fn test_walk_depth_is_bounded() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let mut expr = f.int_const(0, Location(0));
    for i in 1..50 {
        expr = f.simple_a_expr("+", Some(expr), Some(f.int_const(i, Location(i * 4))), Location(i * 4 - 2));
    }

    let saved = stack::snapshot();
    stack::set_max_depth(10);
    let mut never = |_: Node<'_>, _: &mut ()| false;
    let result = walk(expr, &mut never, &mut ());
    let depth_after = stack::current_depth();
    stack::restore(saved);

    assert!(matches!(result, Err(Error::StackDepth(_))));
    assert_eq!(depth_after, 0);
}

// ============================================================================
// Mutator
// ============================================================================

#[test]
fn test_mutate_replaces_and_keeps_original() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let expr = comparison(&f);

    let mut replace = ReplaceColumn {
        name: "a",
        with: f.int_const(42, Location(0)),
    };
    let mut replaced = 0;
    let copy = mutate(expr, &mut replace, &mut replaced, &arena).unwrap();

    assert_eq!(replaced, 1);
    assert_ne!(copy, expr);
    assert!(!copy.ptr_eq(expr));

    let original = collect_nodes(expr).unwrap();
    assert_eq!(original.iter().filter(|&&n| column_name(n) == Some("a")).count(), 1);
    let rebuilt = collect_nodes(copy).unwrap();
    assert!(rebuilt.iter().all(|&n| column_name(n) != Some("a")));
    assert_eq!(rebuilt.len(), original.len());
}

#[test]
fn test_mutate_identity_is_structurally_equal() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let expr = f.and_expr(comparison(&f), scalar_subquery(&f, Location(14)), Location(10));

    let mut keep = ReplaceColumn {
        name: "nothing",
        with: f.null_const(Location::UNKNOWN),
    };
    let mut replaced = 0;
    let copy = mutate(expr, &mut keep, &mut replaced, &arena).unwrap();
    assert_eq!(replaced, 0);
    assert_eq!(copy, expr);
    assert_eq!(serde_json::to_value(copy).unwrap(), serde_json::to_value(expr).unwrap());
}

#[test]
fn test_mutate_links_subquery_unchanged() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let sublink = scalar_subquery(&f, Location(0));

    // `x` lives inside the sub-query, which is not descended into.
    let mut replace = ReplaceColumn {
        name: "x",
        with: f.int_const(1, Location(8)),
    };
    let mut replaced = 0;
    let copy = mutate(sublink, &mut replace, &mut replaced, &arena).unwrap();
    assert_eq!(replaced, 0);

    let original = sublink.downcast::<SubLink>().unwrap();
    let rebuilt = copy.downcast::<SubLink>().unwrap();
    assert!(!std::ptr::eq(original, rebuilt));
    assert!(rebuilt.subselect.ptr_eq(original.subselect));
}

#[test]
fn test_mutate_rejects_wrong_kind_for_typed_field() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let cast = f.type_cast(f.string_const("1", Location(0)), f.system_type_name("int4", Location(5)), Location(3));

    struct TypeToColumn;
    impl<'a> NodeTransformer<'a, ()> for TypeToColumn {
        fn transform(&mut self, node: Node<'a>, _ctx: &mut (), arena: &ArenaContext<'a>) -> Result<Option<Node<'a>>> {
            if node.tag() != NodeTag::TypeName {
                return Ok(None);
            }
            Ok(Some(NodeFactory::new(arena).column_ref(&["int4"], Location(5))))
        }
    }
    let result = mutate(cast, &mut TypeToColumn, &mut (), &arena);
    assert!(matches!(result, Err(Error::Internal(_))));
}

// ============================================================================
// Locations
// ============================================================================

#[test]
fn test_operator_location_is_left_operand() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    assert_eq!(expr_location(comparison(&f)), Location(0));
}

#[test]
fn test_typecast_location_is_leftmost_part() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);

    // 'x'::int4 with the literal at 7
    let postfix = f.type_cast(f.string_const("x", Location(7)), f.system_type_name("int4", Location(12)), Location(10));
    assert_eq!(expr_location(postfix), Location(7));

    // date '2024-01-01' with the type name first
    let prefix = f.string_const_cast("2024-01-01", Location(12), f.system_type_name("date", Location(7)));
    assert_eq!(expr_location(prefix), Location(7));
}

#[test]
fn test_bool_expr_location_uses_first_located_arg() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let unlocated = f.column_ref(&["u"], Location::UNKNOWN);
    let expr = f.bool_expr(
        BoolExprType::Or,
        vec![unlocated, f.column_ref(&["a"], Location(3)), f.column_ref(&["b"], Location(1))],
        Location(5),
    );
    assert_eq!(expr_location(expr), Location(3));
}

#[test]
fn test_wrappers_and_statements() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);

    let sort = f.sort_by(f.column_ref(&["a"], Location(9)), SortByDir::Desc, SortByNulls::Default, &[], Location(11));
    assert_eq!(expr_location(sort), Location(9));

    let select = f.simple_select(vec![f.res_target(None, Some(f.int_const(1, Location(7))), Location(7))]);
    assert_eq!(expr_location(select), Location::UNKNOWN);

    let nodes = [select, f.int_const(2, Location(9)), f.column_ref(&["c"], Location(4))];
    assert_eq!(leftmost_location(nodes), Location(4));
}

#[test]
fn test_long_operator_chain_location() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let mut expr = f.column_ref(&["c0"], Location(7));
    for i in 1..100_000usize {
        expr = f.simple_a_expr("+", Some(expr), Some(f.column_ref(&["c"], Location((7 + i * 5) as i32))), Location((5 + i * 5) as i32));
    }
    assert_eq!(expr_location(expr), Location(7));
}

// ============================================================================
// Tags and serialization
// ============================================================================

#[test]
fn test_canonical_names() {
    assert_eq!(NodeTag::AConst.name(), "A_Const");
    assert_eq!(NodeTag::PlAssignStmt.name(), "PLAssignStmt");
    assert_eq!(NodeTag::from_name("SQLValueFunction"), Some(NodeTag::SqlValueFunction));
    assert_eq!(NodeTag::from_name("CreateStmt"), None);
    assert!(NodeTag::ALL.iter().all(|&tag| NodeTag::from_name(tag.name()) == Some(tag)));
}

#[test]
fn test_node_serializes_under_canonical_name() {
    let scope = MemoryScope::new("test");
    let arena = ArenaContext::new(&scope);
    let f = NodeFactory::new(&arena);
    let json = serde_json::to_value(comparison(&f)).unwrap();
    assert!(json["A_Expr"]["lexpr"]["A_Expr"]["rexpr"]["A_Const"].is_object());
    assert!(json["A_Expr"]["rexpr"]["ColumnRef"].is_object());
}
