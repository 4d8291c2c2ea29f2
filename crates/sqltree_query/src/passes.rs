//! Passes run over a freshly parsed tree, inside the call boundary.

use sqltree_ast::{expr_location, mutate, walk, walk_list, Node, NodeList, NodeTransformer, NodeVisitor, RawStmt};
use sqltree_core::{ArenaContext, Location};
use sqltree_diagnostics::Result;

/// Fill unknown `RawStmt` locations with the left-most location found
/// inside the statement.
///
/// Raw parsers that do not track statement boundaries leave
/// `stmt_location` unknown. Statements that already have one are linked
/// into the result unchanged, and when nothing needed filling the input
/// list itself is returned.
pub fn resolve_statement_locations<'a>(tree: NodeList<'a>, arena: &ArenaContext<'a>) -> Result<NodeList<'a>> {
    let _span = tracing::debug_span!("resolve_statement_locations", statements = tree.len()).entered();
    let mut resolved = 0usize;
    let mut out = Vec::with_capacity(tree.len());
    for &node in tree {
        out.push(mutate(node, &mut FillStatementLocation, &mut resolved, arena)?);
    }
    if resolved == 0 {
        return Ok(tree);
    }
    tracing::debug!(resolved, "filled statement locations");
    Ok(arena.alloc_vec(out))
}

struct FillStatementLocation;

impl<'a> NodeTransformer<'a, usize> for FillStatementLocation {
    fn transform(&mut self, node: Node<'a>, resolved: &mut usize, arena: &ArenaContext<'a>) -> Result<Option<Node<'a>>> {
        let Node::RawStmt(raw) = node else {
            return Ok(Some(node));
        };
        if raw.stmt_location.is_known() {
            return Ok(Some(node));
        }
        let location = leftmost_within(raw.stmt)?;
        if !location.is_known() {
            return Ok(Some(node));
        }
        *resolved += 1;
        Ok(Some(Node::RawStmt(arena.alloc(RawStmt {
            stmt_location: location,
            ..*raw
        }))))
    }
}

/// Every node of a statement, sub-queries included.
struct Everything;

impl<'a> NodeVisitor<'a, Location> for Everything {
    fn visit(&mut self, node: Node<'a>, leftmost: &mut Location) -> bool {
        *leftmost = leftmost.leftmost(expr_location(node));
        false
    }

    fn descend_into_subquery(&mut self, _query: Node<'a>, _leftmost: &mut Location) -> bool {
        true
    }
}

impl<'a> NodeVisitor<'a, usize> for Everything {
    fn visit(&mut self, _node: Node<'a>, count: &mut usize) -> bool {
        *count += 1;
        false
    }

    fn descend_into_subquery(&mut self, _query: Node<'a>, _count: &mut usize) -> bool {
        true
    }
}

fn leftmost_within(stmt: Node<'_>) -> Result<Location> {
    let mut leftmost = Location::UNKNOWN;
    walk(stmt, &mut Everything, &mut leftmost)?;
    Ok(leftmost)
}

/// Walk every top-level node completely, sub-queries included, and return
/// the number of nodes seen.
///
/// Kinds the tree model has no structure for are reported as warnings by
/// the walk itself.
pub fn validate(tree: NodeList<'_>) -> Result<usize> {
    let _span = tracing::debug_span!("validate", statements = tree.len()).entered();
    let mut count = 0usize;
    walk_list(tree, &mut Everything, &mut count)?;
    tracing::debug!(nodes = count, "validated tree");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqltree_ast::SelectStmt;
    use sqltree_core::MemoryScope;
    use sqltree_diagnostics::sink;
    use sqltree_nodebuilder::NodeFactory;

    #[test]
    fn test_unknown_location_filled_from_contents() {
        let scope = MemoryScope::new("test");
        let arena = ArenaContext::new(&scope);
        let f = NodeFactory::new(&arena);
        let target = f.res_target(None, Some(f.column_ref(&["a"], Location(12))), Location(12));
        let select = f.node(SelectStmt {
            target_list: f.list(vec![target]),
            ..SelectStmt::EMPTY
        });
        let tree = f.list(vec![f.raw_stmt(select, Location::UNKNOWN, 0)]);

        let resolved = resolve_statement_locations(tree, &arena).unwrap();
        assert!(!std::ptr::eq(resolved, tree));
        let raw = resolved[0].downcast::<RawStmt>().unwrap();
        assert_eq!(raw.stmt_location, Location(12));
        assert!(raw.stmt.ptr_eq(select));
    }

    #[test]
    fn test_known_locations_return_input() {
        let scope = MemoryScope::new("test");
        let arena = ArenaContext::new(&scope);
        let f = NodeFactory::new(&arena);
        let tree = f.list(vec![f.raw_stmt(f.simple_select(vec![]), Location(0), 0)]);
        let resolved = resolve_statement_locations(tree, &arena).unwrap();
        assert!(std::ptr::eq(resolved, tree));
    }

    #[test]
    fn test_validate_counts_subquery_nodes() {
        let scope = MemoryScope::new("test");
        let arena = ArenaContext::new(&scope);
        let f = NodeFactory::new(&arena);
        let inner = f.simple_select(vec![f.res_target(None, Some(f.int_const(1, Location(20))), Location(20))]);
        let sublink = f.node(sqltree_ast::SubLink {
            sub_link_type: sqltree_ast::SubLinkType::Expr,
            sub_link_id: 0,
            testexpr: None,
            oper_name: &[],
            subselect: inner,
            location: Location(7),
        });
        let outer = f.simple_select(vec![f.res_target(None, Some(sublink), Location(7))]);
        let tree = f.list(vec![f.raw_stmt(outer, Location(0), 0)]);

        let capture = sink::capture();
        // RawStmt, SelectStmt, ResTarget, SubLink, SelectStmt, ResTarget, A_Const
        assert_eq!(validate(tree).unwrap(), 7);
        assert!(capture.finish().is_empty());
    }
}
