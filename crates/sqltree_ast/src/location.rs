//! Source location of an expression.
//!
//! [`expr_location`] reports where a node starts in the query text: its own
//! stored offset when that is known to be left-most (keyword-led kinds,
//! literals, references), the left-most of its own offset and a leading
//! child for operators and tests, or a single child's location for pure
//! wrappers. Kinds with no meaningful position report
//! [`Location::UNKNOWN`].
//!
//! Resolution is iterative, so arbitrarily long operator chains do not
//! consume native stack.

use crate::generated::Node;
use sqltree_core::Location;

/// What one step of resolution found for a node.
enum Step<'a> {
    /// Final answer for this node.
    Done(Location),
    /// Fold in `own`, then continue with `next`.
    Then(Location, Option<Node<'a>>),
    /// Fold in `own`, then resolve the first list member that has a
    /// location.
    FirstOf(Location, &'a [Node<'a>]),
}

fn step(node: Node<'_>) -> Step<'_> {
    use Step::*;
    match node {
        Node::Integer(_)
        | Node::Float(_)
        | Node::Boolean(_)
        | Node::String(_)
        | Node::BitString(_)
        | Node::AStar(_)
        | Node::AIndices(_)
        | Node::AIndirection(_)
        | Node::CurrentOfExpr(_)
        | Node::Alias(_)
        | Node::RangeSubselect(_)
        | Node::RangeFunction(_)
        | Node::JoinExpr(_)
        | Node::LockingClause(_)
        | Node::IndexElem(_)
        | Node::MergeWhenClause(_)
        | Node::RawStmt(_)
        | Node::SelectStmt(_)
        | Node::InsertStmt(_)
        | Node::UpdateStmt(_)
        | Node::DeleteStmt(_)
        | Node::MergeStmt(_)
        | Node::PlAssignStmt(_) => Done(Location::UNKNOWN),

        Node::List(n) => FirstOf(Location::UNKNOWN, n.items),

        Node::AConst(n) => Done(n.location),
        Node::ParamRef(n) => Done(n.location),
        Node::ColumnRef(n) => Done(n.location),
        Node::TypeName(n) => Done(n.location),
        Node::WindowDef(n) => Done(n.location),
        Node::CaseExpr(n) => Done(n.location),
        Node::CaseWhen(n) => Done(n.location),
        Node::RowExpr(n) => Done(n.location),
        Node::CoalesceExpr(n) => Done(n.location),
        Node::MinMaxExpr(n) => Done(n.location),
        Node::AArrayExpr(n) => Done(n.location),
        Node::ResTarget(n) => Done(n.location),
        Node::GroupingSet(n) => Done(n.location),
        Node::GroupingFunc(n) => Done(n.location),
        Node::SetToDefault(n) => Done(n.location),
        Node::SqlValueFunction(n) => Done(n.location),
        Node::RangeVar(n) => Done(n.location),
        Node::RangeTableSample(n) => Done(n.location),
        Node::WithClause(n) => Done(n.location),
        Node::CommonTableExpr(n) => Done(n.location),
        Node::OnConflictClause(n) => Done(n.location),
        Node::InferClause(n) => Done(n.location),
        Node::Unrecognized(n) => Done(n.location),
        Node::IntoClause(n) => Done(n.rel.location),

        // Operator position or left operand; the right operand can't be
        // left of the operator.
        Node::AExpr(n) => Then(n.location, n.lexpr),
        Node::NamedArgExpr(n) => Then(n.location, Some(n.arg)),
        Node::NullTest(n) => Then(n.location, Some(n.arg)),
        Node::BooleanTest(n) => Then(n.location, Some(n.arg)),
        Node::SubLink(n) => Then(n.location, n.testexpr),
        // CAST(), `::`, or `type 'literal'`: any part may be left-most.
        Node::TypeCast(n) => Then(n.location.leftmost(n.type_name.location), Some(n.arg)),
        Node::CollateClause(n) => Then(Location::UNKNOWN, n.arg),
        Node::SortBy(n) => Then(Location::UNKNOWN, Some(n.node)),
        Node::MultiAssignRef(n) => Then(Location::UNKNOWN, Some(n.source)),

        Node::BoolExpr(n) => FirstOf(n.location, n.args),
        Node::FuncCall(n) => FirstOf(n.location, n.args),
    }
}

/// The left-most source offset of `node`, or unknown.
pub fn expr_location(node: Node<'_>) -> Location {
    // Each frame: accumulated location of the enclosing chain, and list
    // members still to try if the current one resolves to unknown.
    let mut pending: Vec<(Location, &[Node<'_>])> = Vec::new();
    let mut acc = Location::UNKNOWN;
    let mut current = Some(node);

    loop {
        // Resolve the current chain.
        while let Some(node) = current.take() {
            match step(node) {
                Step::Done(own) => acc = acc.leftmost(own),
                Step::Then(own, next) => {
                    acc = acc.leftmost(own);
                    current = next;
                }
                Step::FirstOf(own, items) => {
                    let outer = acc.leftmost(own);
                    if let Some((first, rest)) = items.split_first() {
                        pending.push((outer, rest));
                        acc = Location::UNKNOWN;
                        current = Some(*first);
                    } else {
                        acc = outer;
                    }
                }
            }
        }

        // Unwind list frames.
        loop {
            let Some((outer, rest)) = pending.pop() else {
                return acc;
            };
            if acc.is_known() {
                acc = outer.leftmost(acc);
            } else if let Some((next, remaining)) = rest.split_first() {
                pending.push((outer, remaining));
                current = Some(*next);
                break;
            } else {
                acc = outer;
            }
        }
    }
}

/// The left-most known location among several nodes.
pub fn leftmost_location<'a>(nodes: impl IntoIterator<Item = Node<'a>>) -> Location {
    nodes
        .into_iter()
        .map(expr_location)
        .fold(Location::UNKNOWN, Location::leftmost)
}
