//! Read-only traversal over the node graph.
//!
//! [`walk`] offers a node to the visitor and then recurses into its children
//! in a fixed per-kind order; the first `true` returned by the visitor stops
//! the whole traversal. Children are visited in the order the clauses are
//! written, with the exceptions the raw walker has always made (`WITH` is
//! visited after the body of a statement, `INTO` right after `DISTINCT`):
//!
//! | kind | children, in order |
//! |---|---|
//! | `SelectStmt` | distinct, into, targets, from, where, group, having, window, values, sort, offset, count, locking, with, larg, rarg |
//! | `InsertStmt` | relation, cols, select, on conflict, returning, with |
//! | `UpdateStmt` | relation, targets, where, from, returning, with |
//! | `DeleteStmt` | relation, using, where, returning, with |
//! | `MergeStmt` | relation, source, join condition, when clauses, returning, with |
//! | `FuncCall` | args, agg order, agg filter, over |
//! | `CaseExpr` | arg, each `CaseWhen` (then its expr and result), default |
//!
//! Clause sequences are visited element by element. Names, operator names,
//! column-reference fields, and alias column lists are plain data, not nodes.
//!
//! Sub-query boundaries (`SubLink.subselect`, `RangeSubselect.subquery`,
//! `CommonTableExpr.ctequery`, `IntoClause.view_query`) are shallow: the
//! nested statement is offered to the visitor, but its clauses are only
//! walked when [`NodeVisitor::descend_into_subquery`] says so.
//!
//! An [`Unrecognized`](crate::node::Unrecognized) node is reported as a
//! warning and treated as a leaf.

use crate::generated::Node;
use crate::node::*;
use sqltree_core::check_stack_depth;
use sqltree_diagnostics::{messages, sink, Diagnostic, Result};

/// Callbacks driving [`walk`].
pub trait NodeVisitor<'a, C: ?Sized> {
    /// Inspect `node`. Returning `true` aborts the traversal.
    fn visit(&mut self, node: Node<'a>, ctx: &mut C) -> bool;

    /// Whether to walk the clauses of a nested statement at a sub-query
    /// boundary. The statement itself has already been offered to
    /// [`visit`](Self::visit).
    fn descend_into_subquery(&mut self, _query: Node<'a>, _ctx: &mut C) -> bool {
        false
    }
}

impl<'a, C: ?Sized, F> NodeVisitor<'a, C> for F
where
    F: FnMut(Node<'a>, &mut C) -> bool,
{
    #[inline]
    fn visit(&mut self, node: Node<'a>, ctx: &mut C) -> bool {
        self(node, ctx)
    }
}

/// Visit `node` and everything reachable from it.
///
/// Returns `Ok(true)` if the visitor aborted, `Ok(false)` after a complete
/// traversal, and an error if the recursion ceiling was hit.
pub fn walk<'a, C, V>(node: Node<'a>, visitor: &mut V, ctx: &mut C) -> Result<bool>
where
    C: ?Sized,
    V: NodeVisitor<'a, C> + ?Sized,
{
    Walker { visitor, ctx }.node(node)
}

/// Visit the children of `node` without offering `node` itself.
pub fn walk_children<'a, C, V>(node: Node<'a>, visitor: &mut V, ctx: &mut C) -> Result<bool>
where
    C: ?Sized,
    V: NodeVisitor<'a, C> + ?Sized,
{
    let _guard = check_stack_depth()?;
    Walker { visitor, ctx }.children(node)
}

/// Walk each element of a sequence in order.
pub fn walk_list<'a, C, V>(list: &[Node<'a>], visitor: &mut V, ctx: &mut C) -> Result<bool>
where
    C: ?Sized,
    V: NodeVisitor<'a, C> + ?Sized,
{
    Walker { visitor, ctx }.list(list)
}

macro_rules! try_walk {
    ($e:expr) => {
        if $e? {
            return Ok(true);
        }
    };
}

struct Walker<'w, C: ?Sized, V: ?Sized> {
    visitor: &'w mut V,
    ctx: &'w mut C,
}

impl<'a, C, V> Walker<'_, C, V>
where
    C: ?Sized,
    V: NodeVisitor<'a, C> + ?Sized,
{
    fn node(&mut self, node: Node<'a>) -> Result<bool> {
        let _guard = check_stack_depth()?;
        if self.visitor.visit(node, self.ctx) {
            return Ok(true);
        }
        self.children(node)
    }

    fn opt(&mut self, node: Option<Node<'a>>) -> Result<bool> {
        match node {
            Some(node) => self.node(node),
            None => Ok(false),
        }
    }

    fn list(&mut self, list: &[Node<'a>]) -> Result<bool> {
        for &node in list {
            try_walk!(self.node(node));
        }
        Ok(false)
    }

    fn subquery(&mut self, query: Node<'a>) -> Result<bool> {
        let _guard = check_stack_depth()?;
        if self.visitor.visit(query, self.ctx) {
            return Ok(true);
        }
        if self.visitor.descend_into_subquery(query, self.ctx) {
            self.children(query)
        } else {
            Ok(false)
        }
    }

    fn alias(&mut self, alias: Option<&'a Alias<'a>>) -> Result<bool> {
        self.opt(alias.map(Node::Alias))
    }

    fn with(&mut self, with: Option<&'a WithClause<'a>>) -> Result<bool> {
        self.opt(with.map(Node::WithClause))
    }

    fn children(&mut self, node: Node<'a>) -> Result<bool> {
        match node {
            Node::Integer(_)
            | Node::Float(_)
            | Node::Boolean(_)
            | Node::String(_)
            | Node::BitString(_)
            | Node::AConst(_)
            | Node::ParamRef(_)
            | Node::AStar(_)
            | Node::ColumnRef(_)
            | Node::SetToDefault(_)
            | Node::SqlValueFunction(_)
            | Node::CurrentOfExpr(_)
            | Node::Alias(_) => Ok(false),
            Node::List(n) => self.list(n.items),
            Node::AExpr(n) => {
                try_walk!(self.opt(n.lexpr));
                self.opt(n.rexpr)
            }
            Node::BoolExpr(n) => self.list(n.args),
            Node::FuncCall(n) => self.func_call(n),
            Node::NamedArgExpr(n) => self.node(n.arg),
            Node::TypeCast(n) => {
                try_walk!(self.node(n.arg));
                self.node(Node::TypeName(n.type_name))
            }
            Node::TypeName(n) => self.list(n.typmods),
            Node::CollateClause(n) => self.opt(n.arg),
            Node::SortBy(n) => self.node(n.node),
            Node::WindowDef(n) => self.window_def(n),
            Node::SubLink(n) => {
                try_walk!(self.opt(n.testexpr));
                self.subquery(n.subselect)
            }
            Node::CaseExpr(n) => {
                try_walk!(self.opt(n.arg));
                try_walk!(self.list(n.args));
                self.opt(n.defresult)
            }
            Node::CaseWhen(n) => {
                try_walk!(self.node(n.expr));
                self.node(n.result)
            }
            Node::RowExpr(n) => self.list(n.args),
            Node::CoalesceExpr(n) => self.list(n.args),
            Node::MinMaxExpr(n) => self.list(n.args),
            Node::NullTest(n) => self.node(n.arg),
            Node::BooleanTest(n) => self.node(n.arg),
            Node::AIndices(n) => {
                try_walk!(self.opt(n.lidx));
                self.opt(n.uidx)
            }
            Node::AIndirection(n) => {
                try_walk!(self.node(n.arg));
                self.list(n.indirection)
            }
            Node::AArrayExpr(n) => self.list(n.elements),
            Node::ResTarget(n) => {
                try_walk!(self.list(n.indirection));
                self.opt(n.val)
            }
            Node::MultiAssignRef(n) => self.node(n.source),
            Node::GroupingSet(n) => self.list(n.content),
            Node::GroupingFunc(n) => self.list(n.args),
            Node::RangeVar(n) => self.alias(n.alias),
            Node::RangeSubselect(n) => {
                try_walk!(self.subquery(n.subquery));
                self.alias(n.alias)
            }
            Node::RangeFunction(n) => {
                try_walk!(self.list(n.functions));
                self.alias(n.alias)
            }
            Node::RangeTableSample(n) => {
                try_walk!(self.node(n.relation));
                try_walk!(self.list(n.args));
                self.opt(n.repeatable)
            }
            Node::JoinExpr(n) => self.join_expr(n),
            Node::WithClause(n) => self.list(n.ctes),
            Node::CommonTableExpr(n) => self.subquery(n.ctequery),
            Node::LockingClause(n) => self.list(n.locked_rels),
            Node::IntoClause(n) => {
                try_walk!(self.node(Node::RangeVar(n.rel)));
                match n.view_query {
                    Some(query) => self.subquery(query),
                    None => Ok(false),
                }
            }
            Node::OnConflictClause(n) => self.on_conflict(n),
            Node::InferClause(n) => {
                try_walk!(self.list(n.index_elems));
                self.opt(n.where_clause)
            }
            Node::IndexElem(n) => self.opt(n.expr),
            Node::MergeWhenClause(n) => {
                try_walk!(self.opt(n.condition));
                try_walk!(self.list(n.target_list));
                self.list(n.values)
            }
            Node::RawStmt(n) => self.node(n.stmt),
            Node::SelectStmt(n) => self.select_stmt(n),
            Node::InsertStmt(n) => self.insert_stmt(n),
            Node::UpdateStmt(n) => self.update_stmt(n),
            Node::DeleteStmt(n) => self.delete_stmt(n),
            Node::MergeStmt(n) => self.merge_stmt(n),
            Node::PlAssignStmt(n) => {
                try_walk!(self.list(n.indirection));
                self.node(Node::SelectStmt(n.val))
            }
            Node::Unrecognized(n) => {
                report_unrecognized(n);
                Ok(false)
            }
        }
    }

    fn func_call(&mut self, n: &'a FuncCall<'a>) -> Result<bool> {
        try_walk!(self.list(n.args));
        try_walk!(self.list(n.agg_order));
        try_walk!(self.opt(n.agg_filter));
        self.opt(n.over.map(Node::WindowDef))
    }

    fn window_def(&mut self, n: &'a WindowDef<'a>) -> Result<bool> {
        try_walk!(self.list(n.partition_clause));
        try_walk!(self.list(n.order_clause));
        try_walk!(self.opt(n.start_offset));
        self.opt(n.end_offset)
    }

    fn join_expr(&mut self, n: &'a JoinExpr<'a>) -> Result<bool> {
        try_walk!(self.node(n.larg));
        try_walk!(self.node(n.rarg));
        try_walk!(self.opt(n.quals));
        self.alias(n.alias)
    }

    fn on_conflict(&mut self, n: &'a OnConflictClause<'a>) -> Result<bool> {
        try_walk!(self.opt(n.infer.map(Node::InferClause)));
        try_walk!(self.list(n.target_list));
        self.opt(n.where_clause)
    }

    fn select_stmt(&mut self, n: &'a SelectStmt<'a>) -> Result<bool> {
        if let Some(distinct) = n.distinct_clause {
            try_walk!(self.list(distinct));
        }
        try_walk!(self.opt(n.into_clause.map(Node::IntoClause)));
        try_walk!(self.list(n.target_list));
        try_walk!(self.list(n.from_clause));
        try_walk!(self.opt(n.where_clause));
        try_walk!(self.list(n.group_clause));
        try_walk!(self.opt(n.having_clause));
        try_walk!(self.list(n.window_clause));
        try_walk!(self.list(n.values_lists));
        try_walk!(self.list(n.sort_clause));
        try_walk!(self.opt(n.limit_offset));
        try_walk!(self.opt(n.limit_count));
        try_walk!(self.list(n.locking_clause));
        try_walk!(self.with(n.with_clause));
        try_walk!(self.opt(n.larg.map(Node::SelectStmt)));
        self.opt(n.rarg.map(Node::SelectStmt))
    }

    fn insert_stmt(&mut self, n: &'a InsertStmt<'a>) -> Result<bool> {
        try_walk!(self.node(Node::RangeVar(n.relation)));
        try_walk!(self.list(n.cols));
        try_walk!(self.opt(n.select_stmt));
        try_walk!(self.opt(n.on_conflict_clause.map(Node::OnConflictClause)));
        try_walk!(self.list(n.returning_list));
        self.with(n.with_clause)
    }

    fn update_stmt(&mut self, n: &'a UpdateStmt<'a>) -> Result<bool> {
        try_walk!(self.node(Node::RangeVar(n.relation)));
        try_walk!(self.list(n.target_list));
        try_walk!(self.opt(n.where_clause));
        try_walk!(self.list(n.from_clause));
        try_walk!(self.list(n.returning_list));
        self.with(n.with_clause)
    }

    fn delete_stmt(&mut self, n: &'a DeleteStmt<'a>) -> Result<bool> {
        try_walk!(self.node(Node::RangeVar(n.relation)));
        try_walk!(self.list(n.using_clause));
        try_walk!(self.opt(n.where_clause));
        try_walk!(self.list(n.returning_list));
        self.with(n.with_clause)
    }

    fn merge_stmt(&mut self, n: &'a MergeStmt<'a>) -> Result<bool> {
        try_walk!(self.node(Node::RangeVar(n.relation)));
        try_walk!(self.node(n.source_relation));
        try_walk!(self.node(n.join_condition));
        try_walk!(self.list(n.merge_when_clauses));
        try_walk!(self.list(n.returning_list));
        self.with(n.with_clause)
    }
}

pub(crate) fn report_unrecognized(n: &Unrecognized<'_>) {
    sink::report(Diagnostic::with_location(
        n.location,
        &messages::UNRECOGNIZED_NODE_TYPE,
        &[n.name],
    ));
}

/// Collect every node reachable from `node`, in visit order, descending
/// into sub-queries.
pub fn collect_nodes<'a>(node: Node<'a>) -> Result<Vec<Node<'a>>> {
    struct Collect;
    impl<'a> NodeVisitor<'a, Vec<Node<'a>>> for Collect {
        fn visit(&mut self, node: Node<'a>, out: &mut Vec<Node<'a>>) -> bool {
            out.push(node);
            false
        }

        fn descend_into_subquery(&mut self, _query: Node<'a>, _out: &mut Vec<Node<'a>>) -> bool {
            true
        }
    }

    let mut out = Vec::new();
    walk(node, &mut Collect, &mut out)?;
    Ok(out)
}
