//! Copy-producing transformation over the node graph.
//!
//! [`mutate`] offers each node to the transformer first. A returned
//! replacement is used as-is and not descended into; otherwise the node is
//! rebuilt as a fresh same-kind node whose children are the mutated
//! children. The input tree is never modified, so the result can share the
//! arena with it.
//!
//! Traversal order and sub-query boundaries are the same as the walker's.
//! A sub-query that is not descended into is linked into the new tree
//! unchanged.

use crate::generated::{Node, NodePayload};
use crate::node::*;
use crate::walker::report_unrecognized;
use sqltree_core::{check_stack_depth, ArenaContext};
use sqltree_diagnostics::{format_message, messages, Error, Result};

/// Callbacks driving [`mutate`].
pub trait NodeTransformer<'a, C: ?Sized> {
    /// Return a replacement for `node`, or `None` to rebuild it from its
    /// mutated children.
    fn transform(
        &mut self,
        node: Node<'a>,
        ctx: &mut C,
        arena: &ArenaContext<'a>,
    ) -> Result<Option<Node<'a>>>;

    /// Whether to rebuild a nested statement at a sub-query boundary.
    fn descend_into_subquery(&mut self, _query: Node<'a>, _ctx: &mut C) -> bool {
        false
    }
}

impl<'a, C: ?Sized, F> NodeTransformer<'a, C> for F
where
    F: FnMut(Node<'a>, &mut C) -> Option<Node<'a>>,
{
    #[inline]
    fn transform(
        &mut self,
        node: Node<'a>,
        ctx: &mut C,
        _arena: &ArenaContext<'a>,
    ) -> Result<Option<Node<'a>>> {
        Ok(self(node, ctx))
    }
}

/// Produce a transformed copy of `node`, allocating into the current scope
/// of `arena`.
pub fn mutate<'a, C, T>(
    node: Node<'a>,
    transformer: &mut T,
    ctx: &mut C,
    arena: &ArenaContext<'a>,
) -> Result<Node<'a>>
where
    C: ?Sized,
    T: NodeTransformer<'a, C> + ?Sized,
{
    Rebuild {
        transformer,
        ctx,
        arena,
    }
    .node(node)
}

/// Rebuild `node` from its mutated children without offering `node` itself
/// to the transformer.
pub fn mutate_children<'a, C, T>(
    node: Node<'a>,
    transformer: &mut T,
    ctx: &mut C,
    arena: &ArenaContext<'a>,
) -> Result<Node<'a>>
where
    C: ?Sized,
    T: NodeTransformer<'a, C> + ?Sized,
{
    let _guard = check_stack_depth()?;
    Rebuild {
        transformer,
        ctx,
        arena,
    }
    .children(node)
}

struct Rebuild<'m, 'a, C: ?Sized, T: ?Sized> {
    transformer: &'m mut T,
    ctx: &'m mut C,
    arena: &'m ArenaContext<'a>,
}

impl<'a, C, T> Rebuild<'_, 'a, C, T>
where
    C: ?Sized,
    T: NodeTransformer<'a, C> + ?Sized,
{
    fn node(&mut self, node: Node<'a>) -> Result<Node<'a>> {
        let _guard = check_stack_depth()?;
        if let Some(replacement) = self.transformer.transform(node, self.ctx, self.arena)? {
            return Ok(replacement);
        }
        self.children(node)
    }

    fn opt(&mut self, node: Option<Node<'a>>) -> Result<Option<Node<'a>>> {
        node.map(|n| self.node(n)).transpose()
    }

    fn list(&mut self, list: NodeList<'a>) -> Result<NodeList<'a>> {
        if list.is_empty() {
            return Ok(list);
        }
        let mut out = Vec::with_capacity(list.len());
        for &node in list {
            out.push(self.node(node)?);
        }
        Ok(self.arena.alloc_vec(out))
    }

    /// Mutate a child whose field is typed, rejecting a replacement of the
    /// wrong kind.
    fn typed<P: NodePayload<'a>>(&mut self, payload: &'a P) -> Result<&'a P> {
        let node = self.node(payload.into_node())?;
        P::from_node(node).ok_or_else(|| {
            Error::internal(format_message(
                messages::UNEXPECTED_NODE_KIND.message,
                &[node.tag().name(), P::TAG.name()],
            ))
        })
    }

    fn typed_opt<P: NodePayload<'a>>(&mut self, payload: Option<&'a P>) -> Result<Option<&'a P>> {
        payload.map(|p| self.typed(p)).transpose()
    }

    fn subquery(&mut self, query: Node<'a>) -> Result<Node<'a>> {
        let _guard = check_stack_depth()?;
        if let Some(replacement) = self.transformer.transform(query, self.ctx, self.arena)? {
            return Ok(replacement);
        }
        if self.transformer.descend_into_subquery(query, self.ctx) {
            self.children(query)
        } else {
            Ok(query)
        }
    }

    #[inline]
    fn alloc<P: NodePayload<'a>>(&self, payload: P) -> Node<'a> {
        self.arena.alloc(payload).into_node()
    }

    fn children(&mut self, node: Node<'a>) -> Result<Node<'a>> {
        let copy = match node {
            Node::Integer(n) => self.alloc(*n),
            Node::Float(n) => self.alloc(*n),
            Node::Boolean(n) => self.alloc(*n),
            Node::String(n) => self.alloc(*n),
            Node::BitString(n) => self.alloc(*n),
            Node::AConst(n) => self.alloc(*n),
            Node::ParamRef(n) => self.alloc(*n),
            Node::AStar(n) => self.alloc(*n),
            Node::ColumnRef(n) => self.alloc(*n),
            Node::SetToDefault(n) => self.alloc(*n),
            Node::SqlValueFunction(n) => self.alloc(*n),
            Node::CurrentOfExpr(n) => self.alloc(*n),
            Node::Alias(n) => self.alloc(*n),
            Node::Unrecognized(n) => {
                report_unrecognized(n);
                self.alloc(*n)
            }
            Node::List(n) => {
                let items = self.list(n.items)?;
                self.alloc(List { items })
            }
            Node::AExpr(n) => {
                let lexpr = self.opt(n.lexpr)?;
                let rexpr = self.opt(n.rexpr)?;
                self.alloc(AExpr { lexpr, rexpr, ..*n })
            }
            Node::BoolExpr(n) => {
                let args = self.list(n.args)?;
                self.alloc(BoolExpr { args, ..*n })
            }
            Node::FuncCall(n) => self.func_call(n)?,
            Node::NamedArgExpr(n) => {
                let arg = self.node(n.arg)?;
                self.alloc(NamedArgExpr { arg, ..*n })
            }
            Node::TypeCast(n) => {
                let arg = self.node(n.arg)?;
                let type_name = self.typed(n.type_name)?;
                self.alloc(TypeCast {
                    arg,
                    type_name,
                    ..*n
                })
            }
            Node::TypeName(n) => {
                let typmods = self.list(n.typmods)?;
                self.alloc(TypeName { typmods, ..*n })
            }
            Node::CollateClause(n) => {
                let arg = self.opt(n.arg)?;
                self.alloc(CollateClause { arg, ..*n })
            }
            Node::SortBy(n) => {
                let inner = self.node(n.node)?;
                self.alloc(SortBy { node: inner, ..*n })
            }
            Node::WindowDef(n) => {
                let rebuilt = self.window_def(n)?;
                self.alloc(rebuilt)
            }
            Node::SubLink(n) => {
                let testexpr = self.opt(n.testexpr)?;
                let subselect = self.subquery(n.subselect)?;
                self.alloc(SubLink {
                    testexpr,
                    subselect,
                    ..*n
                })
            }
            Node::CaseExpr(n) => {
                let arg = self.opt(n.arg)?;
                let args = self.list(n.args)?;
                let defresult = self.opt(n.defresult)?;
                self.alloc(CaseExpr {
                    arg,
                    args,
                    defresult,
                    ..*n
                })
            }
            Node::CaseWhen(n) => {
                let expr = self.node(n.expr)?;
                let result = self.node(n.result)?;
                self.alloc(CaseWhen { expr, result, ..*n })
            }
            Node::RowExpr(n) => {
                let args = self.list(n.args)?;
                self.alloc(RowExpr { args, ..*n })
            }
            Node::CoalesceExpr(n) => {
                let args = self.list(n.args)?;
                self.alloc(CoalesceExpr { args, ..*n })
            }
            Node::MinMaxExpr(n) => {
                let args = self.list(n.args)?;
                self.alloc(MinMaxExpr { args, ..*n })
            }
            Node::NullTest(n) => {
                let arg = self.node(n.arg)?;
                self.alloc(NullTest { arg, ..*n })
            }
            Node::BooleanTest(n) => {
                let arg = self.node(n.arg)?;
                self.alloc(BooleanTest { arg, ..*n })
            }
            Node::AIndices(n) => {
                let lidx = self.opt(n.lidx)?;
                let uidx = self.opt(n.uidx)?;
                self.alloc(AIndices { lidx, uidx, ..*n })
            }
            Node::AIndirection(n) => {
                let arg = self.node(n.arg)?;
                let indirection = self.list(n.indirection)?;
                self.alloc(AIndirection { arg, indirection })
            }
            Node::AArrayExpr(n) => {
                let elements = self.list(n.elements)?;
                self.alloc(AArrayExpr { elements, ..*n })
            }
            Node::ResTarget(n) => {
                let indirection = self.list(n.indirection)?;
                let val = self.opt(n.val)?;
                self.alloc(ResTarget {
                    indirection,
                    val,
                    ..*n
                })
            }
            Node::MultiAssignRef(n) => {
                let source = self.node(n.source)?;
                self.alloc(MultiAssignRef { source, ..*n })
            }
            Node::GroupingSet(n) => {
                let content = self.list(n.content)?;
                self.alloc(GroupingSet { content, ..*n })
            }
            Node::GroupingFunc(n) => {
                let args = self.list(n.args)?;
                self.alloc(GroupingFunc { args, ..*n })
            }
            Node::RangeVar(n) => {
                let rebuilt = self.range_var(n)?;
                self.alloc(rebuilt)
            }
            Node::RangeSubselect(n) => {
                let subquery = self.subquery(n.subquery)?;
                let alias = self.typed_opt(n.alias)?;
                self.alloc(RangeSubselect {
                    subquery,
                    alias,
                    ..*n
                })
            }
            Node::RangeFunction(n) => {
                let functions = self.list(n.functions)?;
                let alias = self.typed_opt(n.alias)?;
                self.alloc(RangeFunction {
                    functions,
                    alias,
                    ..*n
                })
            }
            Node::RangeTableSample(n) => {
                let relation = self.node(n.relation)?;
                let args = self.list(n.args)?;
                let repeatable = self.opt(n.repeatable)?;
                self.alloc(RangeTableSample {
                    relation,
                    args,
                    repeatable,
                    ..*n
                })
            }
            Node::JoinExpr(n) => self.join_expr(n)?,
            Node::WithClause(n) => {
                let rebuilt = self.with_clause(n)?;
                self.alloc(rebuilt)
            }
            Node::CommonTableExpr(n) => {
                let ctequery = self.subquery(n.ctequery)?;
                self.alloc(CommonTableExpr { ctequery, ..*n })
            }
            Node::LockingClause(n) => {
                let locked_rels = self.list(n.locked_rels)?;
                self.alloc(LockingClause { locked_rels, ..*n })
            }
            Node::IntoClause(n) => {
                let rebuilt = self.into_clause(n)?;
                self.alloc(rebuilt)
            }
            Node::OnConflictClause(n) => {
                let rebuilt = self.on_conflict(n)?;
                self.alloc(rebuilt)
            }
            Node::InferClause(n) => {
                let rebuilt = self.infer_clause(n)?;
                self.alloc(rebuilt)
            }
            Node::IndexElem(n) => {
                let expr = self.opt(n.expr)?;
                self.alloc(IndexElem { expr, ..*n })
            }
            Node::MergeWhenClause(n) => {
                let condition = self.opt(n.condition)?;
                let target_list = self.list(n.target_list)?;
                let values = self.list(n.values)?;
                self.alloc(MergeWhenClause {
                    condition,
                    target_list,
                    values,
                    ..*n
                })
            }
            Node::RawStmt(n) => {
                let stmt = self.node(n.stmt)?;
                self.alloc(RawStmt { stmt, ..*n })
            }
            Node::SelectStmt(n) => {
                let rebuilt = self.select_stmt(n)?;
                self.alloc(rebuilt)
            }
            Node::InsertStmt(n) => self.insert_stmt(n)?,
            Node::UpdateStmt(n) => self.update_stmt(n)?,
            Node::DeleteStmt(n) => self.delete_stmt(n)?,
            Node::MergeStmt(n) => self.merge_stmt(n)?,
            Node::PlAssignStmt(n) => {
                let indirection = self.list(n.indirection)?;
                let val = self.typed(n.val)?;
                self.alloc(PlAssignStmt {
                    indirection,
                    val,
                    ..*n
                })
            }
        };
        Ok(copy)
    }

    fn func_call(&mut self, n: &'a FuncCall<'a>) -> Result<Node<'a>> {
        let args = self.list(n.args)?;
        let agg_order = self.list(n.agg_order)?;
        let agg_filter = self.opt(n.agg_filter)?;
        let over = self.typed_opt(n.over)?;
        Ok(self.alloc(FuncCall {
            args,
            agg_order,
            agg_filter,
            over,
            ..*n
        }))
    }

    fn window_def(&mut self, n: &'a WindowDef<'a>) -> Result<WindowDef<'a>> {
        Ok(WindowDef {
            partition_clause: self.list(n.partition_clause)?,
            order_clause: self.list(n.order_clause)?,
            start_offset: self.opt(n.start_offset)?,
            end_offset: self.opt(n.end_offset)?,
            ..*n
        })
    }

    fn range_var(&mut self, n: &'a RangeVar<'a>) -> Result<RangeVar<'a>> {
        Ok(RangeVar {
            alias: self.typed_opt(n.alias)?,
            ..*n
        })
    }

    fn join_expr(&mut self, n: &'a JoinExpr<'a>) -> Result<Node<'a>> {
        let larg = self.node(n.larg)?;
        let rarg = self.node(n.rarg)?;
        let quals = self.opt(n.quals)?;
        let alias = self.typed_opt(n.alias)?;
        Ok(self.alloc(JoinExpr {
            larg,
            rarg,
            quals,
            alias,
            ..*n
        }))
    }

    fn with_clause(&mut self, n: &'a WithClause<'a>) -> Result<WithClause<'a>> {
        Ok(WithClause {
            ctes: self.list(n.ctes)?,
            ..*n
        })
    }

    fn into_clause(&mut self, n: &'a IntoClause<'a>) -> Result<IntoClause<'a>> {
        let rel = self.typed(n.rel)?;
        let view_query = match n.view_query {
            Some(query) => Some(self.subquery(query)?),
            None => None,
        };
        Ok(IntoClause {
            rel,
            view_query,
            ..*n
        })
    }

    fn on_conflict(&mut self, n: &'a OnConflictClause<'a>) -> Result<OnConflictClause<'a>> {
        Ok(OnConflictClause {
            infer: self.typed_opt(n.infer)?,
            target_list: self.list(n.target_list)?,
            where_clause: self.opt(n.where_clause)?,
            ..*n
        })
    }

    fn infer_clause(&mut self, n: &'a InferClause<'a>) -> Result<InferClause<'a>> {
        Ok(InferClause {
            index_elems: self.list(n.index_elems)?,
            where_clause: self.opt(n.where_clause)?,
            ..*n
        })
    }

    fn select_stmt(&mut self, n: &'a SelectStmt<'a>) -> Result<SelectStmt<'a>> {
        let distinct_clause = match n.distinct_clause {
            Some(list) => Some(self.list(list)?),
            None => None,
        };
        Ok(SelectStmt {
            distinct_clause,
            into_clause: self.typed_opt(n.into_clause)?,
            target_list: self.list(n.target_list)?,
            from_clause: self.list(n.from_clause)?,
            where_clause: self.opt(n.where_clause)?,
            group_clause: self.list(n.group_clause)?,
            having_clause: self.opt(n.having_clause)?,
            window_clause: self.list(n.window_clause)?,
            values_lists: self.list(n.values_lists)?,
            sort_clause: self.list(n.sort_clause)?,
            limit_offset: self.opt(n.limit_offset)?,
            limit_count: self.opt(n.limit_count)?,
            locking_clause: self.list(n.locking_clause)?,
            with_clause: self.typed_opt(n.with_clause)?,
            larg: self.typed_opt(n.larg)?,
            rarg: self.typed_opt(n.rarg)?,
            ..*n
        })
    }

    fn insert_stmt(&mut self, n: &'a InsertStmt<'a>) -> Result<Node<'a>> {
        let relation = self.typed(n.relation)?;
        let cols = self.list(n.cols)?;
        let select_stmt = self.opt(n.select_stmt)?;
        let on_conflict_clause = self.typed_opt(n.on_conflict_clause)?;
        let returning_list = self.list(n.returning_list)?;
        let with_clause = self.typed_opt(n.with_clause)?;
        Ok(self.alloc(InsertStmt {
            relation,
            cols,
            select_stmt,
            on_conflict_clause,
            returning_list,
            with_clause,
            ..*n
        }))
    }

    fn update_stmt(&mut self, n: &'a UpdateStmt<'a>) -> Result<Node<'a>> {
        let relation = self.typed(n.relation)?;
        let target_list = self.list(n.target_list)?;
        let where_clause = self.opt(n.where_clause)?;
        let from_clause = self.list(n.from_clause)?;
        let returning_list = self.list(n.returning_list)?;
        let with_clause = self.typed_opt(n.with_clause)?;
        Ok(self.alloc(UpdateStmt {
            relation,
            target_list,
            where_clause,
            from_clause,
            returning_list,
            with_clause,
        }))
    }

    fn delete_stmt(&mut self, n: &'a DeleteStmt<'a>) -> Result<Node<'a>> {
        let relation = self.typed(n.relation)?;
        let using_clause = self.list(n.using_clause)?;
        let where_clause = self.opt(n.where_clause)?;
        let returning_list = self.list(n.returning_list)?;
        let with_clause = self.typed_opt(n.with_clause)?;
        Ok(self.alloc(DeleteStmt {
            relation,
            using_clause,
            where_clause,
            returning_list,
            with_clause,
        }))
    }

    fn merge_stmt(&mut self, n: &'a MergeStmt<'a>) -> Result<Node<'a>> {
        let relation = self.typed(n.relation)?;
        let source_relation = self.node(n.source_relation)?;
        let join_condition = self.node(n.join_condition)?;
        let merge_when_clauses = self.list(n.merge_when_clauses)?;
        let returning_list = self.list(n.returning_list)?;
        let with_clause = self.typed_opt(n.with_clause)?;
        Ok(self.alloc(MergeStmt {
            relation,
            source_relation,
            join_condition,
            merge_when_clauses,
            returning_list,
            with_clause,
        }))
    }
}
