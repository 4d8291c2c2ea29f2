//! Node payload definitions.
//!
//! Every payload is plain arena data: child nodes are `&'a` references into
//! the parse arena, sequences are arena slices, and names are arena `&str`s.
//! Payloads are `Copy`, so rebuilding a node with some children replaced is a
//! struct update over a copy of the original.
//!
//! Field names and shapes follow the server's raw parse tree so the
//! serialized form is familiar to anyone who has read `parsenodes.h`.

use crate::generated::Node;
use crate::types::*;
use serde::Serialize;
use sqltree_core::Location;

/// An ordered sequence of nodes, allocated in the arena.
pub type NodeList<'a> = &'a [Node<'a>];

/// A dotted name (`schema.table`, `pg_catalog.int4`, an operator name).
pub type NameList<'a> = &'a [&'a str];

// ============================================================================
// Value nodes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Integer {
    pub ival: i32,
}

/// A numeric literal that does not fit an `Integer`, kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Float<'a> {
    pub fval: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boolean {
    pub boolval: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StringValue<'a> {
    pub sval: &'a str,
}

/// A bit string literal; `bsval` starts with `b` or `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitString<'a> {
    pub bsval: &'a str,
}

/// An explicit list node. Clause sequences are plain [`NodeList`]s; a `List`
/// only appears where a sequence is itself an element (a `VALUES` row, a
/// grouping-set member).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct List<'a> {
    pub items: NodeList<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

/// The value of an `A_Const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstValue<'a> {
    Null,
    Integer(i32),
    Float(&'a str),
    Boolean(bool),
    String(&'a str),
    BitString(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AConst<'a> {
    pub val: ConstValue<'a>,
    pub location: Location,
}

/// `$n` parameter reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamRef {
    pub number: i32,
    pub location: Location,
}

/// `*` in a target list, column reference, or indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AStar {}

/// One component of a column reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnField<'a> {
    Name(&'a str),
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef<'a> {
    pub fields: &'a [ColumnField<'a>],
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AExpr<'a> {
    pub kind: AExprKind,
    pub name: NameList<'a>,
    pub lexpr: Option<Node<'a>>,
    pub rexpr: Option<Node<'a>>,
    /// Location of the operator.
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoolExpr<'a> {
    pub boolop: BoolExprType,
    pub args: NodeList<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncCall<'a> {
    pub funcname: NameList<'a>,
    pub args: NodeList<'a>,
    pub agg_order: NodeList<'a>,
    pub agg_filter: Option<Node<'a>>,
    pub over: Option<&'a WindowDef<'a>>,
    /// ORDER BY appeared in WITHIN GROUP.
    pub agg_within_group: bool,
    /// Argument was really `*`.
    pub agg_star: bool,
    pub agg_distinct: bool,
    /// Last argument was labeled VARIADIC.
    pub func_variadic: bool,
    pub funcformat: CoercionForm,
    pub location: Location,
}

/// `name => value` argument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedArgExpr<'a> {
    pub arg: Node<'a>,
    pub name: &'a str,
    pub argnumber: i32,
    pub location: Location,
}

/// `CAST(arg AS type)`, `arg::type`, or `type 'literal'`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCast<'a> {
    pub arg: Node<'a>,
    pub type_name: &'a TypeName<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeName<'a> {
    pub names: NameList<'a>,
    pub setof: bool,
    /// `%TYPE` reference.
    pub pct_type: bool,
    pub typmods: NodeList<'a>,
    pub typemod: i32,
    /// Array bounds; `-1` for an unspecified bound.
    pub array_bounds: &'a [i32],
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateClause<'a> {
    pub arg: Option<Node<'a>>,
    pub collname: NameList<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortBy<'a> {
    pub node: Node<'a>,
    pub sortby_dir: SortByDir,
    pub sortby_nulls: SortByNulls,
    pub use_op: NameList<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDef<'a> {
    pub name: Option<&'a str>,
    pub refname: Option<&'a str>,
    pub partition_clause: NodeList<'a>,
    pub order_clause: NodeList<'a>,
    pub frame_options: FrameOptions,
    pub start_offset: Option<Node<'a>>,
    pub end_offset: Option<Node<'a>>,
    pub location: Location,
}

/// A sub-select used as an expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLink<'a> {
    pub sub_link_type: SubLinkType,
    pub sub_link_id: i32,
    pub testexpr: Option<Node<'a>>,
    pub oper_name: NameList<'a>,
    pub subselect: Node<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseExpr<'a> {
    pub arg: Option<Node<'a>>,
    /// The `WHEN` branches, each a `CaseWhen`.
    pub args: NodeList<'a>,
    pub defresult: Option<Node<'a>>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseWhen<'a> {
    pub expr: Node<'a>,
    pub result: Node<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowExpr<'a> {
    pub args: NodeList<'a>,
    pub colnames: NameList<'a>,
    pub row_format: CoercionForm,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalesceExpr<'a> {
    pub args: NodeList<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinMaxExpr<'a> {
    pub op: MinMaxOp,
    pub args: NodeList<'a>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NullTest<'a> {
    pub arg: Node<'a>,
    pub nulltesttype: NullTestType,
    pub argisrow: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanTest<'a> {
    pub arg: Node<'a>,
    pub booltesttype: BoolTestType,
    pub location: Location,
}

/// `[lidx]` or `[lidx:uidx]` subscript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AIndices<'a> {
    pub is_slice: bool,
    pub lidx: Option<Node<'a>>,
    pub uidx: Option<Node<'a>>,
}

/// Subscripts and field selections applied to an expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AIndirection<'a> {
    pub arg: Node<'a>,
    /// `AIndices`, `String` (field name), or `AStar` nodes.
    pub indirection: NodeList<'a>,
}

/// `ARRAY[...]` constructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AArrayExpr<'a> {
    pub elements: NodeList<'a>,
    pub location: Location,
}

/// A target list entry, or an assignment target in INSERT/UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResTarget<'a> {
    pub name: Option<&'a str>,
    pub indirection: NodeList<'a>,
    pub val: Option<Node<'a>>,
    pub location: Location,
}

/// One column of `UPDATE ... SET (a, b) = (source)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAssignRef<'a> {
    pub source: Node<'a>,
    pub colno: i32,
    pub ncolumns: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingSet<'a> {
    pub kind: GroupingSetKind,
    pub content: NodeList<'a>,
    pub location: Location,
}

/// `GROUPING(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingFunc<'a> {
    pub args: NodeList<'a>,
    pub location: Location,
}

/// `DEFAULT` used as a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetToDefault {
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlValueFunction {
    pub op: SqlValueFunctionOp,
    pub typmod: i32,
    pub location: Location,
}

/// `WHERE CURRENT OF cursor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOfExpr<'a> {
    pub cursor_name: &'a str,
}

// ============================================================================
// Range and clause nodes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias<'a> {
    pub aliasname: &'a str,
    pub colnames: NameList<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeVar<'a> {
    pub catalogname: Option<&'a str>,
    pub schemaname: Option<&'a str>,
    pub relname: &'a str,
    /// Expand inheritance (no `ONLY`).
    pub inh: bool,
    pub relpersistence: RelPersistence,
    pub alias: Option<&'a Alias<'a>>,
    pub location: Location,
}

/// Sub-select in FROM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSubselect<'a> {
    pub lateral: bool,
    pub subquery: Node<'a>,
    pub alias: Option<&'a Alias<'a>>,
}

/// Function call in FROM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFunction<'a> {
    pub lateral: bool,
    pub ordinality: bool,
    /// `ROWS FROM (...)` syntax.
    pub is_rowsfrom: bool,
    pub functions: NodeList<'a>,
    pub alias: Option<&'a Alias<'a>>,
}

/// `relation TABLESAMPLE method (args) [REPEATABLE (seed)]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTableSample<'a> {
    pub relation: Node<'a>,
    pub method: NameList<'a>,
    pub args: NodeList<'a>,
    pub repeatable: Option<Node<'a>>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinExpr<'a> {
    pub jointype: JoinType,
    pub is_natural: bool,
    pub larg: Node<'a>,
    pub rarg: Node<'a>,
    pub using_clause: NameList<'a>,
    pub join_using_alias: Option<&'a Alias<'a>>,
    pub quals: Option<Node<'a>>,
    pub alias: Option<&'a Alias<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithClause<'a> {
    pub ctes: NodeList<'a>,
    pub recursive: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonTableExpr<'a> {
    pub ctename: &'a str,
    pub aliascolnames: NameList<'a>,
    pub ctematerialized: CteMaterialize,
    pub ctequery: Node<'a>,
    pub location: Location,
}

/// `FOR UPDATE [OF rels] [NOWAIT | SKIP LOCKED]` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockingClause<'a> {
    pub locked_rels: NodeList<'a>,
    pub strength: LockClauseStrength,
    pub wait_policy: LockWaitPolicy,
}

/// `SELECT ... INTO target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntoClause<'a> {
    pub rel: &'a RangeVar<'a>,
    pub col_names: NameList<'a>,
    pub view_query: Option<Node<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnConflictClause<'a> {
    pub action: OnConflictAction,
    pub infer: Option<&'a InferClause<'a>>,
    pub target_list: NodeList<'a>,
    pub where_clause: Option<Node<'a>>,
    pub location: Location,
}

/// Conflict target of `ON CONFLICT`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferClause<'a> {
    pub index_elems: NodeList<'a>,
    pub where_clause: Option<Node<'a>>,
    pub conname: Option<&'a str>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexElem<'a> {
    pub name: Option<&'a str>,
    pub expr: Option<Node<'a>>,
    pub collation: NameList<'a>,
    pub opclass: NameList<'a>,
    pub ordering: SortByDir,
    pub nulls_ordering: SortByNulls,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeWhenClause<'a> {
    pub match_kind: MergeMatchKind,
    pub command_type: CmdType,
    #[serde(rename = "override")]
    pub override_: OverridingKind,
    pub condition: Option<Node<'a>>,
    pub target_list: NodeList<'a>,
    pub values: NodeList<'a>,
}

// ============================================================================
// Statements
// ============================================================================

/// Top-level wrapper of every parsed statement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStmt<'a> {
    pub stmt: Node<'a>,
    /// Start of the statement text, or unknown.
    pub stmt_location: Location,
    /// Length of the statement text; 0 means "rest of the string".
    pub stmt_len: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectStmt<'a> {
    /// `None`: no DISTINCT. `Some([])`: plain DISTINCT. Otherwise DISTINCT ON.
    pub distinct_clause: Option<NodeList<'a>>,
    pub into_clause: Option<&'a IntoClause<'a>>,
    pub target_list: NodeList<'a>,
    pub from_clause: NodeList<'a>,
    pub where_clause: Option<Node<'a>>,
    pub group_clause: NodeList<'a>,
    pub group_distinct: bool,
    pub having_clause: Option<Node<'a>>,
    pub window_clause: NodeList<'a>,
    /// `VALUES` rows, each a `List`.
    pub values_lists: NodeList<'a>,
    pub sort_clause: NodeList<'a>,
    pub limit_offset: Option<Node<'a>>,
    pub limit_count: Option<Node<'a>>,
    pub limit_option: LimitOption,
    pub locking_clause: NodeList<'a>,
    pub with_clause: Option<&'a WithClause<'a>>,
    pub op: SetOperation,
    pub all: bool,
    pub larg: Option<&'a SelectStmt<'a>>,
    pub rarg: Option<&'a SelectStmt<'a>>,
}

impl<'a> SelectStmt<'a> {
    /// A leaf select with every clause empty.
    pub const EMPTY: SelectStmt<'static> = SelectStmt {
        distinct_clause: None,
        into_clause: None,
        target_list: &[],
        from_clause: &[],
        where_clause: None,
        group_clause: &[],
        group_distinct: false,
        having_clause: None,
        window_clause: &[],
        values_lists: &[],
        sort_clause: &[],
        limit_offset: None,
        limit_count: None,
        limit_option: LimitOption::Default,
        locking_clause: &[],
        with_clause: None,
        op: SetOperation::None,
        all: false,
        larg: None,
        rarg: None,
    };

    pub fn is_set_operation(&self) -> bool {
        self.op != SetOperation::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStmt<'a> {
    pub relation: &'a RangeVar<'a>,
    /// Target columns, each a `ResTarget`.
    pub cols: NodeList<'a>,
    /// Source: a `SelectStmt` (VALUES or query), or `None` for DEFAULT VALUES.
    pub select_stmt: Option<Node<'a>>,
    pub on_conflict_clause: Option<&'a OnConflictClause<'a>>,
    pub returning_list: NodeList<'a>,
    pub with_clause: Option<&'a WithClause<'a>>,
    #[serde(rename = "override")]
    pub override_: OverridingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStmt<'a> {
    pub relation: &'a RangeVar<'a>,
    pub target_list: NodeList<'a>,
    pub where_clause: Option<Node<'a>>,
    pub from_clause: NodeList<'a>,
    pub returning_list: NodeList<'a>,
    pub with_clause: Option<&'a WithClause<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStmt<'a> {
    pub relation: &'a RangeVar<'a>,
    pub using_clause: NodeList<'a>,
    pub where_clause: Option<Node<'a>>,
    pub returning_list: NodeList<'a>,
    pub with_clause: Option<&'a WithClause<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStmt<'a> {
    pub relation: &'a RangeVar<'a>,
    pub source_relation: Node<'a>,
    pub join_condition: Node<'a>,
    pub merge_when_clauses: NodeList<'a>,
    pub returning_list: NodeList<'a>,
    pub with_clause: Option<&'a WithClause<'a>>,
}

/// PL/pgSQL assignment `name[.field][subscripts] := expr`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlAssignStmt<'a> {
    pub name: &'a str,
    pub indirection: NodeList<'a>,
    /// Number of names used in `name` plus leading indirection.
    pub nnames: i32,
    pub val: &'a SelectStmt<'a>,
    pub location: Location,
}

/// A node kind this crate has no structural knowledge of.
///
/// Produced for utility statements the raw parser captures without
/// analysing, or by third-party raw parsers. Traversal reports it as a
/// warning and treats it as a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unrecognized<'a> {
    /// The producer's name for the kind (e.g. `CreateStmt`).
    pub name: &'a str,
    pub location: Location,
    /// Source text covered by the node, if known.
    pub text: &'a str,
}
