//! The closed node set.
//!
//! [`Node`], [`NodeTag`], and the per-payload conversions are generated from
//! one table so the three can never drift apart: adding a kind is one line
//! here plus its payload in `node.rs` and its arms in the walker, mutator,
//! and location resolver, all of which match exhaustively.

use crate::node::*;
use serde::ser::{Serialize, Serializer};
use std::fmt;

/// Implemented by every node payload.
pub trait NodePayload<'a>: Sized + 'a {
    /// The tag of nodes carrying this payload.
    const TAG: NodeTag;

    /// Wrap a reference to this payload as a node.
    fn into_node(&'a self) -> Node<'a>;

    /// The payload of `node`, if it has this kind.
    fn from_node(node: Node<'a>) -> Option<&'a Self>;
}

macro_rules! define_nodes {
    ($( $variant:ident ( $payload:ty ) = $name:literal ),* $(,)?) => {
        /// A syntax tree node: a tag plus a reference to its payload in the
        /// parse arena.
        #[derive(Clone, Copy)]
        pub enum Node<'a> {
            $( $variant(&'a $payload), )*
        }

        /// Discriminant of a [`Node`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum NodeTag {
            $( $variant, )*
        }

        impl NodeTag {
            /// Every tag, in declaration order.
            pub const ALL: &'static [NodeTag] = &[ $( NodeTag::$variant, )* ];

            /// The server's canonical name for this kind (`A_Expr`, `SelectStmt`, ...).
            pub fn name(self) -> &'static str {
                match self {
                    $( NodeTag::$variant => $name, )*
                }
            }

            /// Look up a tag by its canonical name.
            pub fn from_name(name: &str) -> Option<NodeTag> {
                match name {
                    $( $name => Some(NodeTag::$variant), )*
                    _ => None,
                }
            }
        }

        impl<'a> Node<'a> {
            #[inline]
            pub fn tag(self) -> NodeTag {
                match self {
                    $( Node::$variant(_) => NodeTag::$variant, )*
                }
            }

            /// Address of the payload, for identity comparisons.
            #[inline]
            pub fn addr(self) -> *const () {
                match self {
                    $( Node::$variant(n) => n as *const $payload as *const (), )*
                }
            }
        }

        impl PartialEq for Node<'_> {
            fn eq(&self, other: &Self) -> bool {
                match (self, other) {
                    $( (Node::$variant(a), Node::$variant(b)) => a == b, )*
                    _ => false,
                }
            }
        }

        impl fmt::Debug for Node<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Node::$variant(n) => f.debug_tuple($name).field(n).finish(), )*
                }
            }
        }

        impl Serialize for Node<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let tag = self.tag();
                match self {
                    $( Node::$variant(n) => serializer.serialize_newtype_variant("Node", tag as u32, $name, *n), )*
                }
            }
        }

        $(
            impl<'a> NodePayload<'a> for $payload {
                const TAG: NodeTag = NodeTag::$variant;

                #[inline]
                fn into_node(&'a self) -> Node<'a> {
                    Node::$variant(self)
                }

                #[inline]
                fn from_node(node: Node<'a>) -> Option<&'a Self> {
                    match node {
                        Node::$variant(n) => Some(n),
                        _ => None,
                    }
                }
            }

            impl<'a> From<&'a $payload> for Node<'a> {
                #[inline]
                fn from(n: &'a $payload) -> Self {
                    Node::$variant(n)
                }
            }
        )*
    };
}

define_nodes! {
    Integer(Integer) = "Integer",
    Float(Float<'a>) = "Float",
    Boolean(Boolean) = "Boolean",
    String(StringValue<'a>) = "String",
    BitString(BitString<'a>) = "BitString",
    List(List<'a>) = "List",
    AConst(AConst<'a>) = "A_Const",
    ParamRef(ParamRef) = "ParamRef",
    AStar(AStar) = "A_Star",
    ColumnRef(ColumnRef<'a>) = "ColumnRef",
    AExpr(AExpr<'a>) = "A_Expr",
    BoolExpr(BoolExpr<'a>) = "BoolExpr",
    FuncCall(FuncCall<'a>) = "FuncCall",
    NamedArgExpr(NamedArgExpr<'a>) = "NamedArgExpr",
    TypeCast(TypeCast<'a>) = "TypeCast",
    TypeName(TypeName<'a>) = "TypeName",
    CollateClause(CollateClause<'a>) = "CollateClause",
    SortBy(SortBy<'a>) = "SortBy",
    WindowDef(WindowDef<'a>) = "WindowDef",
    SubLink(SubLink<'a>) = "SubLink",
    CaseExpr(CaseExpr<'a>) = "CaseExpr",
    CaseWhen(CaseWhen<'a>) = "CaseWhen",
    RowExpr(RowExpr<'a>) = "RowExpr",
    CoalesceExpr(CoalesceExpr<'a>) = "CoalesceExpr",
    MinMaxExpr(MinMaxExpr<'a>) = "MinMaxExpr",
    NullTest(NullTest<'a>) = "NullTest",
    BooleanTest(BooleanTest<'a>) = "BooleanTest",
    AIndices(AIndices<'a>) = "A_Indices",
    AIndirection(AIndirection<'a>) = "A_Indirection",
    AArrayExpr(AArrayExpr<'a>) = "A_ArrayExpr",
    ResTarget(ResTarget<'a>) = "ResTarget",
    MultiAssignRef(MultiAssignRef<'a>) = "MultiAssignRef",
    GroupingSet(GroupingSet<'a>) = "GroupingSet",
    GroupingFunc(GroupingFunc<'a>) = "GroupingFunc",
    SetToDefault(SetToDefault) = "SetToDefault",
    SqlValueFunction(SqlValueFunction) = "SQLValueFunction",
    CurrentOfExpr(CurrentOfExpr<'a>) = "CurrentOfExpr",
    Alias(Alias<'a>) = "Alias",
    RangeVar(RangeVar<'a>) = "RangeVar",
    RangeSubselect(RangeSubselect<'a>) = "RangeSubselect",
    RangeFunction(RangeFunction<'a>) = "RangeFunction",
    RangeTableSample(RangeTableSample<'a>) = "RangeTableSample",
    JoinExpr(JoinExpr<'a>) = "JoinExpr",
    WithClause(WithClause<'a>) = "WithClause",
    CommonTableExpr(CommonTableExpr<'a>) = "CommonTableExpr",
    LockingClause(LockingClause<'a>) = "LockingClause",
    IntoClause(IntoClause<'a>) = "IntoClause",
    OnConflictClause(OnConflictClause<'a>) = "OnConflictClause",
    InferClause(InferClause<'a>) = "InferClause",
    IndexElem(IndexElem<'a>) = "IndexElem",
    MergeWhenClause(MergeWhenClause<'a>) = "MergeWhenClause",
    RawStmt(RawStmt<'a>) = "RawStmt",
    SelectStmt(SelectStmt<'a>) = "SelectStmt",
    InsertStmt(InsertStmt<'a>) = "InsertStmt",
    UpdateStmt(UpdateStmt<'a>) = "UpdateStmt",
    DeleteStmt(DeleteStmt<'a>) = "DeleteStmt",
    MergeStmt(MergeStmt<'a>) = "MergeStmt",
    PlAssignStmt(PlAssignStmt<'a>) = "PLAssignStmt",
    Unrecognized(Unrecognized<'a>) = "Unrecognized",
}

impl<'a> Node<'a> {
    /// The payload of this node, if it has kind `P`.
    #[inline]
    pub fn downcast<P: NodePayload<'a>>(self) -> Option<&'a P> {
        P::from_node(self)
    }

    /// Whether two nodes are the same allocation.
    #[inline]
    pub fn ptr_eq(self, other: Node<'_>) -> bool {
        self.addr() == other.addr()
    }

    /// Whether this node is a statement kind.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Node::SelectStmt(_)
                | Node::InsertStmt(_)
                | Node::UpdateStmt(_)
                | Node::DeleteStmt(_)
                | Node::MergeStmt(_)
                | Node::PlAssignStmt(_)
        )
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
