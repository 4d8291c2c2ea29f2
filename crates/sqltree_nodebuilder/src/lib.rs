//! sqltree_nodebuilder: Node construction helpers.
//!
//! [`NodeFactory`] allocates nodes into the current scope of an
//! [`ArenaContext`] and encodes the small normalisations the grammar relies
//! on: nested `AND`/`OR` are flattened, system type names are qualified with
//! `pg_catalog`, and a `type 'literal'` becomes a `TypeCast`.
//!
//! # Example
//! ```
//! use sqltree_core::{ArenaContext, Location, MemoryScope};
//! use sqltree_nodebuilder::NodeFactory;
//! use sqltree_ast::{Node, NodeTag};
//!
//! let scope = MemoryScope::new("example");
//! let arena = ArenaContext::new(&scope);
//! let f = NodeFactory::new(&arena);
//! let a = f.column_ref(&["a"], Location(7));
//! let one = f.int_const(1, Location(11));
//! let cmp = f.simple_a_expr("=", Some(a), Some(one), Location(9));
//! assert_eq!(cmp.tag(), NodeTag::AExpr);
//! ```

use sqltree_ast::*;
use sqltree_core::{ArenaContext, Location};

/// Allocates nodes into the current scope of an arena context.
#[derive(Clone, Copy)]
pub struct NodeFactory<'c, 'a> {
    arena: &'c ArenaContext<'a>,
}

impl<'c, 'a> NodeFactory<'c, 'a> {
    pub fn new(arena: &'c ArenaContext<'a>) -> Self {
        Self { arena }
    }

    #[inline]
    pub fn arena(&self) -> &'c ArenaContext<'a> {
        self.arena
    }

    // ========================================================================
    // Raw allocation
    // ========================================================================

    /// Allocate a payload and wrap it as a node.
    #[inline]
    pub fn node<P: NodePayload<'a>>(&self, payload: P) -> Node<'a> {
        self.arena.alloc(payload).into_node()
    }

    /// Allocate a payload and return the typed reference.
    #[inline]
    pub fn payload<P: NodePayload<'a>>(&self, payload: P) -> &'a P {
        self.arena.alloc(payload)
    }

    #[inline]
    pub fn str(&self, s: &str) -> &'a str {
        self.arena.alloc_str(s)
    }

    /// Copy a dotted name into the arena.
    pub fn names(&self, parts: &[&str]) -> NameList<'a> {
        let parts: Vec<&'a str> = parts.iter().map(|p| self.str(p)).collect();
        self.arena.alloc_vec(parts)
    }

    #[inline]
    pub fn list(&self, items: Vec<Node<'a>>) -> NodeList<'a> {
        self.arena.alloc_vec(items)
    }

    /// An explicit `List` node.
    pub fn list_node(&self, items: Vec<Node<'a>>) -> Node<'a> {
        let items = self.list(items);
        self.node(List { items })
    }

    // ========================================================================
    // Values and constants
    // ========================================================================

    pub fn integer_value(&self, ival: i32) -> Node<'a> {
        self.node(Integer { ival })
    }

    pub fn string_value(&self, sval: &str) -> Node<'a> {
        let sval = self.str(sval);
        self.node(StringValue { sval })
    }

    pub fn a_const(&self, val: ConstValue<'a>, location: Location) -> Node<'a> {
        self.node(AConst { val, location })
    }

    pub fn int_const(&self, ival: i32, location: Location) -> Node<'a> {
        self.a_const(ConstValue::Integer(ival), location)
    }

    pub fn float_const(&self, fval: &str, location: Location) -> Node<'a> {
        self.a_const(ConstValue::Float(self.str(fval)), location)
    }

    pub fn string_const(&self, sval: &str, location: Location) -> Node<'a> {
        self.a_const(ConstValue::String(self.str(sval)), location)
    }

    pub fn bit_string_const(&self, bsval: &str, location: Location) -> Node<'a> {
        self.a_const(ConstValue::BitString(self.str(bsval)), location)
    }

    pub fn bool_const(&self, value: bool, location: Location) -> Node<'a> {
        self.a_const(ConstValue::Boolean(value), location)
    }

    pub fn null_const(&self, location: Location) -> Node<'a> {
        self.a_const(ConstValue::Null, location)
    }

    pub fn param_ref(&self, number: i32, location: Location) -> Node<'a> {
        self.node(ParamRef { number, location })
    }

    pub fn set_to_default(&self, location: Location) -> Node<'a> {
        self.node(SetToDefault { location })
    }

    pub fn sql_value_function(&self, op: SqlValueFunctionOp, typmod: i32, location: Location) -> Node<'a> {
        self.node(SqlValueFunction { op, typmod, location })
    }

    // ========================================================================
    // References
    // ========================================================================

    pub fn column_ref(&self, fields: &[&str], location: Location) -> Node<'a> {
        let fields: Vec<ColumnField<'a>> = fields.iter().map(|f| ColumnField::Name(self.str(f))).collect();
        self.column_ref_fields(fields, location)
    }

    pub fn column_ref_fields(&self, fields: Vec<ColumnField<'a>>, location: Location) -> Node<'a> {
        let fields = self.arena.alloc_vec(fields);
        self.node(ColumnRef { fields, location })
    }

    /// `*` as a target-list column reference.
    pub fn star(&self, location: Location) -> Node<'a> {
        self.column_ref_fields(vec![ColumnField::Star], location)
    }

    pub fn range_var(&self, schemaname: Option<&str>, relname: &str, location: Location) -> &'a RangeVar<'a> {
        self.payload(RangeVar {
            catalogname: None,
            schemaname: schemaname.map(|s| self.str(s)),
            relname: self.str(relname),
            inh: true,
            relpersistence: RelPersistence::Permanent,
            alias: None,
            location,
        })
    }

    pub fn alias(&self, aliasname: &str, colnames: &[&str]) -> &'a Alias<'a> {
        self.payload(Alias {
            aliasname: self.str(aliasname),
            colnames: self.names(colnames),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// `A_Expr` with an unqualified operator name.
    pub fn simple_a_expr(
        &self,
        op: &str,
        lexpr: Option<Node<'a>>,
        rexpr: Option<Node<'a>>,
        location: Location,
    ) -> Node<'a> {
        self.a_expr(AExprKind::Op, self.names(&[op]), lexpr, rexpr, location)
    }

    pub fn a_expr(
        &self,
        kind: AExprKind,
        name: NameList<'a>,
        lexpr: Option<Node<'a>>,
        rexpr: Option<Node<'a>>,
        location: Location,
    ) -> Node<'a> {
        self.node(AExpr {
            kind,
            name,
            lexpr,
            rexpr,
            location,
        })
    }

    pub fn bool_expr(&self, boolop: BoolExprType, args: Vec<Node<'a>>, location: Location) -> Node<'a> {
        let args = self.list(args);
        self.node(BoolExpr { boolop, args, location })
    }

    /// `l AND r`, extending `l` when it is already an AND.
    pub fn and_expr(&self, lexpr: Node<'a>, rexpr: Node<'a>, location: Location) -> Node<'a> {
        self.flattened(BoolExprType::And, lexpr, rexpr, location)
    }

    /// `l OR r`, extending `l` when it is already an OR.
    pub fn or_expr(&self, lexpr: Node<'a>, rexpr: Node<'a>, location: Location) -> Node<'a> {
        self.flattened(BoolExprType::Or, lexpr, rexpr, location)
    }

    fn flattened(&self, op: BoolExprType, lexpr: Node<'a>, rexpr: Node<'a>, location: Location) -> Node<'a> {
        match lexpr {
            Node::BoolExpr(b) if b.boolop == op => {
                let mut args = Vec::with_capacity(b.args.len() + 1);
                args.extend_from_slice(b.args);
                args.push(rexpr);
                self.bool_expr(op, args, b.location)
            }
            _ => self.bool_expr(op, vec![lexpr, rexpr], location),
        }
    }

    pub fn not_expr(&self, arg: Node<'a>, location: Location) -> Node<'a> {
        self.bool_expr(BoolExprType::Not, vec![arg], location)
    }

    /// A plain function call; the caller fills in aggregate details.
    pub fn func_call(&self, funcname: NameList<'a>, args: NodeList<'a>, funcformat: CoercionForm, location: Location) -> FuncCall<'a> {
        FuncCall {
            funcname,
            args,
            agg_order: &[],
            agg_filter: None,
            over: None,
            agg_within_group: false,
            agg_star: false,
            agg_distinct: false,
            func_variadic: false,
            funcformat,
            location,
        }
    }

    /// A call to a `pg_catalog` function written with SQL-standard syntax.
    pub fn system_func_call(&self, name: &str, args: Vec<Node<'a>>, location: Location) -> Node<'a> {
        let call = self.func_call(
            self.names(&["pg_catalog", name]),
            self.list(args),
            CoercionForm::SqlSyntax,
            location,
        );
        self.node(call)
    }

    pub fn type_name(&self, names: NameList<'a>, location: Location) -> TypeName<'a> {
        TypeName {
            names,
            setof: false,
            pct_type: false,
            typmods: &[],
            typemod: -1,
            array_bounds: &[],
            location,
        }
    }

    /// A built-in type, qualified with `pg_catalog`.
    pub fn system_type_name(&self, name: &str, location: Location) -> &'a TypeName<'a> {
        let tn = self.type_name(self.names(&["pg_catalog", name]), location);
        self.payload(tn)
    }

    pub fn type_cast(&self, arg: Node<'a>, type_name: &'a TypeName<'a>, location: Location) -> Node<'a> {
        self.node(TypeCast {
            arg,
            type_name,
            location,
        })
    }

    /// `type 'literal'`.
    pub fn string_const_cast(&self, literal: &str, location: Location, type_name: &'a TypeName<'a>) -> Node<'a> {
        let arg = self.string_const(literal, location);
        self.type_cast(arg, type_name, Location::UNKNOWN)
    }

    pub fn null_test(&self, arg: Node<'a>, nulltesttype: NullTestType, location: Location) -> Node<'a> {
        self.node(NullTest {
            arg,
            nulltesttype,
            argisrow: false,
            location,
        })
    }

    pub fn sort_by(&self, node: Node<'a>, sortby_dir: SortByDir, sortby_nulls: SortByNulls, use_op: NameList<'a>, location: Location) -> Node<'a> {
        self.node(SortBy {
            node,
            sortby_dir,
            sortby_nulls,
            use_op,
            location,
        })
    }

    pub fn res_target(&self, name: Option<&str>, val: Option<Node<'a>>, location: Location) -> Node<'a> {
        self.node(ResTarget {
            name: name.map(|n| self.str(n)),
            indirection: &[],
            val,
            location,
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// `SELECT targets` with every other clause empty.
    pub fn simple_select(&self, targets: Vec<Node<'a>>) -> Node<'a> {
        let target_list = self.list(targets);
        self.node(SelectStmt {
            target_list,
            ..SelectStmt::EMPTY
        })
    }

    pub fn raw_stmt(&self, stmt: Node<'a>, stmt_location: Location, stmt_len: i32) -> Node<'a> {
        self.node(RawStmt {
            stmt,
            stmt_location,
            stmt_len,
        })
    }

    /// A kind the tree model has no structure for.
    pub fn unrecognized(&self, name: &str, location: Location, text: &str) -> Node<'a> {
        self.node(Unrecognized {
            name: self.str(name),
            location,
            text: self.str(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqltree_core::MemoryScope;

    #[test]
    fn test_and_flattening() {
        let scope = MemoryScope::new("test");
        let arena = ArenaContext::new(&scope);
        let f = NodeFactory::new(&arena);
        let a = f.column_ref(&["a"], Location(0));
        let b = f.column_ref(&["b"], Location(6));
        let c = f.column_ref(&["c"], Location(12));
        let ab = f.and_expr(a, b, Location(2));
        let abc = f.and_expr(ab, c, Location(8));
        let Node::BoolExpr(b) = abc else { panic!("expected BoolExpr") };
        assert_eq!(b.boolop, BoolExprType::And);
        assert_eq!(b.args.len(), 3);
        assert_eq!(b.location, Location(2));
    }

    #[test]
    fn test_or_does_not_flatten_into_and() {
        let scope = MemoryScope::new("test");
        let arena = ArenaContext::new(&scope);
        let f = NodeFactory::new(&arena);
        let a = f.column_ref(&["a"], Location(0));
        let b = f.column_ref(&["b"], Location(6));
        let ab = f.and_expr(a, b, Location(2));
        let or = f.or_expr(ab, a, Location(8));
        let Node::BoolExpr(o) = or else { panic!("expected BoolExpr") };
        assert_eq!(o.boolop, BoolExprType::Or);
        assert_eq!(o.args.len(), 2);
        assert_eq!(o.args[0].tag(), NodeTag::BoolExpr);
    }

    #[test]
    fn test_system_type_name_is_qualified() {
        let scope = MemoryScope::new("test");
        let arena = ArenaContext::new(&scope);
        let f = NodeFactory::new(&arena);
        let tn = f.system_type_name("int4", Location(3));
        assert_eq!(tn.names, &["pg_catalog", "int4"]);
        assert_eq!(tn.typemod, -1);
    }
}
