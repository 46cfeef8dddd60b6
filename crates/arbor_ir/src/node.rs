//! The closed set of IR node kinds.
//!
//! Each kind is a plain data struct holding its capability mixin (if any) and
//! its own fields; [`Node`] is the tagged union the store owns. Field order in
//! each `field_table!` is the canonical serialization order.

use crate::error::{IrError, IrResult};
use crate::fields::{
    CstFields, DeclFields, ExprFields, Field, FieldMut, FieldRef, FieldTable, PhiEdge, StmtFields,
    TypeFields,
};
use crate::ids::NodeId;
use crate::kind::{BinaryOp, NodeKind, QuaternaryOp, TernaryOp, UnaryOp};
use arbor_common::Symbol;
use serde::{Deserialize, Serialize};

macro_rules! node_struct {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident: $ty:ty,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }
    };
}

// ---- identifiers ----

node_struct!(
    /// Leaf naming an entity. Either carries text or is the operator marker.
    Identifier {
        /// Identifier text.
        text: Option<Symbol>,
        /// The shared "operator" marker identifier.
        operator: bool,
    }
);
crate::fields::field_table!(Identifier {
    text: Str => Strg,
    operator: Flag => Operator,
});

// ---- declarations ----

node_struct!(
    /// Variable declaration.
    VarDecl {
        /// Declaration mixin.
        decl: DeclFields,
        /// Function-local `static`.
        static_static: bool,
        /// `extern` storage.
        is_extern: bool,
        /// File-level `static`.
        is_static: bool,
        /// Initializer.
        init: Option<NodeId>,
        /// Size constant.
        size: Option<NodeId>,
        /// Alignment in bits.
        algn: u64,
        /// Use count.
        used: u64,
        /// `register` storage.
        register: bool,
        /// Read-only.
        readonly: bool,
        /// Address is taken.
        addr_taken: bool,
        /// Known bit values, as a bit string.
        bit_values: Option<Symbol>,
    }
);
crate::fields::field_table!(VarDecl {
    @decl,
    static_static: Flag => StaticStatic,
    is_extern: Flag => Extern,
    is_static: Flag => Static,
    init: Ref => Init,
    size: Ref => Size,
    algn: UInt => Algn,
    used: UInt => Used,
    register: Flag => Register,
    readonly: Flag => Readonly,
    addr_taken: Flag => AddrTaken,
    bit_values: Str => BitValues,
});

node_struct!(
    /// Function declaration or definition.
    FunctionDecl {
        /// Declaration mixin.
        decl: DeclFields,
        /// Overloaded operator.
        operator: bool,
        /// Function this one was cloned from.
        cloned_from: Option<NodeId>,
        /// Parameters, in order.
        args: Vec<NodeId>,
        /// Declared but never defined.
        undefined: bool,
        /// Compiler builtin.
        builtin: bool,
        /// File-level `static`.
        is_static: bool,
        /// Body statement list; absent for a forward declaration.
        body: Option<NodeId>,
    }
);
crate::fields::field_table!(FunctionDecl {
    @decl,
    operator: Flag => Operator,
    cloned_from: Ref => Fn,
    args: RefList => Arg,
    undefined: Flag => Undefined,
    builtin: Flag => Builtin,
    is_static: Flag => Static,
    body: Ref => Body,
});

node_struct!(
    /// Function parameter.
    ParmDecl {
        /// Declaration mixin.
        decl: DeclFields,
        /// Type as passed.
        argt: Option<NodeId>,
        /// Size constant.
        size: Option<NodeId>,
        /// Alignment in bits.
        algn: u64,
        /// Use count.
        used: u64,
        /// `register` storage.
        register: bool,
        /// Read-only.
        readonly: bool,
    }
);
crate::fields::field_table!(ParmDecl {
    @decl,
    argt: Ref => Argt,
    size: Ref => Size,
    algn: UInt => Algn,
    used: UInt => Used,
    register: Flag => Register,
    readonly: Flag => Readonly,
});

node_struct!(
    /// Function result slot.
    ResultDecl {
        /// Declaration mixin.
        decl: DeclFields,
        /// Initializer.
        init: Option<NodeId>,
        /// Size constant.
        size: Option<NodeId>,
        /// Alignment in bits.
        algn: u64,
    }
);
crate::fields::field_table!(ResultDecl {
    @decl,
    init: Ref => Init,
    size: Ref => Size,
    algn: UInt => Algn,
});

node_struct!(
    /// Record or union member.
    FieldDecl {
        /// Declaration mixin.
        decl: DeclFields,
        /// Default member initializer.
        init: Option<NodeId>,
        /// Size constant.
        size: Option<NodeId>,
        /// Alignment in bits.
        algn: u64,
        /// Bit position constant.
        bpos: Option<NodeId>,
    }
);
crate::fields::field_table!(FieldDecl {
    @decl,
    init: Ref => Init,
    size: Ref => Size,
    algn: UInt => Algn,
    bpos: Ref => Bpos,
});

node_struct!(
    /// Typedef or tag declaration.
    TypeDecl {
        /// Declaration mixin.
        decl: DeclFields,
    }
);
crate::fields::field_table!(TypeDecl { @decl, });

node_struct!(
    /// Jump target.
    LabelDecl {
        /// Declaration mixin.
        decl: DeclFields,
    }
);
crate::fields::field_table!(LabelDecl { @decl, });

node_struct!(
    /// Enumerator or other named constant.
    ConstDecl {
        /// Declaration mixin.
        decl: DeclFields,
        /// Constant value.
        cnst: Option<NodeId>,
    }
);
crate::fields::field_table!(ConstDecl {
    @decl,
    cnst: Ref => Cnst,
});

// ---- types ----

node_struct!(
    /// `void`
    VoidType {
        /// Type mixin.
        ty: TypeFields,
    }
);
crate::fields::field_table!(VoidType { @ty, });

node_struct!(
    /// Boolean type.
    BooleanType {
        /// Type mixin.
        ty: TypeFields,
    }
);
crate::fields::field_table!(BooleanType { @ty, });

node_struct!(
    /// Integer type.
    IntegerType {
        /// Type mixin.
        ty: TypeFields,
        /// Precision in bits.
        prec: u64,
        /// Unsigned.
        unsigned: bool,
        /// Minimum value constant.
        min: Option<NodeId>,
        /// Maximum value constant.
        max: Option<NodeId>,
    }
);
crate::fields::field_table!(IntegerType {
    @ty,
    prec: UInt => Prec,
    unsigned: Flag => Unsigned,
    min: Ref => Min,
    max: Ref => Max,
});

node_struct!(
    /// Floating point type.
    RealType {
        /// Type mixin.
        ty: TypeFields,
        /// Precision in bits.
        prec: u64,
    }
);
crate::fields::field_table!(RealType {
    @ty,
    prec: UInt => Prec,
});

node_struct!(
    /// Complex type.
    ComplexType {
        /// Type mixin.
        ty: TypeFields,
        /// Unsigned components.
        unsigned: bool,
        /// Floating point components.
        real: bool,
    }
);
crate::fields::field_table!(ComplexType {
    @ty,
    unsigned: Flag => Unsigned,
    real: Flag => Real,
});

node_struct!(
    /// Pointer type.
    PointerType {
        /// Type mixin.
        ty: TypeFields,
        /// Pointee.
        ptd: Option<NodeId>,
    }
);
crate::fields::field_table!(PointerType {
    @ty,
    ptd: Ref => Ptd,
});

node_struct!(
    /// Reference type.
    ReferenceType {
        /// Type mixin.
        ty: TypeFields,
        /// Referenced type.
        refd: Option<NodeId>,
    }
);
crate::fields::field_table!(ReferenceType {
    @ty,
    refd: Ref => Refd,
});

node_struct!(
    /// Array type.
    ArrayType {
        /// Type mixin.
        ty: TypeFields,
        /// Element type.
        elts: Option<NodeId>,
        /// Index domain type.
        domn: Option<NodeId>,
    }
);
crate::fields::field_table!(ArrayType {
    @ty,
    elts: Ref => Elts,
    domn: Ref => Domn,
});

node_struct!(
    /// Struct or class type.
    RecordType {
        /// Type mixin.
        ty: TypeFields,
        /// Declared with the `struct` keyword.
        is_struct: bool,
        /// Member fields, in order. Empty for a forward declaration.
        flds: Vec<NodeId>,
        /// Member functions.
        fncs: Vec<NodeId>,
    }
);
crate::fields::field_table!(RecordType {
    @ty,
    is_struct: Flag => Struct,
    flds: RefList => Flds,
    fncs: RefList => Fncs,
});

node_struct!(
    /// Union type.
    UnionType {
        /// Type mixin.
        ty: TypeFields,
        /// Member fields. Empty for a forward declaration.
        flds: Vec<NodeId>,
        /// Member functions.
        fncs: Vec<NodeId>,
    }
);
crate::fields::field_table!(UnionType {
    @ty,
    flds: RefList => Flds,
    fncs: RefList => Fncs,
});

node_struct!(
    /// Enumeration type.
    EnumeralType {
        /// Type mixin.
        ty: TypeFields,
        /// Precision in bits.
        prec: u64,
        /// Unsigned.
        unsigned: bool,
        /// Minimum value constant.
        min: Option<NodeId>,
        /// Maximum value constant.
        max: Option<NodeId>,
        /// Enumerator list.
        csts: Option<NodeId>,
    }
);
crate::fields::field_table!(EnumeralType {
    @ty,
    prec: UInt => Prec,
    unsigned: Flag => Unsigned,
    min: Ref => Min,
    max: Ref => Max,
    csts: Ref => Csts,
});

node_struct!(
    /// Function type.
    FunctionType {
        /// Type mixin.
        ty: TypeFields,
        /// Return type.
        retn: Option<NodeId>,
        /// Parameter type list.
        prms: Option<NodeId>,
        /// Variadic.
        varargs: bool,
    }
);
crate::fields::field_table!(FunctionType {
    @ty,
    retn: Ref => Retn,
    prms: Ref => Prms,
    varargs: Flag => Varargs,
});

node_struct!(
    /// Member function type.
    MethodType {
        /// Type mixin.
        ty: TypeFields,
        /// Return type.
        retn: Option<NodeId>,
        /// Parameter type list.
        prms: Option<NodeId>,
        /// Variadic.
        varargs: bool,
        /// Owning class.
        clas: Option<NodeId>,
    }
);
crate::fields::field_table!(MethodType {
    @ty,
    retn: Ref => Retn,
    prms: Ref => Prms,
    varargs: Flag => Varargs,
    clas: Ref => Clas,
});

node_struct!(
    /// Vector type.
    VectorType {
        /// Type mixin.
        ty: TypeFields,
        /// Element type.
        elts: Option<NodeId>,
    }
);
crate::fields::field_table!(VectorType {
    @ty,
    elts: Ref => Elts,
});

// ---- expressions ----

node_struct!(
    /// One-operand expression.
    UnaryExpr {
        /// Operator.
        op: UnaryOp,
        /// Expression mixin.
        expr: ExprFields,
        /// Operand.
        operand: NodeId,
    }
);
crate::fields::field_table!(UnaryExpr {
    @expr,
    operand: Id => Op [required],
});

node_struct!(
    /// Two-operand expression.
    BinaryExpr {
        /// Operator.
        op: BinaryOp,
        /// Expression mixin.
        expr: ExprFields,
        /// Left operand.
        op0: NodeId,
        /// Right operand.
        op1: NodeId,
    }
);
crate::fields::field_table!(BinaryExpr {
    @expr,
    op0: Id => Op0 [required],
    op1: Id => Op1 [required],
});

node_struct!(
    /// Three-operand expression.
    TernaryExpr {
        /// Operator.
        op: TernaryOp,
        /// Expression mixin.
        expr: ExprFields,
        /// First operand.
        op0: NodeId,
        /// Second operand.
        op1: Option<NodeId>,
        /// Third operand.
        op2: Option<NodeId>,
    }
);
crate::fields::field_table!(TernaryExpr {
    @expr,
    op0: Id => Op0 [required],
    op1: Ref => Op1,
    op2: Ref => Op2,
});

node_struct!(
    /// Four-operand expression.
    QuaternaryExpr {
        /// Operator.
        op: QuaternaryOp,
        /// Expression mixin.
        expr: ExprFields,
        /// Base.
        op0: NodeId,
        /// Index.
        op1: NodeId,
        /// Lower bound.
        op2: Option<NodeId>,
        /// Element size.
        op3: Option<NodeId>,
    }
);
crate::fields::field_table!(QuaternaryExpr {
    @expr,
    op0: Id => Op0 [required],
    op1: Id => Op1 [required],
    op2: Ref => Op2,
    op3: Ref => Op3,
});

node_struct!(
    /// Call expression.
    CallExpr {
        /// Expression mixin.
        expr: ExprFields,
        /// Callee.
        callee: NodeId,
        /// Arguments, in order.
        args: Vec<NodeId>,
    }
);
crate::fields::field_table!(CallExpr {
    @expr,
    callee: Id => Fn [required],
    args: RefList => Arg,
});

// ---- statements ----

node_struct!(
    /// Assignment.
    GimpleAssign {
        /// Statement mixin.
        stmt: StmtFields,
        /// Destination.
        op0: NodeId,
        /// Source.
        op1: NodeId,
        /// Guarding predicate.
        predicate: Option<NodeId>,
        /// Statement this one was derived from.
        orig: Option<NodeId>,
        /// Initializes a declaration.
        init_assignment: bool,
        /// Clobber of the destination.
        clobber: bool,
        /// Source is the address of a temporary.
        temporary_address: bool,
    }
);
crate::fields::field_table!(GimpleAssign {
    @stmt,
    op0: Id => Op0 [required],
    op1: Id => Op1 [required],
    predicate: Ref => Predicate,
    orig: Ref => Orig,
    init_assignment: Flag => InitAssignment,
    clobber: Flag => Clobber,
    temporary_address: Flag => TemporaryAddress,
});

node_struct!(
    /// Two-way branch.
    GimpleCond {
        /// Statement mixin.
        stmt: StmtFields,
        /// Condition.
        op0: NodeId,
    }
);
crate::fields::field_table!(GimpleCond {
    @stmt,
    op0: Id => Op0 [required],
});

node_struct!(
    /// Multi-way branch.
    GimpleSwitch {
        /// Statement mixin.
        stmt: StmtFields,
        /// Selector.
        op0: NodeId,
        /// Case label vector.
        op1: Option<NodeId>,
    }
);
crate::fields::field_table!(GimpleSwitch {
    @stmt,
    op0: Id => Op0 [required],
    op1: Ref => Op1,
});

node_struct!(
    /// Loop header test.
    GimpleWhile {
        /// Statement mixin.
        stmt: StmtFields,
        /// Loop condition.
        op0: NodeId,
    }
);
crate::fields::field_table!(GimpleWhile {
    @stmt,
    op0: Id => Op0 [required],
});

node_struct!(
    /// SSA phi.
    GimplePhi {
        /// Statement mixin.
        stmt: StmtFields,
        /// Defined SSA name.
        res: NodeId,
        /// Incoming definitions.
        def_edges: Vec<PhiEdge>,
        /// Virtual (memory) phi.
        is_virtual: bool,
    }
);
crate::fields::field_table!(GimplePhi {
    @stmt,
    res: Id => Res [required],
    def_edges: Edges => DefEdge,
    is_virtual: Flag => Virtual,
});

node_struct!(
    /// Return.
    GimpleReturn {
        /// Statement mixin.
        stmt: StmtFields,
        /// Returned value.
        op: Option<NodeId>,
    }
);
crate::fields::field_table!(GimpleReturn {
    @stmt,
    op: Ref => Op,
});

node_struct!(
    /// Unconditional jump.
    GimpleGoto {
        /// Statement mixin.
        stmt: StmtFields,
        /// Target.
        op: NodeId,
    }
);
crate::fields::field_table!(GimpleGoto {
    @stmt,
    op: Id => Op [required],
});

node_struct!(
    /// Label definition.
    GimpleLabel {
        /// Statement mixin.
        stmt: StmtFields,
        /// Label declaration.
        op: NodeId,
    }
);
crate::fields::field_table!(GimpleLabel {
    @stmt,
    op: Id => Op [required],
});

node_struct!(
    /// Inline assembly.
    GimpleAsm {
        /// Statement mixin.
        stmt: StmtFields,
        /// `volatile`
        volatile: bool,
        /// Template string.
        template: Option<Symbol>,
        /// Output operand list.
        out: Option<NodeId>,
        /// Input operand list.
        inputs: Option<NodeId>,
        /// Clobber list.
        clob: Option<NodeId>,
    }
);
crate::fields::field_table!(GimpleAsm {
    @stmt,
    volatile: Flag => Volatile,
    template: Str => Str,
    out: Ref => Out,
    inputs: Ref => In,
    clob: Ref => Clob,
});

node_struct!(
    /// Pragma attached to a statement position.
    GimplePragma {
        /// Statement mixin.
        stmt: StmtFields,
        /// Scoped pragma.
        is_block: bool,
        /// Opens a scope.
        open: bool,
        /// Pragma text.
        line: Option<Symbol>,
    }
);
crate::fields::field_table!(GimplePragma {
    @stmt,
    is_block: Flag => IsBlock,
    open: Flag => Open,
    line: Str => Line,
});

node_struct!(
    /// Call statement.
    GimpleCall {
        /// Statement mixin.
        stmt: StmtFields,
        /// Callee.
        callee: NodeId,
        /// Arguments, in order.
        args: Vec<NodeId>,
    }
);
crate::fields::field_table!(GimpleCall {
    @stmt,
    callee: Id => Fn [required],
    args: RefList => Arg,
});

node_struct!(
    /// Empty statement.
    GimpleNop {
        /// Statement mixin.
        stmt: StmtFields,
    }
);
crate::fields::field_table!(GimpleNop { @stmt, });

// ---- SSA ----

node_struct!(
    /// SSA version of a variable.
    SsaName {
        /// Type.
        ty: Option<NodeId>,
        /// Underlying variable.
        var: Option<NodeId>,
        /// Version number.
        vers: u64,
        /// Version before renumbering.
        orig_vers: u64,
        /// Volatile access.
        volatile: bool,
        /// Virtual operand.
        is_virtual: bool,
        /// Default definition.
        default: bool,
        /// Known minimum value.
        min: Option<NodeId>,
        /// Known maximum value.
        max: Option<NodeId>,
    }
);
crate::fields::field_table!(SsaName {
    ty: Ref => Type,
    var: Ref => Var,
    vers: UInt => Vers [required],
    orig_vers: UInt => OrigVers,
    volatile: Flag => Volatile,
    is_virtual: Flag => Virtual,
    default: Flag => Default,
    min: Ref => Min,
    max: Ref => Max,
});

// ---- constants ----

node_struct!(
    /// Integer constant.
    IntegerCst {
        /// Constant mixin.
        cst: CstFields,
        /// Value.
        value: i64,
    }
);
crate::fields::field_table!(IntegerCst {
    @cst,
    value: Int => Value [required],
});

node_struct!(
    /// Floating point constant.
    RealCst {
        /// Constant mixin.
        cst: CstFields,
        /// Overflowed on conversion.
        overflow: bool,
        /// Decimal text.
        valr: Option<Symbol>,
        /// Hexadecimal text.
        valx: Option<Symbol>,
    }
);
crate::fields::field_table!(RealCst {
    @cst,
    overflow: Flag => Overflow,
    valr: Str => Valr [required],
    valx: Str => Valx,
});

node_struct!(
    /// String literal.
    StringCst {
        /// Constant mixin.
        cst: CstFields,
        /// Contents.
        strg: Option<Symbol>,
    }
);
crate::fields::field_table!(StringCst {
    @cst,
    strg: Str => Strg,
});

node_struct!(
    /// Complex constant.
    ComplexCst {
        /// Constant mixin.
        cst: CstFields,
        /// Real part.
        real: Option<NodeId>,
        /// Imaginary part.
        imag: Option<NodeId>,
    }
);
crate::fields::field_table!(ComplexCst {
    @cst,
    real: Ref => Real,
    imag: Ref => Imag,
});

node_struct!(
    /// Vector constant.
    VectorCst {
        /// Constant mixin.
        cst: CstFields,
        /// Lane values, in order.
        valu: Vec<NodeId>,
    }
);
crate::fields::field_table!(VectorCst {
    @cst,
    valu: RefList => Valu,
});

// ---- containers ----

node_struct!(
    /// Function body: plain statements or basic blocks.
    StatementList {
        /// Statements outside any block.
        stmts: Vec<NodeId>,
        /// Basic blocks, in order.
        blocs: Vec<NodeId>,
    }
);
crate::fields::field_table!(StatementList {
    stmts: RefList => Stmt,
    blocs: RefList => Bloc,
});

node_struct!(
    /// Basic block. Predecessor and successor lists hold block numbers;
    /// 0 is the entry block and 1 the exit block.
    BasicBlock {
        /// Block number.
        number: u64,
        /// Innermost loop.
        loop_id: u64,
        /// Predecessor block numbers.
        preds: Vec<u64>,
        /// Successor block numbers.
        succs: Vec<u64>,
        /// Successor taken when the final condition holds.
        true_edge: u64,
        /// Successor taken otherwise.
        false_edge: u64,
        /// Phis, in order.
        phis: Vec<NodeId>,
        /// Statements, in order.
        stmts: Vec<NodeId>,
    }
);
crate::fields::field_table!(BasicBlock {
    number: UInt => Number [required],
    loop_id: UInt => LoopId,
    preds: UIntList => Pred,
    succs: UIntList => Succ,
    true_edge: UInt => TrueEdge,
    false_edge: UInt => FalseEdge,
    phis: RefList => Phi,
    stmts: RefList => Stmt,
});

node_struct!(
    /// Cons cell of a tree list.
    TreeList {
        /// Purpose (key).
        purp: Option<NodeId>,
        /// Value.
        valu: Option<NodeId>,
        /// Next cell.
        chan: Option<NodeId>,
    }
);
crate::fields::field_table!(TreeList {
    purp: Ref => Purp,
    valu: Ref => Valu,
    chan: Ref => Chan,
});

node_struct!(
    /// Vector of nodes.
    TreeVec {
        /// Elements, in order.
        ops: Vec<NodeId>,
    }
);
crate::fields::field_table!(TreeVec {
    ops: RefList => Op,
});

macro_rules! define_node {
    ($($variant:ident($ty:ident),)*) => {
        /// An IR node. Cross-references are [`NodeId`]s into the owning store.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[allow(missing_docs)]
        pub enum Node {
            $($variant($ty),)*
        }

        impl FieldTable for Node {
            fn visit_fields(
                &self,
                f: &mut dyn FnMut(Field, FieldRef<'_>) -> IrResult<()>,
            ) -> IrResult<()> {
                match self {
                    $(Node::$variant(n) => n.visit_fields(f),)*
                }
            }

            fn visit_fields_mut(
                &mut self,
                f: &mut dyn FnMut(Field, FieldMut<'_>) -> IrResult<()>,
            ) -> IrResult<()> {
                match self {
                    $(Node::$variant(n) => n.visit_fields_mut(f),)*
                }
            }
        }
    };
}

define_node! {
    Identifier(Identifier),
    VarDecl(VarDecl),
    FunctionDecl(FunctionDecl),
    ParmDecl(ParmDecl),
    ResultDecl(ResultDecl),
    FieldDecl(FieldDecl),
    TypeDecl(TypeDecl),
    LabelDecl(LabelDecl),
    ConstDecl(ConstDecl),
    VoidType(VoidType),
    BooleanType(BooleanType),
    IntegerType(IntegerType),
    RealType(RealType),
    ComplexType(ComplexType),
    PointerType(PointerType),
    ReferenceType(ReferenceType),
    ArrayType(ArrayType),
    RecordType(RecordType),
    UnionType(UnionType),
    EnumeralType(EnumeralType),
    FunctionType(FunctionType),
    MethodType(MethodType),
    VectorType(VectorType),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Ternary(TernaryExpr),
    Quaternary(QuaternaryExpr),
    Call(CallExpr),
    GimpleAssign(GimpleAssign),
    GimpleCond(GimpleCond),
    GimpleSwitch(GimpleSwitch),
    GimpleWhile(GimpleWhile),
    GimplePhi(GimplePhi),
    GimpleReturn(GimpleReturn),
    GimpleGoto(GimpleGoto),
    GimpleLabel(GimpleLabel),
    GimpleAsm(GimpleAsm),
    GimplePragma(GimplePragma),
    GimpleCall(GimpleCall),
    GimpleNop(GimpleNop),
    SsaName(SsaName),
    IntegerCst(IntegerCst),
    RealCst(RealCst),
    StringCst(StringCst),
    ComplexCst(ComplexCst),
    VectorCst(VectorCst),
    StatementList(StatementList),
    BasicBlock(BasicBlock),
    TreeList(TreeList),
    TreeVec(TreeVec),
}

macro_rules! mixin_access {
    ($(#[$meta:meta])* $get:ident, $get_mut:ident, $mixin:ty, $field:ident: $($variant:ident)|*) => {
        $(#[$meta])*
        pub fn $get(&self) -> Option<&$mixin> {
            match self {
                $(Node::$variant(n) => Some(&n.$field),)*
                _ => None,
            }
        }

        $(#[$meta])*
        pub fn $get_mut(&mut self) -> Option<&mut $mixin> {
            match self {
                $(Node::$variant(n) => Some(&mut n.$field),)*
                _ => None,
            }
        }
    };
}

impl Node {
    /// Creates a node of `kind` with every field absent or zero.
    ///
    /// Fails with [`IrError::UnsupportedKind`] for source-level forms.
    pub fn empty(kind: NodeKind) -> IrResult<Node> {
        Ok(match kind {
            NodeKind::Identifier => Node::Identifier(Identifier::default()),
            NodeKind::VarDecl => Node::VarDecl(VarDecl::default()),
            NodeKind::FunctionDecl => Node::FunctionDecl(FunctionDecl::default()),
            NodeKind::ParmDecl => Node::ParmDecl(ParmDecl::default()),
            NodeKind::ResultDecl => Node::ResultDecl(ResultDecl::default()),
            NodeKind::FieldDecl => Node::FieldDecl(FieldDecl::default()),
            NodeKind::TypeDecl => Node::TypeDecl(TypeDecl::default()),
            NodeKind::LabelDecl => Node::LabelDecl(LabelDecl::default()),
            NodeKind::ConstDecl => Node::ConstDecl(ConstDecl::default()),
            NodeKind::VoidType => Node::VoidType(VoidType::default()),
            NodeKind::BooleanType => Node::BooleanType(BooleanType::default()),
            NodeKind::IntegerType => Node::IntegerType(IntegerType::default()),
            NodeKind::RealType => Node::RealType(RealType::default()),
            NodeKind::ComplexType => Node::ComplexType(ComplexType::default()),
            NodeKind::PointerType => Node::PointerType(PointerType::default()),
            NodeKind::ReferenceType => Node::ReferenceType(ReferenceType::default()),
            NodeKind::ArrayType => Node::ArrayType(ArrayType::default()),
            NodeKind::RecordType => Node::RecordType(RecordType::default()),
            NodeKind::UnionType => Node::UnionType(UnionType::default()),
            NodeKind::EnumeralType => Node::EnumeralType(EnumeralType::default()),
            NodeKind::FunctionType => Node::FunctionType(FunctionType::default()),
            NodeKind::MethodType => Node::MethodType(MethodType::default()),
            NodeKind::VectorType => Node::VectorType(VectorType::default()),
            NodeKind::Unary(op) => Node::Unary(UnaryExpr {
                op,
                ..UnaryExpr::default()
            }),
            NodeKind::Binary(op) => Node::Binary(BinaryExpr {
                op,
                ..BinaryExpr::default()
            }),
            NodeKind::Ternary(op) => Node::Ternary(TernaryExpr {
                op,
                ..TernaryExpr::default()
            }),
            NodeKind::Quaternary(op) => Node::Quaternary(QuaternaryExpr {
                op,
                ..QuaternaryExpr::default()
            }),
            NodeKind::CallExpr => Node::Call(CallExpr::default()),
            NodeKind::GimpleAssign => Node::GimpleAssign(GimpleAssign::default()),
            NodeKind::GimpleCond => Node::GimpleCond(GimpleCond::default()),
            NodeKind::GimpleSwitch => Node::GimpleSwitch(GimpleSwitch::default()),
            NodeKind::GimpleWhile => Node::GimpleWhile(GimpleWhile::default()),
            NodeKind::GimplePhi => Node::GimplePhi(GimplePhi::default()),
            NodeKind::GimpleReturn => Node::GimpleReturn(GimpleReturn::default()),
            NodeKind::GimpleGoto => Node::GimpleGoto(GimpleGoto::default()),
            NodeKind::GimpleLabel => Node::GimpleLabel(GimpleLabel::default()),
            NodeKind::GimpleAsm => Node::GimpleAsm(GimpleAsm::default()),
            NodeKind::GimplePragma => Node::GimplePragma(GimplePragma::default()),
            NodeKind::GimpleCall => Node::GimpleCall(GimpleCall::default()),
            NodeKind::GimpleNop => Node::GimpleNop(GimpleNop::default()),
            NodeKind::SsaName => Node::SsaName(SsaName::default()),
            NodeKind::IntegerCst => Node::IntegerCst(IntegerCst::default()),
            NodeKind::RealCst => Node::RealCst(RealCst::default()),
            NodeKind::StringCst => Node::StringCst(StringCst::default()),
            NodeKind::ComplexCst => Node::ComplexCst(ComplexCst::default()),
            NodeKind::VectorCst => Node::VectorCst(VectorCst::default()),
            NodeKind::StatementList => Node::StatementList(StatementList::default()),
            NodeKind::BasicBlock => Node::BasicBlock(BasicBlock::default()),
            NodeKind::TreeList => Node::TreeList(TreeList::default()),
            NodeKind::TreeVec => Node::TreeVec(TreeVec::default()),
            NodeKind::SourceLevel(kind) => {
                return Err(IrError::UnsupportedKind(kind.name().to_string()))
            }
        })
    }

    /// The node's kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Identifier(_) => NodeKind::Identifier,
            Node::VarDecl(_) => NodeKind::VarDecl,
            Node::FunctionDecl(_) => NodeKind::FunctionDecl,
            Node::ParmDecl(_) => NodeKind::ParmDecl,
            Node::ResultDecl(_) => NodeKind::ResultDecl,
            Node::FieldDecl(_) => NodeKind::FieldDecl,
            Node::TypeDecl(_) => NodeKind::TypeDecl,
            Node::LabelDecl(_) => NodeKind::LabelDecl,
            Node::ConstDecl(_) => NodeKind::ConstDecl,
            Node::VoidType(_) => NodeKind::VoidType,
            Node::BooleanType(_) => NodeKind::BooleanType,
            Node::IntegerType(_) => NodeKind::IntegerType,
            Node::RealType(_) => NodeKind::RealType,
            Node::ComplexType(_) => NodeKind::ComplexType,
            Node::PointerType(_) => NodeKind::PointerType,
            Node::ReferenceType(_) => NodeKind::ReferenceType,
            Node::ArrayType(_) => NodeKind::ArrayType,
            Node::RecordType(_) => NodeKind::RecordType,
            Node::UnionType(_) => NodeKind::UnionType,
            Node::EnumeralType(_) => NodeKind::EnumeralType,
            Node::FunctionType(_) => NodeKind::FunctionType,
            Node::MethodType(_) => NodeKind::MethodType,
            Node::VectorType(_) => NodeKind::VectorType,
            Node::Unary(n) => NodeKind::Unary(n.op),
            Node::Binary(n) => NodeKind::Binary(n.op),
            Node::Ternary(n) => NodeKind::Ternary(n.op),
            Node::Quaternary(n) => NodeKind::Quaternary(n.op),
            Node::Call(_) => NodeKind::CallExpr,
            Node::GimpleAssign(_) => NodeKind::GimpleAssign,
            Node::GimpleCond(_) => NodeKind::GimpleCond,
            Node::GimpleSwitch(_) => NodeKind::GimpleSwitch,
            Node::GimpleWhile(_) => NodeKind::GimpleWhile,
            Node::GimplePhi(_) => NodeKind::GimplePhi,
            Node::GimpleReturn(_) => NodeKind::GimpleReturn,
            Node::GimpleGoto(_) => NodeKind::GimpleGoto,
            Node::GimpleLabel(_) => NodeKind::GimpleLabel,
            Node::GimpleAsm(_) => NodeKind::GimpleAsm,
            Node::GimplePragma(_) => NodeKind::GimplePragma,
            Node::GimpleCall(_) => NodeKind::GimpleCall,
            Node::GimpleNop(_) => NodeKind::GimpleNop,
            Node::SsaName(_) => NodeKind::SsaName,
            Node::IntegerCst(_) => NodeKind::IntegerCst,
            Node::RealCst(_) => NodeKind::RealCst,
            Node::StringCst(_) => NodeKind::StringCst,
            Node::ComplexCst(_) => NodeKind::ComplexCst,
            Node::VectorCst(_) => NodeKind::VectorCst,
            Node::StatementList(_) => NodeKind::StatementList,
            Node::BasicBlock(_) => NodeKind::BasicBlock,
            Node::TreeList(_) => NodeKind::TreeList,
            Node::TreeVec(_) => NodeKind::TreeVec,
        }
    }

    mixin_access!(
        /// Declaration mixin, for declaration kinds.
        decl, decl_mut, DeclFields, decl:
        VarDecl | FunctionDecl | ParmDecl | ResultDecl | FieldDecl | TypeDecl | LabelDecl | ConstDecl
    );

    mixin_access!(
        /// Type mixin, for type kinds.
        type_fields, type_fields_mut, TypeFields, ty:
        VoidType | BooleanType | IntegerType | RealType | ComplexType | PointerType
            | ReferenceType | ArrayType | RecordType | UnionType | EnumeralType | FunctionType
            | MethodType | VectorType
    );

    mixin_access!(
        /// Expression mixin, for expression kinds.
        expr, expr_mut, ExprFields, expr:
        Unary | Binary | Ternary | Quaternary | Call
    );

    mixin_access!(
        /// Statement mixin, for lowered statement kinds.
        stmt, stmt_mut, StmtFields, stmt:
        GimpleAssign | GimpleCond | GimpleSwitch | GimpleWhile | GimplePhi | GimpleReturn
            | GimpleGoto | GimpleLabel | GimpleAsm | GimplePragma | GimpleCall | GimpleNop
    );

    mixin_access!(
        /// Constant mixin, for constant kinds.
        cst, cst_mut, CstFields, cst:
        IntegerCst | RealCst | StringCst | ComplexCst | VectorCst
    );

    /// Member fields of a record or union.
    pub fn record_fields(&self) -> Option<&[NodeId]> {
        match self {
            Node::RecordType(n) => Some(&n.flds),
            Node::UnionType(n) => Some(&n.flds),
            _ => None,
        }
    }

    /// Returns `true` for a function declaration carrying a body.
    pub fn has_body(&self) -> bool {
        matches!(self, Node::FunctionDecl(f) if f.body.is_some())
    }

    /// Returns `true` for file-level or function-level static storage.
    pub fn is_static(&self) -> bool {
        match self {
            Node::FunctionDecl(f) => f.is_static,
            Node::VarDecl(v) => v.is_static || v.static_static,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SourceLevelKind;
    use crate::tag::Tag;

    #[test]
    fn empty_round_trips_kind() {
        for kind in [
            NodeKind::VarDecl,
            NodeKind::RecordType,
            NodeKind::Binary(BinaryOp::MemRef),
            NodeKind::Quaternary(QuaternaryOp::ArrayRef),
            NodeKind::GimplePhi,
            NodeKind::BasicBlock,
        ] {
            assert_eq!(Node::empty(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn source_level_kinds_cannot_be_created() {
        let err = Node::empty(NodeKind::SourceLevel(SourceLevelKind::ForStmt)).unwrap_err();
        assert!(matches!(err, IrError::UnsupportedKind(name) if name == "for_stmt"));
    }

    #[test]
    fn var_decl_table_starts_with_decl_mixin() {
        let fields = Node::empty(NodeKind::VarDecl).unwrap().fields();
        assert_eq!(fields[0].tag, Tag::Name);
        assert!(fields.iter().any(|f| f.tag == Tag::Extern));
        assert!(fields.iter().all(|f| !f.required));
    }

    #[test]
    fn required_fields_are_marked() {
        let required: Vec<Tag> = Node::empty(NodeKind::Binary(BinaryOp::Plus))
            .unwrap()
            .fields()
            .into_iter()
            .filter(|f| f.required)
            .map(|f| f.tag)
            .collect();
        assert_eq!(required, vec![Tag::Op0, Tag::Op1]);
    }

    #[test]
    fn mixin_accessors_match_category() {
        let var = Node::empty(NodeKind::VarDecl).unwrap();
        assert!(var.decl().is_some());
        assert!(var.type_fields().is_none());
        let cst = Node::empty(NodeKind::IntegerCst).unwrap();
        assert!(cst.cst().is_some());
        assert!(cst.decl().is_none());
    }

    #[test]
    fn references_include_phi_definitions() {
        let phi = Node::GimplePhi(GimplePhi {
            res: NodeId::from_raw(5),
            def_edges: vec![
                PhiEdge {
                    def: NodeId::from_raw(6),
                    edge: 2,
                },
                PhiEdge {
                    def: NodeId::from_raw(7),
                    edge: 3,
                },
            ],
            ..GimplePhi::default()
        });
        let refs: Vec<u32> = phi.references().iter().map(|id| id.as_raw()).collect();
        assert_eq!(refs, vec![5, 6, 7]);
    }

    #[test]
    fn body_and_static_helpers() {
        let mut f = FunctionDecl::default();
        assert!(!Node::FunctionDecl(f.clone()).has_body());
        f.body = Some(NodeId::from_raw(9));
        f.is_static = true;
        let node = Node::FunctionDecl(f);
        assert!(node.has_body());
        assert!(node.is_static());
    }
}
