//! Node kinds and their textual markers.
//!
//! Expression kinds that share a field layout are grouped behind an operator
//! enum ([`UnaryOp`], [`BinaryOp`], [`TernaryOp`], [`QuaternaryOp`]); every
//! other kind has a variant of its own. Source-level statement forms that the
//! front-end may name but that never reach the IR are kept apart in
//! [`SourceLevelKind`] so that building one fails loudly.

use crate::error::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_ops {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
        }

        impl $name {
            /// Every operator, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// The operator's kind marker.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }

            /// Looks an operator up by kind marker.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_ops! {
    /// One-operand expression kinds.
    UnaryOp {
        /// Value-preserving conversion.
        #[default]
        Nop => "nop_expr",
        /// Value conversion.
        Convert => "convert_expr",
        /// Reinterpretation of the bit pattern.
        ViewConvert => "view_convert_expr",
        /// Arithmetic negation.
        Negate => "negate_expr",
        /// Absolute value.
        Abs => "abs_expr",
        /// Bitwise complement.
        BitNot => "bit_not_expr",
        /// Logical negation.
        TruthNot => "truth_not_expr",
        /// Address-of.
        Addr => "addr_expr",
        /// Pointer dereference.
        IndirectRef => "indirect_ref",
        /// Real part of a complex value.
        RealPart => "realpart_expr",
        /// Imaginary part of a complex value.
        ImagPart => "imagpart_expr",
        /// Integer to floating point.
        Float => "float_expr",
        /// Floating point to integer, truncating.
        FixTrunc => "fix_trunc_expr",
        /// Parenthesized expression.
        Paren => "paren_expr",
        /// Horizontal vector sum.
        ReducPlus => "reduc_plus_expr",
    }
}

define_ops! {
    /// Two-operand expression kinds.
    BinaryOp {
        /// Addition.
        #[default]
        Plus => "plus_expr",
        /// Subtraction.
        Minus => "minus_expr",
        /// Multiplication.
        Mult => "mult_expr",
        /// Integer division rounding toward zero.
        TruncDiv => "trunc_div_expr",
        /// Remainder of truncating division.
        TruncMod => "trunc_mod_expr",
        /// Floating point division.
        Rdiv => "rdiv_expr",
        /// Division known to be exact.
        ExactDiv => "exact_div_expr",
        /// Bitwise and.
        BitAnd => "bit_and_expr",
        /// Bitwise inclusive or.
        BitIor => "bit_ior_expr",
        /// Bitwise exclusive or.
        BitXor => "bit_xor_expr",
        /// Left shift.
        Lshift => "lshift_expr",
        /// Right shift.
        Rshift => "rshift_expr",
        /// Left rotation.
        Lrotate => "lrotate_expr",
        /// Right rotation.
        Rrotate => "rrotate_expr",
        /// Equality.
        Eq => "eq_expr",
        /// Inequality.
        Ne => "ne_expr",
        /// Less than.
        Lt => "lt_expr",
        /// Less or equal.
        Le => "le_expr",
        /// Greater than.
        Gt => "gt_expr",
        /// Greater or equal.
        Ge => "ge_expr",
        /// Logical and, both operands evaluated.
        TruthAnd => "truth_and_expr",
        /// Logical or, both operands evaluated.
        TruthOr => "truth_or_expr",
        /// Short-circuit logical and.
        TruthAndif => "truth_andif_expr",
        /// Short-circuit logical or.
        TruthOrif => "truth_orif_expr",
        /// Minimum.
        Min => "min_expr",
        /// Maximum.
        Max => "max_expr",
        /// Pointer plus byte offset.
        PointerPlus => "pointer_plus_expr",
        /// Memory reference at base plus offset.
        MemRef => "mem_ref",
        /// Complex value from real and imaginary parts.
        Complex => "complex_expr",
        /// Assignment.
        Modify => "modify_expr",
        /// Initialization.
        Init => "init_expr",
        /// Sequence of two expressions.
        Compound => "compound_expr",
    }
}

define_ops! {
    /// Three-operand expression kinds.
    TernaryOp {
        /// Conditional selection.
        #[default]
        Cond => "cond_expr",
        /// Structure member access.
        ComponentRef => "component_ref",
        /// Bit-field extraction.
        BitFieldRef => "bit_field_ref",
        /// Lane-wise conditional selection.
        VecCond => "vec_cond_expr",
        /// Vector permutation.
        VecPerm => "vec_perm_expr",
        /// Concatenation by inclusive or of shifted operands.
        BitIorConcat => "bit_ior_concat_expr",
        /// Virtual table lookup.
        ObjTypeRef => "obj_type_ref",
    }
}

define_ops! {
    /// Four-operand expression kinds.
    QuaternaryOp {
        /// Array element access.
        #[default]
        ArrayRef => "array_ref",
        /// Array slice access.
        ArrayRangeRef => "array_range_ref",
    }
}

define_ops! {
    /// Front-end statement forms that are lowered before they reach the IR.
    SourceLevelKind {
        /// Structured if.
        #[default]
        IfStmt => "if_stmt",
        /// Structured for loop.
        ForStmt => "for_stmt",
        /// Structured while loop.
        WhileStmt => "while_stmt",
        /// Structured do loop.
        DoStmt => "do_stmt",
        /// Assertion.
        AssertExpr => "assert_expr",
        /// Type trait query.
        TraitExpr => "trait_expr",
        /// Branch prediction hint.
        GimplePredict => "gimple_predict",
    }
}

/// Capability group a kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Identifier leaves.
    Identifier,
    /// Declarations.
    Declaration,
    /// Types.
    Type,
    /// Expressions.
    Expression,
    /// Lowered statements.
    Statement,
    /// SSA versions.
    Ssa,
    /// Constants.
    Constant,
    /// Statement lists, basic blocks, tree lists and vectors.
    Container,
    /// Source-level forms with no IR representation.
    SourceLevel,
}

macro_rules! simple_kinds {
    ($($variant:ident => $text:literal : $category:ident,)*) => {
        /// The kind of a node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[allow(missing_docs)]
        pub enum NodeKind {
            $($variant,)*
            Unary(UnaryOp),
            Binary(BinaryOp),
            Ternary(TernaryOp),
            Quaternary(QuaternaryOp),
            SourceLevel(SourceLevelKind),
        }

        impl NodeKind {
            /// The kind's textual marker.
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $text,)*
                    NodeKind::Unary(op) => op.name(),
                    NodeKind::Binary(op) => op.name(),
                    NodeKind::Ternary(op) => op.name(),
                    NodeKind::Quaternary(op) => op.name(),
                    NodeKind::SourceLevel(kind) => kind.name(),
                }
            }

            /// The capability group of this kind.
            pub fn category(self) -> Category {
                match self {
                    $(NodeKind::$variant => Category::$category,)*
                    NodeKind::Unary(_)
                    | NodeKind::Binary(_)
                    | NodeKind::Ternary(_)
                    | NodeKind::Quaternary(_) => Category::Expression,
                    NodeKind::SourceLevel(_) => Category::SourceLevel,
                }
            }

            /// Looks a kind up by textual marker.
            pub fn from_name(name: &str) -> Option<NodeKind> {
                match name {
                    $($text => Some(NodeKind::$variant),)*
                    _ => UnaryOp::from_name(name)
                        .map(NodeKind::Unary)
                        .or_else(|| BinaryOp::from_name(name).map(NodeKind::Binary))
                        .or_else(|| TernaryOp::from_name(name).map(NodeKind::Ternary))
                        .or_else(|| QuaternaryOp::from_name(name).map(NodeKind::Quaternary))
                        .or_else(|| SourceLevelKind::from_name(name).map(NodeKind::SourceLevel)),
                }
            }
        }
    };
}

simple_kinds! {
    Identifier => "identifier_node": Identifier,
    VarDecl => "var_decl": Declaration,
    FunctionDecl => "function_decl": Declaration,
    ParmDecl => "parm_decl": Declaration,
    ResultDecl => "result_decl": Declaration,
    FieldDecl => "field_decl": Declaration,
    TypeDecl => "type_decl": Declaration,
    LabelDecl => "label_decl": Declaration,
    ConstDecl => "const_decl": Declaration,
    VoidType => "void_type": Type,
    BooleanType => "boolean_type": Type,
    IntegerType => "integer_type": Type,
    RealType => "real_type": Type,
    ComplexType => "complex_type": Type,
    PointerType => "pointer_type": Type,
    ReferenceType => "reference_type": Type,
    ArrayType => "array_type": Type,
    RecordType => "record_type": Type,
    UnionType => "union_type": Type,
    EnumeralType => "enumeral_type": Type,
    FunctionType => "function_type": Type,
    MethodType => "method_type": Type,
    VectorType => "vector_type": Type,
    CallExpr => "call_expr": Expression,
    GimpleAssign => "gimple_assign": Statement,
    GimpleCond => "gimple_cond": Statement,
    GimpleSwitch => "gimple_switch": Statement,
    GimpleWhile => "gimple_while": Statement,
    GimplePhi => "gimple_phi": Statement,
    GimpleReturn => "gimple_return": Statement,
    GimpleGoto => "gimple_goto": Statement,
    GimpleLabel => "gimple_label": Statement,
    GimpleAsm => "gimple_asm": Statement,
    GimplePragma => "gimple_pragma": Statement,
    GimpleCall => "gimple_call": Statement,
    GimpleNop => "gimple_nop": Statement,
    SsaName => "ssa_name": Ssa,
    IntegerCst => "integer_cst": Constant,
    RealCst => "real_cst": Constant,
    StringCst => "string_cst": Constant,
    ComplexCst => "complex_cst": Constant,
    VectorCst => "vector_cst": Constant,
    StatementList => "statement_list": Container,
    BasicBlock => "bloc": Container,
    TreeList => "tree_list": Container,
    TreeVec => "tree_vec": Container,
}

impl NodeKind {
    /// Parses a kind marker, failing with [`IrError::UnsupportedKind`].
    pub fn parse(name: &str) -> IrResult<NodeKind> {
        NodeKind::from_name(name).ok_or_else(|| IrError::UnsupportedKind(name.to_string()))
    }

    /// Returns `true` for declaration kinds.
    pub fn is_decl(self) -> bool {
        self.category() == Category::Declaration
    }

    /// Returns `true` for type kinds.
    pub fn is_type(self) -> bool {
        self.category() == Category::Type
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
