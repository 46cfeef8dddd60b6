//! Field tags: the names under which node fields appear in schemas and in
//! the textual format.
//!
//! A tag only names a field. Which value kind it carries, and whether it is
//! required, is decided by each node kind's field table; `real` is a flag on
//! `complex_type` but a reference on `complex_cst`.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_tags {
    ($($variant:ident => $text:literal,)*) => {
        /// Name of a node field.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[allow(missing_docs)]
        pub enum Tag {
            $($variant,)*
        }

        impl Tag {
            /// Every tag, in declaration order.
            pub const ALL: &'static [Tag] = &[$(Tag::$variant,)*];

            /// The tag's textual name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Tag::$variant => $text,)*
                }
            }

            /// Looks a tag up by its textual name.
            pub fn from_name(name: &str) -> Option<Tag> {
                match name {
                    $($text => Some(Tag::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_tags! {
    Name => "name",
    Mngl => "mngl",
    Orig => "orig",
    Type => "type",
    Scpe => "scpe",
    Srcp => "srcp",
    Attributes => "attributes",
    Chan => "chan",
    Artificial => "artificial",
    Packed => "packed",
    OperatingSystem => "operating_system",
    LibrarySystem => "library_system",
    Uid => "uid",
    Qual => "qual",
    Unql => "unql",
    Size => "size",
    Algn => "algn",
    System => "system",
    BbIndex => "bb_index",
    Memuse => "memuse",
    Memdef => "memdef",
    Vuse => "vuse",
    Vdef => "vdef",
    Pragma => "pragma",
    Strg => "strg",
    Operator => "operator",
    StaticStatic => "static_static",
    Extern => "extern",
    Static => "static",
    Init => "init",
    Used => "used",
    Register => "register",
    Readonly => "readonly",
    AddrTaken => "addr_taken",
    BitValues => "bit_values",
    Fn => "fn",
    Arg => "arg",
    Undefined => "undefined",
    Builtin => "builtin",
    Body => "body",
    Argt => "argt",
    Bpos => "bpos",
    Cnst => "cnst",
    Prec => "prec",
    Unsigned => "unsigned",
    Min => "min",
    Max => "max",
    Real => "real",
    Imag => "imag",
    Ptd => "ptd",
    Refd => "refd",
    Elts => "elts",
    Domn => "domn",
    Struct => "struct",
    Flds => "flds",
    Fncs => "fncs",
    Csts => "csts",
    Retn => "retn",
    Prms => "prms",
    Varargs => "varargs",
    Clas => "clas",
    Op => "op",
    Op0 => "op0",
    Op1 => "op1",
    Op2 => "op2",
    Op3 => "op3",
    Predicate => "predicate",
    InitAssignment => "init_assignment",
    Clobber => "clobber",
    TemporaryAddress => "temporary_address",
    Res => "res",
    DefEdge => "def_edge",
    Virtual => "virtual",
    Volatile => "volatile",
    Str => "str",
    Out => "out",
    In => "in",
    Clob => "clob",
    IsBlock => "is_block",
    Open => "open",
    Line => "line",
    Var => "var",
    Vers => "vers",
    OrigVers => "orig_vers",
    Default => "default",
    Value => "value",
    Overflow => "overflow",
    Valr => "valr",
    Valx => "valx",
    Valu => "valu",
    Stmt => "stmt",
    Bloc => "bloc",
    Number => "number",
    LoopId => "loop_id",
    Pred => "pred",
    Succ => "succ",
    TrueEdge => "true_edge",
    FalseEdge => "false_edge",
    Phi => "phi",
    Purp => "purp",
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
