//! Per-kind field tables and the shared capability mixins.
//!
//! Every node kind declares its fields once, through [`field_table!`], as an
//! ordered list of `(field, value kind, tag)` entries with an optional
//! `[required]` marker. The generated [`FieldTable`] impl is what the
//! builder, finder, serializer and merger walk; none of them match on
//! individual kinds to reach a field.

use crate::error::IrResult;
use crate::ids::NodeId;
use crate::tag::Tag;
use arbor_common::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A source location. The file name is interned in the owning store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePos {
    /// Interned file name.
    pub file: Symbol,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

/// Type qualifier set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qualifiers {
    /// `const`
    pub constant: bool,
    /// `volatile`
    pub volatile: bool,
    /// `restrict`
    pub restrict: bool,
}

impl Qualifiers {
    /// Returns `true` when no qualifier is set.
    pub fn is_empty(self) -> bool {
        !(self.constant || self.volatile || self.restrict)
    }

    /// Parses a combination of the letters `c`, `v` and `r`.
    pub fn parse(text: &str) -> Option<Qualifiers> {
        let mut quals = Qualifiers::default();
        for letter in text.chars() {
            match letter {
                'c' => quals.constant = true,
                'v' => quals.volatile = true,
                'r' => quals.restrict = true,
                _ => return None,
            }
        }
        Some(quals)
    }
}

impl fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constant {
            f.write_str("c")?;
        }
        if self.volatile {
            f.write_str("v")?;
        }
        if self.restrict {
            f.write_str("r")?;
        }
        Ok(())
    }
}

/// One incoming value of a phi: the reaching definition and the number of
/// the edge it arrives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhiEdge {
    /// Reaching definition.
    pub def: NodeId,
    /// Incoming edge number.
    pub edge: u32,
}

/// Descriptor of one field of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub tag: Tag,
    /// A schema must supply the field.
    pub required: bool,
}

impl Field {
    /// An optional field.
    pub const fn optional(tag: Tag) -> Self {
        Self {
            tag,
            required: false,
        }
    }

    /// A required field.
    pub const fn required(tag: Tag) -> Self {
        Self {
            tag,
            required: true,
        }
    }
}

/// Shared view of a field's storage.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    /// Mandatory cross-reference.
    Id(&'a NodeId),
    /// Optional cross-reference.
    Ref(&'a Option<NodeId>),
    /// Ordered cross-references.
    RefList(&'a Vec<NodeId>),
    /// Interned string.
    Str(&'a Option<Symbol>),
    /// Source position.
    Pos(&'a Option<SourcePos>),
    /// Boolean flag.
    Flag(&'a bool),
    /// Signed integer.
    Int(&'a i64),
    /// Unsigned integer.
    UInt(&'a u64),
    /// Qualifier set.
    Quals(&'a Qualifiers),
    /// Ordered unsigned integers.
    UIntList(&'a Vec<u64>),
    /// Phi incoming values.
    Edges(&'a Vec<PhiEdge>),
}

impl FieldRef<'_> {
    /// Appends every node id this field refers to.
    pub fn collect_refs(&self, out: &mut Vec<NodeId>) {
        match self {
            FieldRef::Id(id) => out.push(**id),
            FieldRef::Ref(Some(id)) => out.push(*id),
            FieldRef::RefList(ids) => out.extend(ids.iter().copied()),
            FieldRef::Edges(edges) => out.extend(edges.iter().map(|e| e.def)),
            _ => {}
        }
    }

    /// Returns `true` for multi-valued fields.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            FieldRef::RefList(_) | FieldRef::UIntList(_) | FieldRef::Edges(_)
        )
    }
}

/// Mutable view of a field's storage.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum FieldMut<'a> {
    Id(&'a mut NodeId),
    Ref(&'a mut Option<NodeId>),
    RefList(&'a mut Vec<NodeId>),
    Str(&'a mut Option<Symbol>),
    Pos(&'a mut Option<SourcePos>),
    Flag(&'a mut bool),
    Int(&'a mut i64),
    UInt(&'a mut u64),
    Quals(&'a mut Qualifiers),
    UIntList(&'a mut Vec<u64>),
    Edges(&'a mut Vec<PhiEdge>),
}

/// Ordered field walk over a node or mixin.
pub trait FieldTable {
    /// Calls `f` for each field in table order.
    fn visit_fields(
        &self,
        f: &mut dyn FnMut(Field, FieldRef<'_>) -> IrResult<()>,
    ) -> IrResult<()>;

    /// Calls `f` with mutable access to each field in table order.
    fn visit_fields_mut(
        &mut self,
        f: &mut dyn FnMut(Field, FieldMut<'_>) -> IrResult<()>,
    ) -> IrResult<()>;

    /// The field descriptors, in table order.
    fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        // The closure never fails.
        let _ = self.visit_fields(&mut |field, _| {
            out.push(field);
            Ok(())
        });
        out
    }

    /// Every node id referenced by any field, in table order.
    fn references(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let _ = self.visit_fields(&mut |_, value| {
            value.collect_refs(&mut out);
            Ok(())
        });
        out
    }
}

/// Implements [`FieldTable`] from a field list.
///
/// ```ignore
/// field_table!(VarDecl {
///     @decl,
///     init: Ref => Init,
///     vers: UInt => Vers [required],
/// });
/// ```
/// `@name` entries delegate to a mixin stored in field `name`, and come first.
macro_rules! field_table {
    (@field $tag:ident) => {
        $crate::fields::Field::optional($crate::tag::Tag::$tag)
    };
    (@field $tag:ident required) => {
        $crate::fields::Field::required($crate::tag::Tag::$tag)
    };
    ($ty:ident { $(@$mixin:ident,)* $($field:ident: $kind:ident => $tag:ident $([$req:ident])?,)* }) => {
        impl $crate::fields::FieldTable for $ty {
            #[allow(unused_variables)]
            fn visit_fields(
                &self,
                f: &mut dyn FnMut(
                    $crate::fields::Field,
                    $crate::fields::FieldRef<'_>,
                ) -> $crate::error::IrResult<()>,
            ) -> $crate::error::IrResult<()> {
                $( $crate::fields::FieldTable::visit_fields(&self.$mixin, f)?; )*
                $( f(
                    $crate::fields::field_table!(@field $tag $($req)?),
                    $crate::fields::FieldRef::$kind(&self.$field),
                )?; )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn visit_fields_mut(
                &mut self,
                f: &mut dyn FnMut(
                    $crate::fields::Field,
                    $crate::fields::FieldMut<'_>,
                ) -> $crate::error::IrResult<()>,
            ) -> $crate::error::IrResult<()> {
                $( $crate::fields::FieldTable::visit_fields_mut(&mut self.$mixin, f)?; )*
                $( f(
                    $crate::fields::field_table!(@field $tag $($req)?),
                    $crate::fields::FieldMut::$kind(&mut self.$field),
                )?; )*
                Ok(())
            }
        }
    };
}

pub(crate) use field_table;

/// Fields shared by every declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclFields {
    /// Identifier naming the declaration.
    pub name: Option<NodeId>,
    /// Identifier holding the mangled name.
    pub mngl: Option<NodeId>,
    /// Abstract origin.
    pub orig: Option<NodeId>,
    /// Declared type.
    pub ty: Option<NodeId>,
    /// Enclosing scope.
    pub scpe: Option<NodeId>,
    /// Declaration position.
    pub srcp: Option<SourcePos>,
    /// Attribute list.
    pub attributes: Option<NodeId>,
    /// Next declaration in the same chain.
    pub chan: Option<NodeId>,
    /// Compiler-generated.
    pub artificial: bool,
    /// Packed layout.
    pub packed: bool,
    /// Declared in an operating-system header.
    pub operating_system: bool,
    /// Declared in a library header.
    pub library_system: bool,
    /// Front-end unique id.
    pub uid: u64,
}

field_table!(DeclFields {
    name: Ref => Name,
    mngl: Ref => Mngl,
    orig: Ref => Orig,
    ty: Ref => Type,
    scpe: Ref => Scpe,
    srcp: Pos => Srcp,
    attributes: Ref => Attributes,
    chan: Ref => Chan,
    artificial: Flag => Artificial,
    packed: Flag => Packed,
    operating_system: Flag => OperatingSystem,
    library_system: Flag => LibrarySystem,
    uid: UInt => Uid,
});

/// Fields shared by every type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeFields {
    /// Qualifiers.
    pub qual: Qualifiers,
    /// Identifier or `type_decl` naming the type.
    pub name: Option<NodeId>,
    /// Unqualified main variant.
    pub unql: Option<NodeId>,
    /// Size in bits, as a constant.
    pub size: Option<NodeId>,
    /// Enclosing scope.
    pub scpe: Option<NodeId>,
    /// Alignment in bits.
    pub algn: u64,
    /// Packed layout.
    pub packed: bool,
    /// Declared in a system header.
    pub system: bool,
}

field_table!(TypeFields {
    qual: Quals => Qual,
    name: Ref => Name,
    unql: Ref => Unql,
    size: Ref => Size,
    scpe: Ref => Scpe,
    algn: UInt => Algn,
    packed: Flag => Packed,
    system: Flag => System,
});

/// Fields shared by every expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExprFields {
    /// Result type.
    pub ty: Option<NodeId>,
    /// Expression position.
    pub srcp: Option<SourcePos>,
}

field_table!(ExprFields {
    ty: Ref => Type,
    srcp: Pos => Srcp,
});

/// Fields shared by every lowered statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StmtFields {
    /// Enclosing function.
    pub scpe: Option<NodeId>,
    /// Index of the owning basic block.
    pub bb_index: u64,
    /// Memory read set.
    pub memuse: Option<NodeId>,
    /// Memory write set.
    pub memdef: Option<NodeId>,
    /// Virtual uses.
    pub vuses: Vec<NodeId>,
    /// Virtual definition.
    pub vdef: Option<NodeId>,
    /// Attached pragmas.
    pub pragmas: Vec<NodeId>,
    /// Statement position.
    pub srcp: Option<SourcePos>,
}

field_table!(StmtFields {
    scpe: Ref => Scpe,
    bb_index: UInt => BbIndex,
    memuse: Ref => Memuse,
    memdef: Ref => Memdef,
    vuses: RefList => Vuse,
    vdef: Ref => Vdef,
    pragmas: RefList => Pragma,
    srcp: Pos => Srcp,
});

/// Fields shared by every constant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CstFields {
    /// Constant type.
    pub ty: Option<NodeId>,
}

field_table!(CstFields {
    ty: Ref => Type,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifiers_roundtrip() {
        let quals = Qualifiers::parse("cv").unwrap();
        assert!(quals.constant && quals.volatile && !quals.restrict);
        assert_eq!(quals.to_string(), "cv");
        assert!(Qualifiers::parse("").unwrap().is_empty());
        assert!(Qualifiers::parse("x").is_none());
    }

    #[test]
    fn decl_mixin_table_order() {
        let tags: Vec<Tag> = DeclFields::default().fields().iter().map(|f| f.tag).collect();
        assert_eq!(&tags[..6], &[Tag::Name, Tag::Mngl, Tag::Orig, Tag::Type, Tag::Scpe, Tag::Srcp]);
        assert!(DeclFields::default().fields().iter().all(|f| !f.required));
    }

    #[test]
    fn references_cover_scalars_and_lists() {
        let stmt = StmtFields {
            scpe: Some(NodeId::from_raw(3)),
            vuses: vec![NodeId::from_raw(8), NodeId::from_raw(9)],
            vdef: Some(NodeId::from_raw(10)),
            ..StmtFields::default()
        };
        let refs: Vec<u32> = stmt.references().iter().map(|id| id.as_raw()).collect();
        assert_eq!(refs, vec![3, 8, 9, 10]);
    }

    #[test]
    fn mutable_walk_reaches_every_field() {
        let mut ty = TypeFields::default();
        ty.visit_fields_mut(&mut |field, value| {
            match (field.tag, value) {
                (Tag::Name, FieldMut::Ref(slot)) => *slot = Some(NodeId::from_raw(4)),
                (Tag::Algn, FieldMut::UInt(slot)) => *slot = 32,
                _ => {}
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(ty.name, Some(NodeId::from_raw(4)));
        assert_eq!(ty.algn, 32);
    }
}
