//! Node construction from generic field schemas.

use crate::error::{IrError, IrResult};
use crate::fields::{FieldMut, FieldTable, SourcePos};
use crate::ids::NodeId;
use crate::kind::NodeKind;
use crate::node::Node;
use crate::schema::{
    parse_edges, parse_flag, parse_id, parse_id_list, parse_number, parse_number_list, parse_pos,
    parse_quals, Schema,
};
use crate::store::NodeStore;

/// Builds nodes from `(id, kind, schema)` records and installs them.
///
/// Cross-reference fields only register their target as a forward reference,
/// so records can arrive in any order. A record either installs exactly one
/// node or fails before installing anything.
pub struct SchemaBuilder<'s> {
    store: &'s mut NodeStore,
}

impl<'s> SchemaBuilder<'s> {
    /// Creates a builder that installs into `store`.
    pub fn new(store: &'s mut NodeStore) -> Self {
        Self { store }
    }

    /// Builds a node whose kind is given by its textual marker.
    pub fn build_named(&mut self, id: NodeId, kind: &str, schema: &Schema) -> IrResult<NodeId> {
        self.build(id, NodeKind::parse(kind)?, schema)
    }

    /// Builds a node of `kind` at `id` from `schema`.
    pub fn build(&mut self, id: NodeId, kind: NodeKind, schema: &Schema) -> IrResult<NodeId> {
        if kind == NodeKind::Identifier {
            return Err(IrError::UseInternInstead);
        }
        if !id.is_valid() {
            return Err(IrError::InvariantViolation(format!(
                "`{kind}` record uses the invalid id @0"
            )));
        }
        let node = self.populate(kind, schema)?;
        for target in node.references() {
            self.store.get_or_create_forward_ref(target)?;
        }
        self.store.get_or_create_forward_ref(id)?;
        self.store.install(id, node)?;
        log::trace!("built {kind} at {id}");
        Ok(id)
    }

    /// Builds a node at a freshly allocated id.
    pub fn build_new(&mut self, kind: NodeKind, schema: &Schema) -> IrResult<NodeId> {
        let id = self.store.allocate_id(None)?;
        self.build(id, kind, schema)
    }

    fn populate(&mut self, kind: NodeKind, schema: &Schema) -> IrResult<Node> {
        let mut node = Node::empty(kind)?;
        let known = node.fields();
        if let Some((field, _)) = schema
            .iter()
            .find(|(tag, _)| !known.iter().any(|f| f.tag == *tag))
        {
            return Err(IrError::UnexpectedField { kind, field });
        }

        let store = &mut *self.store;
        node.visit_fields_mut(&mut |field, slot| {
            let Some(text) = schema.get(field.tag) else {
                if field.required {
                    return Err(IrError::MissingField {
                        kind,
                        field: field.tag,
                    });
                }
                return Ok(());
            };
            let tag = field.tag;
            match slot {
                FieldMut::Id(value) => *value = parse_id(kind, tag, text)?,
                FieldMut::Ref(value) => *value = Some(parse_id(kind, tag, text)?),
                FieldMut::RefList(value) => *value = parse_id_list(kind, tag, text)?,
                FieldMut::Str(value) => *value = Some(store.intern_str(text)),
                FieldMut::Pos(value) => {
                    let (file, line, column) = parse_pos(kind, tag, text)?;
                    *value = Some(SourcePos {
                        file: store.intern_str(file),
                        line,
                        column,
                    });
                }
                FieldMut::Flag(value) => *value = parse_flag(kind, tag, text)?,
                FieldMut::Int(value) => *value = parse_number(kind, tag, text)?,
                FieldMut::UInt(value) => *value = parse_number(kind, tag, text)?,
                FieldMut::Quals(value) => *value = parse_quals(kind, tag, text)?,
                FieldMut::UIntList(value) => *value = parse_number_list(kind, tag, text)?,
                FieldMut::Edges(value) => *value = parse_edges(kind, tag, text)?,
            }
            Ok(())
        })?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{BinaryOp, SourceLevelKind};
    use crate::tag::Tag;

    fn id(raw: u32) -> NodeId {
        NodeId::from_raw(raw)
    }

    #[test]
    fn builds_with_forward_references() {
        let mut store = NodeStore::new();
        let schema = Schema::new()
            .with(Tag::Name, "@2")
            .with(Tag::Type, "@3")
            .with(Tag::Srcp, "main.c:4:12")
            .with(Tag::Extern, "");
        SchemaBuilder::new(&mut store)
            .build_named(id(1), "var_decl", &schema)
            .unwrap();

        let Node::VarDecl(var) = store.get(id(1)).unwrap() else {
            panic!("expected var_decl");
        };
        assert_eq!(var.decl.name, Some(id(2)));
        assert_eq!(var.decl.ty, Some(id(3)));
        assert!(var.is_extern);
        let pos = var.decl.srcp.unwrap();
        assert_eq!(store.resolve_str(pos.file), Some("main.c"));
        assert_eq!((pos.line, pos.column), (4, 12));
        assert!(store.is_known(id(2)) && !store.contains(id(2)));
        assert_eq!(store.next_id(), id(4));
    }

    #[test]
    fn build_order_does_not_matter() {
        let mut store = NodeStore::new();
        let mut builder = SchemaBuilder::new(&mut store);
        builder
            .build(
                id(10),
                NodeKind::PointerType,
                &Schema::new().with(Tag::Ptd, "11"),
            )
            .unwrap();
        builder
            .build(id(11), NodeKind::VoidType, &Schema::new())
            .unwrap();
        assert!(store.contains(id(10)) && store.contains(id(11)));
        assert_eq!(store.unresolved().count(), 0);
    }

    #[test]
    fn missing_required_field_installs_nothing() {
        let mut store = NodeStore::new();
        let err = SchemaBuilder::new(&mut store)
            .build(
                id(5),
                NodeKind::Binary(BinaryOp::Plus),
                &Schema::new().with(Tag::Op0, "6"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::MissingField {
                field: Tag::Op1,
                ..
            }
        ));
        assert!(!store.contains(id(5)));
        assert!(!store.is_known(id(6)));
    }

    #[test]
    fn unsupported_kind_installs_nothing() {
        let mut store = NodeStore::new();
        let err = SchemaBuilder::new(&mut store)
            .build(
                id(3),
                NodeKind::SourceLevel(SourceLevelKind::WhileStmt),
                &Schema::new(),
            )
            .unwrap_err();
        assert!(matches!(err, IrError::UnsupportedKind(_)));
        assert!(store.is_empty());

        let err = SchemaBuilder::new(&mut store)
            .build_named(id(3), "lambda_expr", &Schema::new())
            .unwrap_err();
        assert!(matches!(err, IrError::UnsupportedKind(_)));
        assert!(!store.is_known(id(3)));
    }

    #[test]
    fn identifiers_use_the_cache() {
        let mut store = NodeStore::new();
        let err = SchemaBuilder::new(&mut store)
            .build(
                id(1),
                NodeKind::Identifier,
                &Schema::new().with(Tag::Strg, "x"),
            )
            .unwrap_err();
        assert!(matches!(err, IrError::UseInternInstead));
    }

    #[test]
    fn foreign_field_is_rejected() {
        let mut store = NodeStore::new();
        let err = SchemaBuilder::new(&mut store)
            .build(
                id(1),
                NodeKind::IntegerCst,
                &Schema::new().with(Tag::Value, "3").with(Tag::Flds, "4"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::UnexpectedField {
                field: Tag::Flds,
                ..
            }
        ));
    }

    #[test]
    fn malformed_value_is_rejected() {
        let mut store = NodeStore::new();
        let err = SchemaBuilder::new(&mut store)
            .build(
                id(1),
                NodeKind::IntegerCst,
                &Schema::new().with(Tag::Value, "three"),
            )
            .unwrap_err();
        assert!(matches!(err, IrError::InvalidValue { .. }));
    }

    #[test]
    fn lists_and_edges() {
        let mut store = NodeStore::new();
        let mut builder = SchemaBuilder::new(&mut store);
        builder
            .build(
                id(1),
                NodeKind::BasicBlock,
                &Schema::new()
                    .with(Tag::Number, "2")
                    .with(Tag::Pred, "0")
                    .with(Tag::Succ, "3 4")
                    .with(Tag::Phi, "@5")
                    .with(Tag::Stmt, "@6 @7"),
            )
            .unwrap();
        builder
            .build(
                id(5),
                NodeKind::GimplePhi,
                &Schema::new()
                    .with(Tag::Res, "8")
                    .with(Tag::DefEdge, "9:0 10:3"),
            )
            .unwrap();
        let Node::BasicBlock(bb) = store.get(id(1)).unwrap() else {
            panic!("expected bloc");
        };
        assert_eq!(bb.succs, vec![3, 4]);
        assert_eq!(bb.stmts, vec![id(6), id(7)]);
        let Node::GimplePhi(phi) = store.get(id(5)).unwrap() else {
            panic!("expected gimple_phi");
        };
        assert_eq!(phi.def_edges.len(), 2);
        assert!(store.is_known(id(10)));
    }

    #[test]
    fn rebuild_overwrites() {
        let mut store = NodeStore::new();
        let mut builder = SchemaBuilder::new(&mut store);
        builder
            .build(id(1), NodeKind::IntegerCst, &Schema::new().with(Tag::Value, "1"))
            .unwrap();
        builder
            .build(id(1), NodeKind::IntegerCst, &Schema::new().with(Tag::Value, "-2"))
            .unwrap();
        let Node::IntegerCst(cst) = store.get(id(1)).unwrap() else {
            panic!("expected integer_cst");
        };
        assert_eq!(cst.value, -2);
    }

    #[test]
    fn far_references_are_accepted_or_refused_cleanly() {
        let mut store = NodeStore::new();
        SchemaBuilder::new(&mut store)
            .build(id(1), NodeKind::PointerType, &Schema::new().with(Tag::Ptd, "4294967294"))
            .unwrap();
        let Node::PointerType(ptr) = store.get(id(1)).unwrap() else {
            panic!("expected pointer_type");
        };
        assert_eq!(ptr.ptd, Some(id(u32::MAX - 1)));
        assert_eq!(store.len(), 1);

        let err = SchemaBuilder::new(&mut store)
            .build(id(2), NodeKind::PointerType, &Schema::new().with(Tag::Ptd, "4294967295"))
            .unwrap_err();
        assert!(matches!(err, IrError::InvariantViolation(_)));
        assert!(!store.contains(id(2)));
    }
}
