//! Structural lookup of existing nodes against partial schemas.

use crate::error::{IrError, IrResult};
use crate::fields::{FieldRef, FieldTable};
use crate::ids::NodeId;
use crate::kind::NodeKind;
use crate::node::Node;
use crate::schema::{
    parse_flag, parse_id, parse_id_list, parse_number, parse_number_list, parse_pos, parse_quals,
    Schema,
};
use crate::store::NodeStore;
use crate::tag::Tag;

/// Finds installed nodes whose fields agree with a partial schema.
///
/// Fields missing from the schema are wildcards. Phi incoming-edge lists
/// cannot be compared; naming one fails with [`IrError::UnsupportedField`]
/// instead of being ignored.
pub struct StructuralFinder<'s> {
    store: &'s NodeStore,
}

impl<'s> StructuralFinder<'s> {
    /// Creates a finder over `store`.
    pub fn new(store: &'s NodeStore) -> Self {
        Self { store }
    }

    /// Returns `true` if every field named by `schema` equals the node's.
    pub fn matches(&self, node: &Node, schema: &Schema) -> IrResult<bool> {
        check_schema(node, schema)?;
        self.compare(node, schema)
    }

    /// First installed node of `kind` in id order matching `schema`.
    pub fn find(&self, kind: NodeKind, schema: &Schema) -> IrResult<Option<NodeId>> {
        if kind == NodeKind::Identifier {
            if let Some(text) = schema.get(Tag::Strg) {
                return Ok(self.store.find_identifier(text));
            }
            if schema.contains(Tag::Operator) {
                return Ok(self.store.find_operator_identifier());
            }
        }
        check_schema(&Node::empty(kind)?, schema)?;

        let key = schema.lookup_key(kind);
        if let Some(hit) = self.store.cached_lookup(key) {
            match self.store.try_get(hit) {
                Some(node) if node.kind() == kind && self.compare(node, schema)? => {
                    log::trace!("find cache hit {hit} for {kind}");
                    return Ok(Some(hit));
                }
                _ => {
                    log::trace!("find cache entry {hit} for {kind} is stale");
                    self.store.forget_lookup(key);
                }
            }
        }

        for (id, node) in self.store.iter() {
            if node.kind() == kind && self.compare(node, schema)? {
                self.store.remember_lookup(key, id);
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn compare(&self, node: &Node, schema: &Schema) -> IrResult<bool> {
        let kind = node.kind();
        let strings = self.store.strings();
        let mut all = true;
        node.visit_fields(&mut |field, value| {
            let tag = field.tag;
            let Some(text) = schema.get(tag) else {
                return Ok(());
            };
            if !all {
                return Ok(());
            }
            all = match value {
                FieldRef::Id(id) => parse_id(kind, tag, text)? == *id,
                FieldRef::Ref(id) => Some(parse_id(kind, tag, text)?) == *id,
                FieldRef::RefList(ids) => parse_id_list(kind, tag, text)? == *ids,
                FieldRef::Str(symbol) => {
                    symbol.is_some() && strings.lookup(text) == *symbol
                }
                FieldRef::Pos(pos) => {
                    let (file, line, column) = parse_pos(kind, tag, text)?;
                    pos.is_some_and(|p| {
                        strings.resolve(p.file) == Some(file)
                            && p.line == line
                            && p.column == column
                    })
                }
                FieldRef::Flag(flag) => parse_flag(kind, tag, text)? == *flag,
                FieldRef::Int(v) => parse_number::<i64>(kind, tag, text)? == *v,
                FieldRef::UInt(v) => parse_number::<u64>(kind, tag, text)? == *v,
                FieldRef::Quals(q) => parse_quals(kind, tag, text)? == *q,
                FieldRef::UIntList(items) => parse_number_list(kind, tag, text)? == *items,
                FieldRef::Edges(_) => {
                    return Err(IrError::UnsupportedField { kind, field: tag });
                }
            };
            Ok(())
        })?;
        Ok(all)
    }
}

/// Rejects tags the kind lacks and collections the finder cannot compare.
fn check_schema(node: &Node, schema: &Schema) -> IrResult<()> {
    let kind = node.kind();
    let mut seen = 0;
    node.visit_fields(&mut |field, value| {
        if schema.contains(field.tag) {
            seen += 1;
            if matches!(value, FieldRef::Edges(_)) {
                return Err(IrError::UnsupportedField {
                    kind,
                    field: field.tag,
                });
            }
        }
        Ok(())
    })?;
    if seen == schema.len() {
        return Ok(());
    }
    let known = node.fields();
    match schema
        .iter()
        .find(|(tag, _)| !known.iter().any(|f| f.tag == *tag))
    {
        Some((field, _)) => Err(IrError::UnexpectedField { kind, field }),
        None => Ok(()),
    }
}
