//! Generic field schemas: the `(tag -> text)` maps that describe a node
//! independently of its Rust representation.
//!
//! Schemas are what the front-end hands to the [`SchemaBuilder`](crate::SchemaBuilder),
//! what the [`StructuralFinder`](crate::StructuralFinder) matches against, and
//! what the merger rebuilds copied nodes from. Multi-valued fields hold
//! whitespace-separated items; references may be written `12` or `@12`.

use crate::error::{IrError, IrResult};
use crate::fields::{FieldRef, FieldTable, PhiEdge, Qualifiers};
use crate::ids::NodeId;
use crate::kind::NodeKind;
use crate::node::Node;
use crate::tag::Tag;
use arbor_common::{ContentHash, ContentHasher, Interner};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A partial or complete description of a node's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: BTreeMap<Tag, String>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Sets `tag`, replacing any previous value.
    pub fn insert(&mut self, tag: Tag, value: impl Into<String>) {
        self.entries.insert(tag, value.into());
    }

    /// Appends one item to a multi-valued field.
    pub fn push(&mut self, tag: Tag, item: &str) {
        let value = self.entries.entry(tag).or_default();
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(item);
    }

    /// Value of `tag`, if present.
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.entries.get(&tag).map(String::as_str)
    }

    /// Returns `true` if `tag` is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Removes `tag`, returning its value.
    pub fn remove(&mut self, tag: Tag) -> Option<String> {
        self.entries.remove(&tag)
    }

    /// Entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.entries.iter().map(|(tag, value)| (*tag, value.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when every field is a wildcard.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Memo key for a structural lookup of `kind` against this schema.
    pub fn lookup_key(&self, kind: NodeKind) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher.text(kind.name());
        for (tag, value) in &self.entries {
            hasher.text(tag.as_str()).text(value);
        }
        hasher.finish()
    }

    /// Describes `node` completely, resolving strings in `strings` and
    /// passing every cross-reference through `translate`.
    ///
    /// Absent references, false flags, zero optional numbers and empty lists
    /// are left out, so building the result reproduces `node`.
    pub fn describe(
        node: &Node,
        strings: &Interner,
        translate: &mut dyn FnMut(NodeId) -> IrResult<NodeId>,
    ) -> IrResult<Schema> {
        let mut schema = Schema::new();
        let kind = node.kind();
        node.visit_fields(&mut |field, value| {
            let tag = field.tag;
            match value {
                FieldRef::Id(id) => schema.insert(tag, translate(*id)?.as_raw().to_string()),
                FieldRef::Ref(Some(id)) => schema.insert(tag, translate(*id)?.as_raw().to_string()),
                FieldRef::RefList(ids) => {
                    for id in ids {
                        schema.push(tag, &translate(*id)?.as_raw().to_string());
                    }
                }
                FieldRef::Str(Some(symbol)) => {
                    let text = strings.resolve(*symbol).ok_or_else(|| {
                        IrError::InvariantViolation(format!(
                            "`{tag}` of `{kind}` holds a string foreign to its store"
                        ))
                    })?;
                    schema.insert(tag, text);
                }
                FieldRef::Pos(Some(pos)) => {
                    let file = strings.resolve(pos.file).ok_or_else(|| {
                        IrError::InvariantViolation(format!(
                            "`{tag}` of `{kind}` names a file foreign to its store"
                        ))
                    })?;
                    schema.insert(tag, format!("{file}:{}:{}", pos.line, pos.column));
                }
                FieldRef::Flag(true) => schema.insert(tag, "1"),
                FieldRef::Int(v) if *v != 0 || field.required => schema.insert(tag, v.to_string()),
                FieldRef::UInt(v) if *v != 0 || field.required => {
                    schema.insert(tag, v.to_string())
                }
                FieldRef::Quals(q) if !q.is_empty() => schema.insert(tag, q.to_string()),
                FieldRef::UIntList(items) => {
                    for item in items {
                        schema.push(tag, &item.to_string());
                    }
                }
                FieldRef::Edges(edges) => {
                    for edge in edges {
                        let def = translate(edge.def)?;
                        schema.push(tag, &format!("{}:{}", def.as_raw(), edge.edge));
                    }
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(schema)
    }
}

fn invalid(kind: NodeKind, field: Tag, value: &str) -> IrError {
    IrError::InvalidValue {
        kind,
        field,
        value: value.to_string(),
    }
}

pub(crate) fn parse_id(kind: NodeKind, field: Tag, text: &str) -> IrResult<NodeId> {
    text.trim().parse().map_err(|_| invalid(kind, field, text))
}

pub(crate) fn parse_id_list(kind: NodeKind, field: Tag, text: &str) -> IrResult<Vec<NodeId>> {
    text.split_whitespace()
        .map(|item| parse_id(kind, field, item))
        .collect()
}

pub(crate) fn parse_number<T: FromStr>(kind: NodeKind, field: Tag, text: &str) -> IrResult<T> {
    text.trim().parse().map_err(|_| invalid(kind, field, text))
}

pub(crate) fn parse_number_list(kind: NodeKind, field: Tag, text: &str) -> IrResult<Vec<u64>> {
    text.split_whitespace()
        .map(|item| parse_number(kind, field, item))
        .collect()
}

/// A present flag with no value, `1` or `true` is set; `0` or `false` is not.
pub(crate) fn parse_flag(kind: NodeKind, field: Tag, text: &str) -> IrResult<bool> {
    match text.trim() {
        "" | "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(invalid(kind, field, text)),
    }
}

pub(crate) fn parse_quals(kind: NodeKind, field: Tag, text: &str) -> IrResult<Qualifiers> {
    Qualifiers::parse(text.trim()).ok_or_else(|| invalid(kind, field, text))
}

/// Splits `file:line:column`. The file name may itself contain colons.
pub(crate) fn parse_pos<'t>(
    kind: NodeKind,
    field: Tag,
    text: &'t str,
) -> IrResult<(&'t str, u32, u32)> {
    let mut parts = text.rsplitn(3, ':');
    let column = parts.next().and_then(|c| c.parse().ok());
    let line = parts.next().and_then(|l| l.parse().ok());
    match (parts.next(), line, column) {
        (Some(file), Some(line), Some(column)) => Ok((file, line, column)),
        _ => Err(invalid(kind, field, text)),
    }
}

/// Parses `def:edge` pairs; the definition may carry an `@`.
pub(crate) fn parse_edges(kind: NodeKind, field: Tag, text: &str) -> IrResult<Vec<PhiEdge>> {
    text.split_whitespace()
        .map(|item| {
            let (def, edge) = item.split_once(':').ok_or_else(|| invalid(kind, field, item))?;
            Ok(PhiEdge {
                def: parse_id(kind, field, def)?,
                edge: parse_number(kind, field, edge)?,
            })
        })
        .collect()
}
