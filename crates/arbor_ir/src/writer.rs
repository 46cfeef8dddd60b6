//! Canonical textual rendering of nodes.
//!
//! One line per node: `@<id> <kind>` followed by the kind's fields in table
//! order. References print as `@<id>`, set flags as bare tags, strings quoted
//! with a `lngt:` byte count, and list fields as one tagged entry per item.
//! Absent references, false flags and zero optional numbers are omitted.
//! [`reader`](crate::reader) parses this format back.

use crate::error::{IrError, IrResult};
use crate::fields::{FieldRef, FieldTable};
use crate::ids::NodeId;
use crate::store::NodeStore;
use crate::tag::Tag;
use std::fmt::Write as _;
use std::io;

/// Renders nodes of one store.
pub struct Serializer<'s> {
    store: &'s NodeStore,
}

impl<'s> Serializer<'s> {
    /// Creates a serializer over `store`.
    pub fn new(store: &'s NodeStore) -> Self {
        Self { store }
    }

    /// Renders the node at `id` as one line, without the newline.
    pub fn render(&self, id: NodeId) -> IrResult<String> {
        let node = self.store.resolve(id, "serialize")?;
        let kind = node.kind();
        let strings = self.store.strings();
        let mut line = format!("{id} {kind}");
        node.visit_fields(&mut |field, value| {
            let tag = field.tag;
            match value {
                FieldRef::Id(target) => push_entry(&mut line, tag, target),
                FieldRef::Ref(Some(target)) => push_entry(&mut line, tag, target),
                FieldRef::RefList(targets) => {
                    for target in targets {
                        push_entry(&mut line, tag, target);
                    }
                }
                FieldRef::Str(Some(symbol)) => {
                    let text = strings.resolve(*symbol).ok_or_else(|| foreign(id, tag))?;
                    push_entry(&mut line, tag, format_args!("\"{}\"", escape(text)));
                    push_entry(&mut line, "lngt", text.len());
                }
                FieldRef::Pos(Some(pos)) => {
                    let file = strings.resolve(pos.file).ok_or_else(|| foreign(id, tag))?;
                    push_entry(
                        &mut line,
                        tag,
                        format_args!("\"{}\":{}:{}", escape(file), pos.line, pos.column),
                    );
                }
                FieldRef::Flag(true) => {
                    line.push(' ');
                    line.push_str(tag.as_str());
                }
                FieldRef::Int(v) if *v != 0 || field.required => push_entry(&mut line, tag, v),
                FieldRef::UInt(v) if *v != 0 || field.required => push_entry(&mut line, tag, v),
                FieldRef::Quals(q) if !q.is_empty() => push_entry(&mut line, tag, q),
                FieldRef::UIntList(items) => {
                    for item in items {
                        push_entry(&mut line, tag, item);
                    }
                }
                FieldRef::Edges(edges) => {
                    for edge in edges {
                        push_entry(&mut line, tag, format_args!("{}:{}", edge.def, edge.edge));
                    }
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(line)
    }

    /// Writes the node at `id` followed by a newline.
    pub fn write_node<W: io::Write>(&self, out: &mut W, id: NodeId) -> IrResult<()> {
        writeln!(out, "{}", self.render(id)?)?;
        Ok(())
    }

    /// Writes every installed node in ascending id order.
    pub fn write_store<W: io::Write>(&self, out: &mut W) -> IrResult<()> {
        for (id, _) in self.store.iter() {
            self.write_node(out, id)?;
        }
        Ok(())
    }

    /// The whole store as text.
    pub fn to_text(&self) -> IrResult<String> {
        let mut text = String::new();
        for (id, _) in self.store.iter() {
            text.push_str(&self.render(id)?);
            text.push('\n');
        }
        Ok(text)
    }
}

/// Writes the node at `id` of `store` to `out`.
pub fn write<W: io::Write>(out: &mut W, store: &NodeStore, id: NodeId) -> IrResult<()> {
    Serializer::new(store).write_node(out, id)
}

fn push_entry(line: &mut String, tag: impl std::fmt::Display, value: impl std::fmt::Display) {
    // Writing into a String cannot fail.
    let _ = write!(line, " {tag}: {value}");
}

fn foreign(id: NodeId, tag: Tag) -> IrError {
    IrError::InvariantViolation(format!("`{tag}` of {id} holds a string foreign to its store"))
}

/// Escapes quotes, backslashes and control characters.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
