//! Parser for the canonical textual format produced by the
//! [`Serializer`](crate::Serializer).
//!
//! Each line becomes a [`Record`]; [`load`] feeds records back through the
//! identifier cache and the [`SchemaBuilder`], reproducing the store the
//! text was written from.

use crate::builder::SchemaBuilder;
use crate::error::{IrError, IrResult};
use crate::ids::NodeId;
use crate::kind::NodeKind;
use crate::schema::Schema;
use crate::store::NodeStore;
use crate::tag::Tag;

/// One parsed line: `@<id> <kind> fields...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Node id.
    pub id: NodeId,
    /// Kind marker, as written.
    pub kind: String,
    /// Field values.
    pub schema: Schema,
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn error(&self, message: impl Into<String>) -> IrError {
        IrError::Malformed {
            line: self.line,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes characters up to whitespace or one of `stops`.
    fn take_until(&mut self, stops: &[char]) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || stops.contains(&c))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn word(&mut self) -> &'a str {
        self.skip_ws();
        self.take_until(&[])
    }

    fn quoted(&mut self) -> IrResult<String> {
        let mut out = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next().map(|(_, e)| e) {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(e @ ('"' | '\\')) => out.push(e),
                    other => return Err(self.error(format!("bad escape `\\{other:?}`"))),
                },
                _ => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }
}

/// Parses one line. Returns `None` for blank and `#` comment lines.
pub fn parse_line(text: &str, line: usize) -> IrResult<Option<Record>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let mut cursor = Cursor {
        text: trimmed,
        pos: 0,
        line,
    };
    let head = cursor.word();
    let id: NodeId = head
        .parse()
        .map_err(|_| cursor.error(format!("expected `@<id>`, found `{head}`")))?;
    let kind = cursor.word().to_string();
    if kind.is_empty() {
        return Err(cursor.error("missing node kind"));
    }

    let mut schema = Schema::new();
    while !cursor.at_end() {
        let name = cursor.take_until(&[':']);
        let tag = Tag::from_name(name)
            .ok_or_else(|| cursor.error(format!("unknown field `{name}`")))?;
        if cursor.peek() != Some(':') {
            schema.insert(tag, "1");
            continue;
        }
        cursor.pos += 1;
        cursor.skip_ws();
        if cursor.peek() != Some('"') {
            let value = cursor.take_until(&[]);
            schema.push(tag, value);
            continue;
        }
        let text = cursor.quoted()?;
        if cursor.peek() == Some(':') {
            // Source position: "file":line:column
            let position = cursor.take_until(&[]);
            schema.insert(tag, format!("{text}{position}"));
            continue;
        }
        let checkpoint = cursor.pos;
        if cursor.word() == "lngt:" {
            let length = cursor.word();
            if length.parse::<usize>().ok() != Some(text.len()) {
                return Err(cursor.error(format!(
                    "`{tag}` length {length} does not match {} bytes",
                    text.len()
                )));
            }
        } else {
            cursor.pos = checkpoint;
        }
        schema.insert(tag, text);
    }
    Ok(Some(Record { id, kind, schema }))
}

/// Parses every line of `text`.
pub fn parse(text: &str) -> IrResult<Vec<Record>> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(record) = parse_line(line, index + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parses `text` and installs every record into `store`.
///
/// Returns the number of nodes installed.
pub fn load(store: &mut NodeStore, text: &str) -> IrResult<usize> {
    let records = parse(text)?;
    for record in &records {
        if NodeKind::parse(&record.kind)? == NodeKind::Identifier {
            let name = record.schema.get(Tag::Strg);
            if name.is_none() && !record.schema.contains(Tag::Operator) {
                return Err(IrError::MissingField {
                    kind: NodeKind::Identifier,
                    field: Tag::Strg,
                });
            }
            store.adopt_identifier(record.id, name)?;
        } else {
            SchemaBuilder::new(store).build_named(record.id, &record.kind, &record.schema)?;
        }
    }
    log::debug!("loaded {} records", records.len());
    Ok(records.len())
}
