//! The IR error taxonomy.
//!
//! Every error here is fatal for the current compilation: nothing in the IR
//! layer retries or recovers. Variants carry the offending id, kind and field
//! so the driver can report them without further context.

use crate::ids::NodeId;
use crate::kind::NodeKind;
use crate::tag::Tag;

/// Result alias used throughout the IR crate.
pub type IrResult<T> = Result<T, IrError>;

/// Errors raised by the store, builder, finder, serializer and merger.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// An id with no installed node was dereferenced.
    #[error("unknown node {id} during {operation}")]
    UnknownNode {
        /// The missing id.
        id: NodeId,
        /// What was being done when the lookup failed.
        operation: &'static str,
    },

    /// A required field was absent from a schema.
    #[error("`{kind}` requires field `{field}`")]
    MissingField {
        /// Kind being built.
        kind: NodeKind,
        /// The absent field.
        field: Tag,
    },

    /// A schema value could not be parsed for its field.
    #[error("invalid value `{value}` for field `{field}` of `{kind}`")]
    InvalidValue {
        /// Kind being built or matched.
        kind: NodeKind,
        /// Field whose value is malformed.
        field: Tag,
        /// The offending text.
        value: String,
    },

    /// A schema named a field the kind does not define.
    #[error("`{kind}` has no field `{field}`")]
    UnexpectedField {
        /// Kind being built or matched.
        kind: NodeKind,
        /// The foreign field.
        field: Tag,
    },

    /// The structural finder cannot compare this collection field.
    #[error("structural match on `{field}` of `{kind}` is not supported")]
    UnsupportedField {
        /// Kind being matched.
        kind: NodeKind,
        /// The collection field.
        field: Tag,
    },

    /// A kind name is unknown, or known but never materialized in the IR.
    #[error("node kind `{0}` is not supported")]
    UnsupportedKind(String),

    /// Identifier nodes must go through the store's identifier cache.
    #[error("identifier nodes must be created with `NodeStore::intern_identifier`")]
    UseInternInstead,

    /// A condition that upstream passes guarantee cannot happen did happen.
    #[error("IR invariant violated: {0}")]
    InvariantViolation(String),

    /// A textual record could not be parsed.
    #[error("malformed record at line {line}: {message}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A binary snapshot failed validation or decoding.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Dump or snapshot file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
