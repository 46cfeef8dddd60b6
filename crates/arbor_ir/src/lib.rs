//! ArborIR: the tree-shaped intermediate representation behind the arbor
//! source-to-hardware flow.
//!
//! A [`NodeStore`] owns every node of one or more translation units, keyed by
//! [`NodeId`]. Nodes are created from textual [`Schema`]s by a
//! [`SchemaBuilder`], located structurally by a [`StructuralFinder`],
//! rendered by a [`Serializer`] and re-read by [`reader`]. A [`Merger`]
//! folds one unit's store into another, unifying types and declarations
//! and renaming colliding statics.

#![warn(missing_docs)]

pub mod arena;
pub mod builder;
pub mod error;
pub mod fields;
pub mod finder;
pub mod ids;
pub mod kind;
pub mod merge;
pub mod node;
pub mod reader;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod tag;
pub mod writer;

pub use builder::SchemaBuilder;
pub use error::{IrError, IrResult};
pub use fields::{Qualifiers, SourcePos};
pub use finder::StructuralFinder;
pub use ids::NodeId;
pub use kind::{BinaryOp, Category, NodeKind, QuaternaryOp, SourceLevelKind, TernaryOp, UnaryOp};
pub use merge::{merge, MergeSummary, Merger};
pub use node::Node;
pub use schema::Schema;
pub use store::NodeStore;
pub use tag::Tag;
pub use writer::Serializer;
