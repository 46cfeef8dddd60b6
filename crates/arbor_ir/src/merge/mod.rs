//! Merging one translation unit's store into another.
//!
//! A merge runs four passes over the source store:
//!
//! 1. **Types**: source identifiers and named types are matched against the
//!    destination. A matching type is reused, unless the source holds the
//!    complete definition of a record the destination only forward-declares.
//! 2. **Declarations**: non-static declarations unify by [`DeclKey`]. A
//!    function definition beats a prototype, a non-extern variable beats an
//!    extern one, and a real declaration beats one located in `<built-in>`.
//!    Static declarations are always copied; one whose key collides with a
//!    destination static is renamed with a numeric suffix.
//! 3. **Reachability**: everything reachable from a node scheduled for copy
//!    gets a destination id, as does every source function not yet mapped.
//! 4. **Materialization**: each scheduled node is described with its
//!    references translated and rebuilt in the destination.
//!
//! The source store is never modified.

mod symbols;

pub use symbols::{decl_key, main_variant_key, type_key, DeclKey, ScopeKey, TypeKey, TypeNamespace, TypeVariant};

use crate::builder::SchemaBuilder;
use crate::error::{IrError, IrResult};
use crate::fields::FieldTable;
use crate::ids::NodeId;
use crate::node::Node;
use crate::schema::Schema;
use crate::store::NodeStore;
use crate::tag::Tag;
use crate::writer::Serializer;
use arbor_config::{ArborConfig, DumpConfig, MergeConfig};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Write;

/// File name recorded for compiler-provided declarations.
const BUILTIN_LOCATION: &str = "<built-in>";

/// Counts reported by [`Merger::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Source types mapped onto an existing type.
    pub types_unified: usize,
    /// Source declarations mapped onto an existing declaration.
    pub decls_unified: usize,
    /// Existing types or declarations replaced by a source node.
    pub overwritten: usize,
    /// Static symbols given a new name.
    pub statics_renamed: usize,
    /// Nodes written into the destination.
    pub nodes_copied: usize,
}

/// Merges stores according to a [`MergeConfig`].
#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: MergeConfig,
    dump: DumpConfig,
}

impl Merger {
    /// Creates a merger.
    pub fn new(config: MergeConfig, dump: DumpConfig) -> Self {
        Self { config, dump }
    }

    /// Creates a merger from a loaded configuration.
    pub fn from_config(config: &ArborConfig) -> Self {
        Self::new(config.merge.clone(), config.dump.clone())
    }

    /// Merges `source` into `dest`.
    ///
    /// On error `dest` may hold a partial merge.
    pub fn merge(&self, dest: &mut NodeStore, source: &NodeStore) -> IrResult<MergeSummary> {
        if self.dump.before_merge {
            self.dump_store(dest, "before_merge")?;
        }
        log::debug!(
            "merging {} source nodes into {} destination nodes",
            source.len(),
            dest.len()
        );

        let mut state = MergeState::new(&self.config, dest, source)?;
        state.unify_types()?;
        state.unify_decls()?;
        state.reach()?;
        state.materialize()?;
        let summary = state.summary;

        log::info!(
            "merge: {} nodes copied, {} types and {} declarations unified, {} overwritten, {} statics renamed",
            summary.nodes_copied,
            summary.types_unified,
            summary.decls_unified,
            summary.overwritten,
            summary.statics_renamed
        );
        if self.dump.after_merge {
            self.dump_store(dest, "after_merge")?;
        }
        Ok(summary)
    }

    fn dump_store(&self, store: &NodeStore, stage: &str) -> IrResult<()> {
        let Some(dir) = &self.dump.directory else {
            return Ok(());
        };
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{stage}_{}.raw", store.next_id().as_raw()));
        let mut out = std::io::BufWriter::new(std::fs::File::create(&path)?);
        Serializer::new(store).write_store(&mut out)?;
        out.flush()?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Merges `source` into `dest` with default settings.
pub fn merge(dest: &mut NodeStore, source: &NodeStore) -> IrResult<()> {
    Merger::default().merge(dest, source).map(|_| ())
}

/// Which store holds the node a table entry currently stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Holder {
    Dest,
    Source(NodeId),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    /// Destination id of the symbol.
    dest: NodeId,
    holder: Holder,
}

struct MergeState<'m> {
    config: &'m MergeConfig,
    dest: &'m mut NodeStore,
    source: &'m NodeStore,
    /// Source id to destination id.
    remap: HashMap<NodeId, NodeId>,
    /// Source ids to rebuild in the destination.
    to_copy: BTreeSet<NodeId>,
    types: HashMap<TypeKey, Entry>,
    dest_main_variants: HashMap<NodeId, TypeKey>,
    source_main_variants: HashMap<NodeId, TypeKey>,
    decls: HashMap<DeclKey, Entry>,
    dest_statics: HashSet<DeclKey>,
    dest_static_prototypes: HashSet<DeclKey>,
    /// Source static functions with a body, by key.
    static_definitions: HashMap<DeclKey, NodeId>,
    /// Source static prototypes, by key.
    static_prototypes: HashMap<DeclKey, NodeId>,
    /// Original static name to its replacement, for this source.
    static_names: HashMap<String, String>,
    /// Replacement name per source declaration.
    renamed: HashMap<NodeId, String>,
    /// Replacement names handed out so far.
    claimed: HashSet<String>,
    summary: MergeSummary,
}

impl<'m> MergeState<'m> {
    fn new(config: &'m MergeConfig, dest: &'m mut NodeStore, source: &'m NodeStore) -> IrResult<Self> {
        let mut state = Self {
            config,
            dest,
            source,
            remap: HashMap::new(),
            to_copy: BTreeSet::new(),
            types: HashMap::new(),
            dest_main_variants: HashMap::new(),
            source_main_variants: HashMap::new(),
            decls: HashMap::new(),
            dest_statics: HashSet::new(),
            dest_static_prototypes: HashSet::new(),
            static_definitions: HashMap::new(),
            static_prototypes: HashMap::new(),
            static_names: HashMap::new(),
            renamed: HashMap::new(),
            claimed: HashSet::new(),
            summary: MergeSummary::default(),
        };
        state.index_dest()?;
        Ok(state)
    }

    /// Builds the destination symbol tables. Types go first since member
    /// keys depend on the main-variant table.
    fn index_dest(&mut self) -> IrResult<()> {
        let dest: &NodeStore = self.dest;
        for (id, node) in dest.iter() {
            if let Some((main, key)) = main_variant_key(dest, node)? {
                self.types.entry(key.clone()).or_insert(Entry {
                    dest: main,
                    holder: Holder::Dest,
                });
                self.dest_main_variants.insert(main, key);
            }
            if let Some(key) = type_key(dest, node)? {
                self.types.entry(key).or_insert(Entry {
                    dest: id,
                    holder: Holder::Dest,
                });
            }
        }

        for (id, node) in dest.iter() {
            let Some(key) = decl_key(dest, node, &self.dest_main_variants, &self.config.builtin_prefix)? else {
                continue;
            };
            if node.is_static() {
                if matches!(node, Node::FunctionDecl(_)) && !node.has_body() {
                    self.dest_static_prototypes.insert(key);
                } else {
                    self.dest_statics.insert(key);
                }
                continue;
            }
            match self.decls.get(&key) {
                Some(existing) => {
                    let current = dest.resolve(existing.dest, "merge symbol table")?;
                    if prefer_later_dest_decl(current, node) {
                        self.decls.insert(key, Entry { dest: id, holder: Holder::Dest });
                    }
                }
                None => {
                    self.decls.insert(key, Entry { dest: id, holder: Holder::Dest });
                }
            }
        }
        log::debug!(
            "destination tables: {} types, {} declarations, {} statics",
            self.types.len(),
            self.decls.len(),
            self.dest_statics.len() + self.dest_static_prototypes.len()
        );
        Ok(())
    }

    fn holder(&self, entry: Entry) -> IrResult<(&NodeStore, &Node)> {
        match entry.holder {
            Holder::Dest => Ok((&*self.dest, self.dest.resolve(entry.dest, "merge symbol table")?)),
            Holder::Source(id) => Ok((self.source, self.source.resolve(id, "merge symbol table")?)),
        }
    }

    /// Maps `source_id` to a fresh destination id and schedules it.
    fn schedule_fresh(&mut self, source_id: NodeId) -> IrResult<NodeId> {
        let id = self.dest.allocate_id(Some(source_id))?;
        self.remap.insert(source_id, id);
        self.to_copy.insert(source_id);
        Ok(id)
    }

    /// Makes `source_id` the node behind `entry`, overwriting whatever the
    /// destination holds at that id.
    fn take_over(&mut self, entry: Entry, source_id: NodeId) -> Entry {
        if let Holder::Source(previous) = entry.holder {
            if previous != source_id {
                self.to_copy.remove(&previous);
            }
        }
        self.remap.insert(source_id, entry.dest);
        self.to_copy.insert(source_id);
        self.summary.overwritten += 1;
        Entry {
            dest: entry.dest,
            holder: Holder::Source(source_id),
        }
    }

    fn unify_types(&mut self) -> IrResult<()> {
        let source = self.source;
        for (id, node) in source.iter() {
            if let Node::Identifier(ident) = node {
                let existing = match ident.text {
                    Some(symbol) => source
                        .resolve_str(symbol)
                        .and_then(|text| self.dest.find_identifier(text)),
                    None => self.dest.find_operator_identifier(),
                };
                if let Some(existing) = existing {
                    self.remap.insert(id, existing);
                }
                continue;
            }
            let Some(key) = type_key(source, node)? else {
                continue;
            };
            match self.types.get(&key).copied() {
                Some(entry) => {
                    if self.completes_record(entry, node)? {
                        log::trace!("{id} completes record `{}` at {}", key.name, entry.dest);
                        let entry = self.take_over(entry, id);
                        self.types.insert(key, entry);
                    } else {
                        self.remap.insert(id, entry.dest);
                        self.summary.types_unified += 1;
                    }
                }
                None => {
                    let dest_id = self.schedule_fresh(id)?;
                    self.types.insert(key, Entry {
                        dest: dest_id,
                        holder: Holder::Source(id),
                    });
                }
            }
        }

        // Main variants behind typedefs. A variant already mapped through its
        // own key keeps that mapping.
        for (_, node) in source.iter() {
            let Some((main, key)) = main_variant_key(source, node)? else {
                continue;
            };
            self.source_main_variants.insert(main, key.clone());
            let mapped = self.remap.get(&main).copied();
            match (self.types.get(&key).copied(), mapped) {
                (Some(entry), None) => {
                    self.remap.insert(main, entry.dest);
                    self.summary.types_unified += 1;
                }
                (Some(_), Some(_)) => {}
                (None, Some(dest_id)) => {
                    self.types.insert(key, Entry {
                        dest: dest_id,
                        holder: Holder::Source(main),
                    });
                }
                (None, None) => {
                    let dest_id = self.schedule_fresh(main)?;
                    self.types.insert(key, Entry {
                        dest: dest_id,
                        holder: Holder::Source(main),
                    });
                }
            }
        }
        log::debug!(
            "type pass: {} unified, {} scheduled",
            self.summary.types_unified,
            self.to_copy.len()
        );
        Ok(())
    }

    /// A source record with members replaces one with none.
    fn completes_record(&self, entry: Entry, node: &Node) -> IrResult<bool> {
        let Some(fields) = node.record_fields() else {
            return Ok(false);
        };
        if fields.is_empty() {
            return Ok(false);
        }
        let (_, existing) = self.holder(entry)?;
        Ok(existing.record_fields().is_some_and(<[NodeId]>::is_empty))
    }

    fn unify_decls(&mut self) -> IrResult<()> {
        let source = self.source;
        for (id, node) in source.iter() {
            if !node.kind().is_decl() {
                continue;
            }
            let Some(key) = decl_key(source, node, &self.source_main_variants, &self.config.builtin_prefix)? else {
                continue;
            };
            if node.is_static() {
                self.place_static(id, node, key)?;
                continue;
            }
            match self.decls.get(&key).copied() {
                None => {
                    let dest_id = self.schedule_fresh(id)?;
                    self.decls.insert(key, Entry {
                        dest: dest_id,
                        holder: Holder::Source(id),
                    });
                }
                Some(entry) => {
                    let (store, existing) = self.holder(entry)?;
                    if source_wins(store, existing, source, node) {
                        log::trace!("{id} replaces `{}` at {}", key.name, entry.dest);
                        let entry = self.take_over(entry, id);
                        self.decls.insert(key, entry);
                    } else {
                        log::trace!("{id} unified with `{}` at {}", key.name, entry.dest);
                        self.remap.insert(id, entry.dest);
                        self.summary.decls_unified += 1;
                    }
                }
            }
        }
        log::debug!(
            "declaration pass: {} unified, {} overwritten, {} statics renamed",
            self.summary.decls_unified,
            self.summary.overwritten,
            self.summary.statics_renamed
        );
        Ok(())
    }

    /// Schedules a static declaration and picks its name.
    ///
    /// A static definition and its prototypes share one destination id.
    fn place_static(&mut self, id: NodeId, node: &Node, key: DeclKey) -> IrResult<()> {
        let name = key.name.clone();
        let colliding = self.dest_statics.contains(&key) || self.dest_static_prototypes.contains(&key);

        match node {
            Node::FunctionDecl(f) if f.body.is_some() => {
                let dest_id = self.schedule_fresh(id)?;
                if let Some(prototype) = self.static_prototypes.get(&key) {
                    self.remap.insert(*prototype, dest_id);
                }
                self.static_definitions.insert(key, id);
            }
            Node::FunctionDecl(_) => {
                if let Some(dest_id) = self
                    .static_definitions
                    .get(&key)
                    .and_then(|definition| self.remap.get(definition))
                    .copied()
                {
                    self.remap.insert(id, dest_id);
                }
                self.static_prototypes.insert(key, id);
            }
            _ => {
                self.schedule_fresh(id)?;
            }
        }

        if let Some(replacement) = self.static_names.get(&name) {
            self.renamed.insert(id, replacement.clone());
        } else if colliding {
            // The key may be the mangled name; the suffix goes on the plain one.
            let plain = node
                .decl()
                .and_then(|d| d.name)
                .and_then(|n| self.source.identifier_text(n))
                .unwrap_or(name.as_str())
                .to_string();
            let replacement = self.fresh_static_name(&plain)?;
            log::trace!("static `{name}` of {id} renamed to `{replacement}`");
            self.static_names.insert(name, replacement.clone());
            self.renamed.insert(id, replacement);
            self.summary.statics_renamed += 1;
        }
        Ok(())
    }

    /// First `name<N>` that names no identifier in either store and has
    /// not been handed out yet.
    fn fresh_static_name(&mut self, name: &str) -> IrResult<String> {
        for counter in 1..=self.config.rename_limit {
            let candidate = format!("{name}{counter}");
            if self.dest.find_identifier(&candidate).is_none()
                && self.source.find_identifier(&candidate).is_none()
                && !self.claimed.contains(&candidate)
            {
                self.claimed.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(IrError::InvariantViolation(format!(
            "no free name for static `{name}` after {} attempts",
            self.config.rename_limit
        )))
    }

    /// Gives every node reachable from the copy set, and every unmapped
    /// source function, a destination id.
    fn reach(&mut self) -> IrResult<()> {
        let source = self.source;
        let mut worklist: Vec<NodeId> = self.to_copy.iter().copied().collect();
        for function in source.functions() {
            if !self.remap.contains_key(&function) {
                self.schedule_fresh(function)?;
                worklist.push(function);
            }
        }

        while let Some(id) = worklist.pop() {
            let node = source.resolve(id, "merge reachability")?;
            for target in node.references() {
                if self.remap.contains_key(&target) {
                    continue;
                }
                if !source.contains(target) {
                    return Err(IrError::UnknownNode {
                        id: target,
                        operation: "merge reachability",
                    });
                }
                self.schedule_fresh(target)?;
                worklist.push(target);
            }
        }
        log::debug!("reachability pass: {} nodes to copy", self.to_copy.len());
        Ok(())
    }

    fn materialize(&mut self) -> IrResult<()> {
        let source = self.source;
        for &id in &self.to_copy {
            let node = source.resolve(id, "merge materialization")?;
            let target = self.remap.get(&id).copied().ok_or_else(|| {
                IrError::InvariantViolation(format!("{id} is scheduled but missing an index"))
            })?;

            if let Node::Identifier(ident) = node {
                let text = match ident.text {
                    Some(symbol) => Some(source.resolve_str(symbol).ok_or_else(|| {
                        IrError::InvariantViolation(format!("identifier {id} has no text"))
                    })?),
                    None => None,
                };
                self.dest.adopt_identifier(target, text)?;
                self.summary.nodes_copied += 1;
                continue;
            }

            let remap = &self.remap;
            let mut schema = Schema::describe(node, source.strings(), &mut |reference| {
                remap.get(&reference).copied().ok_or_else(|| {
                    IrError::InvariantViolation(format!(
                        "{reference} referenced by {id} is missing an index"
                    ))
                })
            })?;
            if let Some(name) = self.renamed.get(&id) {
                let ident = self.dest.intern_identifier(name)?;
                schema.insert(Tag::Name, ident.as_raw().to_string());
            }
            SchemaBuilder::new(self.dest).build(target, node.kind(), &schema)?;
            log::trace!("copied {id} to {target}");
            self.summary.nodes_copied += 1;
        }
        log::debug!("materialization pass: {} nodes copied", self.summary.nodes_copied);
        Ok(())
    }
}

/// Destination-side duplicate resolution: a definition replaces a
/// prototype and a non-extern variable replaces an extern one.
fn prefer_later_dest_decl(current: &Node, later: &Node) -> bool {
    match (current, later) {
        (Node::FunctionDecl(c), Node::FunctionDecl(l)) => c.body.is_none() && l.body.is_some(),
        (Node::VarDecl(c), Node::VarDecl(l)) => c.is_extern && !l.is_extern,
        _ => false,
    }
}

fn located_in_builtin(store: &NodeStore, node: &Node) -> bool {
    node.decl()
        .and_then(|d| d.srcp)
        .and_then(|pos| store.resolve_str(pos.file))
        .is_some_and(|file| file == BUILTIN_LOCATION)
}

/// Whether a source declaration replaces the symbol already in the table.
fn source_wins(existing_store: &NodeStore, existing: &Node, source: &NodeStore, candidate: &Node) -> bool {
    match candidate {
        Node::FunctionDecl(f) => {
            let existing_defined = existing.has_body();
            if f.body.is_some() && !existing_defined {
                return true;
            }
            !existing_defined
                && matches!(existing, Node::FunctionDecl(_))
                && located_in_builtin(existing_store, existing)
                && f.decl.srcp.is_some()
                && !located_in_builtin(source, candidate)
        }
        Node::VarDecl(v) if !v.is_extern => {
            !matches!(existing, Node::VarDecl(e) if !e.is_extern)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;

    fn id(raw: u32) -> NodeId {
        NodeId::from_raw(raw)
    }

    fn build(store: &mut NodeStore, raw: u32, kind: NodeKind, schema: Schema) {
        SchemaBuilder::new(store).build(id(raw), kind, &schema).unwrap();
    }

    fn name_ref(store: &mut NodeStore, text: &str) -> String {
        store.intern_identifier(text).unwrap().as_raw().to_string()
    }

    #[test]
    fn merging_into_an_empty_store_copies_everything() {
        let mut source = NodeStore::new();
        let main = name_ref(&mut source, "main");
        build(&mut source, 5, NodeKind::StatementList, Schema::new());
        build(&mut source, 6, NodeKind::FunctionDecl, Schema::new().with(Tag::Name, main).with(Tag::Body, "5"));

        let mut dest = NodeStore::new();
        let summary = Merger::default().merge(&mut dest, &source).unwrap();
        assert_eq!(summary.nodes_copied, 3);
        assert_eq!(dest.len(), 3);
        assert_eq!(dest.function_index("main"), Some(id(6)));
    }

    #[test]
    fn source_is_left_untouched() {
        let mut source = NodeStore::new();
        let f = name_ref(&mut source, "f");
        build(&mut source, 4, NodeKind::FunctionDecl, Schema::new().with(Tag::Name, f));
        let before = Serializer::new(&source).to_text().unwrap();

        let mut dest = NodeStore::new();
        let g = name_ref(&mut dest, "g");
        build(&mut dest, 4, NodeKind::FunctionDecl, Schema::new().with(Tag::Name, g));
        merge(&mut dest, &source).unwrap();

        assert_eq!(Serializer::new(&source).to_text().unwrap(), before);
        assert!(dest.function_index("f").is_some());
        assert!(dest.function_index("g").is_some());
    }

    #[test]
    fn forward_declared_record_is_completed() {
        let mut dest = NodeStore::new();
        let point = name_ref(&mut dest, "Point");
        build(&mut dest, 2, NodeKind::RecordType, Schema::new().with(Tag::Name, point.clone()));

        let mut source = NodeStore::new();
        let point = name_ref(&mut source, "Point");
        let x = name_ref(&mut source, "x");
        build(&mut source, 3, NodeKind::RecordType, Schema::new().with(Tag::Name, point).with(Tag::Flds, "4"));
        build(&mut source, 4, NodeKind::FieldDecl, Schema::new().with(Tag::Name, x).with(Tag::Scpe, "3"));

        let summary = Merger::default().merge(&mut dest, &source).unwrap();
        assert_eq!(summary.overwritten, 1);
        let record = dest.get(id(2)).unwrap();
        assert_eq!(record.record_fields().map(<[NodeId]>::len), Some(1));
    }

    #[test]
    fn definition_replaces_prototype() {
        let mut dest = NodeStore::new();
        let f = name_ref(&mut dest, "f");
        build(&mut dest, 2, NodeKind::FunctionDecl, Schema::new().with(Tag::Name, f));

        let mut source = NodeStore::new();
        let f = name_ref(&mut source, "f");
        build(&mut source, 2, NodeKind::StatementList, Schema::new());
        build(&mut source, 3, NodeKind::FunctionDecl, Schema::new().with(Tag::Name, f).with(Tag::Body, "2"));

        merge(&mut dest, &source).unwrap();
        assert_eq!(dest.functions().count(), 1);
        assert!(dest.get(id(2)).unwrap().has_body());
    }

    #[test]
    fn colliding_statics_are_renamed() {
        let mut dest = NodeStore::new();
        let counter = name_ref(&mut dest, "counter");
        build(&mut dest, 2, NodeKind::VarDecl, Schema::new().with(Tag::Name, counter).with(Tag::Static, "1"));

        let mut source = NodeStore::new();
        let counter = name_ref(&mut source, "counter");
        build(&mut source, 2, NodeKind::VarDecl, Schema::new().with(Tag::Name, counter).with(Tag::Static, "1"));

        let summary = Merger::default().merge(&mut dest, &source).unwrap();
        assert_eq!(summary.statics_renamed, 1);
        let renamed = dest.find_identifier("counter1").unwrap();
        let statics: Vec<_> = dest
            .iter()
            .filter(|(_, n)| n.is_static())
            .filter_map(|(_, n)| n.decl().and_then(|d| d.name))
            .collect();
        assert_eq!(statics.len(), 2);
        assert!(statics.contains(&renamed));
    }

    #[test]
    fn mangled_statics_keep_their_mangled_name() {
        let unit = |store: &mut NodeStore| {
            let counter = name_ref(store, "counter");
            let mangled = name_ref(store, "_ZL7counter");
            build(
                store,
                3,
                NodeKind::VarDecl,
                Schema::new()
                    .with(Tag::Name, counter)
                    .with(Tag::Mngl, mangled)
                    .with(Tag::Static, "1"),
            );
        };
        let mut dest = NodeStore::new();
        unit(&mut dest);
        let mut source = NodeStore::new();
        unit(&mut source);

        let summary = Merger::default().merge(&mut dest, &source).unwrap();
        assert_eq!(summary.statics_renamed, 1);
        assert!(dest.find_identifier("_ZL7counter1").is_none());

        let renamed = dest.find_identifier("counter1").unwrap();
        let mangled = dest.find_identifier("_ZL7counter").unwrap();
        let copy = dest
            .iter()
            .filter_map(|(_, n)| n.decl())
            .find(|d| d.name == Some(renamed))
            .unwrap();
        assert_eq!(copy.mngl, Some(mangled));
    }

    #[test]
    fn rename_limit_is_enforced() {
        let mut dest = NodeStore::new();
        let x = name_ref(&mut dest, "x");
        build(&mut dest, 2, NodeKind::VarDecl, Schema::new().with(Tag::Name, x).with(Tag::Static, "1"));
        dest.intern_identifier("x1").unwrap();

        let mut source = NodeStore::new();
        let x = name_ref(&mut source, "x");
        build(&mut source, 2, NodeKind::VarDecl, Schema::new().with(Tag::Name, x).with(Tag::Static, "1"));

        let config = MergeConfig {
            rename_limit: 1,
            ..MergeConfig::default()
        };
        let err = Merger::new(config, DumpConfig::default())
            .merge(&mut dest, &source)
            .unwrap_err();
        assert!(matches!(err, IrError::InvariantViolation(_)));
    }

    #[test]
    fn real_declaration_replaces_builtin_location() {
        let mut dest = NodeStore::new();
        let abs = name_ref(&mut dest, "abs");
        build(
            &mut dest,
            2,
            NodeKind::FunctionDecl,
            Schema::new().with(Tag::Name, abs).with(Tag::Srcp, "<built-in>:0:0"),
        );

        let mut source = NodeStore::new();
        let abs = name_ref(&mut source, "abs");
        build(
            &mut source,
            2,
            NodeKind::FunctionDecl,
            Schema::new().with(Tag::Name, abs).with(Tag::Srcp, "stdlib.h:840:12"),
        );

        let summary = Merger::default().merge(&mut dest, &source).unwrap();
        assert_eq!(summary.overwritten, 1);
        let decl = dest.get(id(2)).unwrap().decl().unwrap();
        let file = decl.srcp.and_then(|p| dest.resolve_str(p.file));
        assert_eq!(file, Some("stdlib.h"));
    }

    #[test]
    fn dumps_are_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let dump = DumpConfig {
            directory: Some(dir.path().to_path_buf()),
            before_merge: true,
            after_merge: true,
        };
        let mut source = NodeStore::new();
        let f = name_ref(&mut source, "f");
        build(&mut source, 2, NodeKind::FunctionDecl, Schema::new().with(Tag::Name, f));
        let mut dest = NodeStore::new();
        Merger::new(MergeConfig::default(), dump).merge(&mut dest, &source).unwrap();

        assert!(dir.path().join("before_merge_1.raw").exists());
        assert!(dir.path().join("after_merge_3.raw").exists());
    }
}
