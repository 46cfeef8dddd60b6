//! The node store: sole owner of nodes and sole authority over ids.

use crate::arena::Arena;
use crate::error::{IrError, IrResult};
use crate::ids::NodeId;
use crate::kind::NodeKind;
use crate::node::{Identifier, Node};
use crate::schema::Schema;
use arbor_common::{ContentHash, Interner, Symbol};
use arbor_config::StoreConfig;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// Owns every node of one translation unit (or of the merged program).
///
/// Ids are handed out monotonically and never reused. An id can be known
/// before its node is installed: that is a forward reference, created when
/// a field names a node the front-end has not emitted yet.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStore {
    nodes: Arena<NodeId, Node>,
    /// Always greater than every known id.
    next_id: u32,
    strings: Interner,
    identifiers: HashMap<Symbol, NodeId>,
    operator_identifier: Option<NodeId>,
    declarations: BTreeSet<NodeId>,
    functions: BTreeSet<NodeId>,
    #[serde(skip)]
    find_cache: RefCell<HashMap<ContentHash, NodeId>>,
    #[serde(skip, default = "find_cache_default")]
    cache_finds: bool,
}

fn find_cache_default() -> bool {
    StoreConfig::default().find_cache
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store with default options.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Creates an empty store.
    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            nodes: Arena::new(),
            next_id: 1,
            strings: Interner::new(),
            identifiers: HashMap::new(),
            operator_identifier: None,
            declarations: BTreeSet::new(),
            functions: BTreeSet::new(),
            find_cache: RefCell::new(HashMap::new()),
            cache_finds: config.find_cache,
        }
    }

    fn bump_past(&mut self, id: NodeId) -> IrResult<()> {
        let next = id.as_raw().checked_add(1).ok_or_else(|| {
            IrError::InvariantViolation(format!("no node id left after {id}"))
        })?;
        self.next_id = self.next_id.max(next);
        Ok(())
    }

    /// The id the next unpreferred allocation will return.
    pub fn next_id(&self) -> NodeId {
        NodeId::from_raw(self.next_id)
    }

    /// Reserves an id.
    ///
    /// A valid `preferred` id that is not yet known is reserved as is;
    /// otherwise the next unused id is returned. The counter always ends up
    /// past the returned id; an id with no successor is refused.
    pub fn allocate_id(&mut self, preferred: Option<NodeId>) -> IrResult<NodeId> {
        let id = match preferred {
            Some(id) if id.is_valid() && !self.nodes.is_known(id) => id,
            _ => NodeId::from_raw(self.next_id),
        };
        self.bump_past(id)?;
        self.nodes.reserve(id);
        Ok(id)
    }

    /// Registers `id` as known, possibly without a node, and returns it.
    pub fn get_or_create_forward_ref(&mut self, id: NodeId) -> IrResult<NodeId> {
        if !id.is_valid() {
            return Err(IrError::InvariantViolation(
                "reference to the invalid id @0".to_string(),
            ));
        }
        self.bump_past(id)?;
        self.nodes.reserve(id);
        Ok(id)
    }

    /// Stores `node` at `id`, replacing any node already there.
    ///
    /// `id` must have been allocated or forward-referenced. Identifier nodes
    /// are rejected with [`IrError::UseInternInstead`].
    pub fn install(&mut self, id: NodeId, node: Node) -> IrResult<()> {
        if matches!(node, Node::Identifier(_)) {
            return Err(IrError::UseInternInstead);
        }
        self.install_node(id, node)
    }

    fn install_node(&mut self, id: NodeId, node: Node) -> IrResult<()> {
        if !id.is_valid() || !self.nodes.is_known(id) {
            return Err(IrError::InvariantViolation(format!(
                "install of {} into unallocated id {id}",
                node.kind()
            )));
        }
        let kind = node.kind();
        let ident = match &node {
            Node::Identifier(ident) => {
                self.check_identifier(id, ident)?;
                Some(ident.clone())
            }
            _ => None,
        };
        // Any node may be an earlier match for a remembered lookup.
        self.find_cache.get_mut().clear();
        if let Some(previous) = self.nodes.insert(id, node) {
            log::trace!("replaced {} at {id} with {kind}", previous.kind());
            if let Node::Identifier(old) = previous {
                self.forget_identifier(id, &old);
            }
            self.declarations.remove(&id);
            self.functions.remove(&id);
        }
        if let Some(ident) = ident {
            match ident.text {
                Some(text) => {
                    self.identifiers.insert(text, id);
                }
                None => self.operator_identifier = Some(id),
            }
        }
        if kind.is_decl() {
            self.declarations.insert(id);
        }
        if kind == NodeKind::FunctionDecl {
            self.functions.insert(id);
        }
        Ok(())
    }

    fn check_identifier(&self, id: NodeId, ident: &Identifier) -> IrResult<()> {
        let existing = match ident.text {
            Some(text) => self.identifiers.get(&text).copied(),
            None if ident.operator => self.operator_identifier,
            None => {
                return Err(IrError::InvariantViolation(format!(
                    "identifier {id} has neither text nor operator marker"
                )))
            }
        };
        match existing {
            Some(existing) if existing != id => Err(IrError::InvariantViolation(format!(
                "identifier {id} duplicates {existing}"
            ))),
            _ => Ok(()),
        }
    }

    fn forget_identifier(&mut self, id: NodeId, ident: &Identifier) {
        if let Some(text) = ident.text {
            if self.identifiers.get(&text) == Some(&id) {
                self.identifiers.remove(&text);
            }
        } else if self.operator_identifier == Some(id) {
            self.operator_identifier = None;
        }
    }

    /// Returns the node at `id`, naming `operation` in the error.
    pub fn resolve(&self, id: NodeId, operation: &'static str) -> IrResult<&Node> {
        self.nodes
            .get(id)
            .ok_or(IrError::UnknownNode { id, operation })
    }

    /// Returns the node at `id`.
    pub fn get(&self, id: NodeId) -> IrResult<&Node> {
        self.resolve(id, "lookup")
    }

    /// Returns the node at `id`, if installed.
    pub fn try_get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns `true` if a node is installed at `id`.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Returns `true` if `id` is allocated or installed.
    pub fn is_known(&self, id: NodeId) -> bool {
        self.nodes.is_known(id)
    }

    /// Ids referenced or allocated but never installed.
    pub fn unresolved(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.pending()
    }

    /// Installed nodes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Number of installed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node is installed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The identifier node for `text`, created on first use.
    pub fn intern_identifier(&mut self, text: &str) -> IrResult<NodeId> {
        if let Some(id) = self.find_identifier(text) {
            return Ok(id);
        }
        let symbol = self.strings.intern(text);
        self.create_identifier(Identifier {
            text: Some(symbol),
            operator: false,
        })
    }

    /// The operator marker identifier, created on first use.
    pub fn intern_operator_identifier(&mut self) -> IrResult<NodeId> {
        if let Some(id) = self.operator_identifier {
            return Ok(id);
        }
        self.create_identifier(Identifier {
            text: None,
            operator: true,
        })
    }

    fn create_identifier(&mut self, ident: Identifier) -> IrResult<NodeId> {
        let id = self.allocate_id(None)?;
        self.install_node(id, Node::Identifier(ident))?;
        Ok(id)
    }

    /// Registers an identifier at a caller-chosen id.
    ///
    /// Used when re-ingesting a dump or materializing a merged identifier.
    /// `None` stands for the operator marker. Fails if the text already
    /// belongs to another id.
    pub fn adopt_identifier(&mut self, id: NodeId, text: Option<&str>) -> IrResult<NodeId> {
        let ident = match text {
            Some(text) => Identifier {
                text: Some(self.strings.intern(text)),
                operator: false,
            },
            None => Identifier {
                text: None,
                operator: true,
            },
        };
        self.check_identifier(id, &ident)?;
        self.get_or_create_forward_ref(id)?;
        self.install_node(id, Node::Identifier(ident))?;
        Ok(id)
    }

    /// The identifier node for `text`, if one exists.
    pub fn find_identifier(&self, text: &str) -> Option<NodeId> {
        let symbol = self.strings.lookup(text)?;
        self.identifiers.get(&symbol).copied()
    }

    /// The operator marker identifier, if one exists.
    pub fn find_operator_identifier(&self) -> Option<NodeId> {
        self.operator_identifier
    }

    /// Text of the identifier at `id`; `None` for other kinds and the
    /// operator marker.
    pub fn identifier_text(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id)? {
            Node::Identifier(Identifier {
                text: Some(symbol), ..
            }) => self.strings.resolve(*symbol),
            _ => None,
        }
    }

    /// The store's string table.
    pub fn strings(&self) -> &Interner {
        &self.strings
    }

    /// Interns a string payload (file name, string constant, pragma text).
    pub fn intern_str(&mut self, text: &str) -> Symbol {
        self.strings.intern(text)
    }

    /// Resolves a string payload.
    pub fn resolve_str(&self, symbol: Symbol) -> Option<&str> {
        self.strings.resolve(symbol)
    }

    /// Top-level declarations: every declaration except parameters, results
    /// and anything scoped inside a function.
    pub fn declarations(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.declarations.iter().filter_map(move |&id| {
            let node = self.nodes.get(id)?;
            if matches!(node, Node::ParmDecl(_) | Node::ResultDecl(_)) {
                return None;
            }
            let scope = node.decl().and_then(|d| d.scpe);
            let in_function = scope
                .and_then(|s| self.nodes.get(s))
                .is_some_and(|s| matches!(s, Node::FunctionDecl(_)));
            (!in_function).then_some((id, node))
        })
    }

    /// Every installed function declaration, in id order.
    pub fn functions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.functions.iter().copied()
    }

    /// Finds a function by plain or mangled name, preferring one with a body.
    pub fn function_index(&self, name: &str) -> Option<NodeId> {
        let mut fallback = None;
        for id in self.functions() {
            let Some(decl) = self.nodes.get(id).and_then(Node::decl) else {
                continue;
            };
            let named = [decl.name, decl.mngl]
                .into_iter()
                .flatten()
                .any(|ident| self.identifier_text(ident) == Some(name));
            if !named {
                continue;
            }
            if self.implementation_of(id).is_some() {
                return Some(id);
            }
            fallback.get_or_insert(id);
        }
        fallback
    }

    /// Returns `id` when it is a function declaration with a body.
    pub fn implementation_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).filter(|n| n.has_body()).map(|_| id)
    }

    /// Full schema of the node at `id`, references unchanged.
    pub fn schema_of(&self, id: NodeId) -> IrResult<Schema> {
        let node = self.resolve(id, "describe")?;
        Schema::describe(node, &self.strings, &mut Ok::<NodeId, IrError>)
    }

    pub(crate) fn cached_lookup(&self, key: ContentHash) -> Option<NodeId> {
        if !self.cache_finds {
            return None;
        }
        self.find_cache.borrow().get(&key).copied()
    }

    pub(crate) fn remember_lookup(&self, key: ContentHash, id: NodeId) {
        if self.cache_finds {
            self.find_cache.borrow_mut().insert(key, id);
        }
    }

    pub(crate) fn forget_lookup(&self, key: ContentHash) {
        self.find_cache.borrow_mut().remove(&key);
    }
}
