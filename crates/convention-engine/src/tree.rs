//! The convention tree: one node per auction position, keyed by the call that
//! reaches it from its parent.
//!
//! Nodes live in an arena owned by [`ConventionTree`] and are addressed by
//! [`NodeId`]. A parent owns its children through its key map; the parent
//! index stored on each node is used for lookups only (macro inheritance,
//! description placeholders, bidding sequences).

use crate::macros::MacroTable;
use crate::notation::Notation;
use bridge_core::Call;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// How a child is identified under its parent. Concrete calls compare by the
/// call alone (flags and tags do not take part). Anything not yet concrete
/// (wildcards, alternations, opaque text) is keyed by its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Call(Call),
    Pending(String),
}

impl NodeKey {
    pub fn call(&self) -> Option<Call> {
        match self {
            NodeKey::Call(call) => Some(*call),
            NodeKey::Pending(_) => None,
        }
    }
}

impl From<&Notation> for NodeKey {
    fn from(notation: &Notation) -> Self {
        match notation.call() {
            Some(call) => NodeKey::Call(call),
            None => NodeKey::Pending(notation.raw.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConventionNode {
    parent: Option<NodeId>,
    children: IndexMap<NodeKey, NodeId>,
    /// The text used to reach this node from its parent.
    pub notation: Notation,
    pub alert_tag: Option<String>,
    pub alertable: bool,
    pub announceable: bool,
    pub description: Option<String>,
    /// Declaration order; later declarations win merges.
    pub priority: u32,
    pub macros: MacroTable,
    /// Relay templates spliced in as consecutive steps above this position.
    pub steps: Vec<ConventionTree>,
}

impl ConventionNode {
    fn new(parent: Option<NodeId>, notation: Notation) -> Self {
        Self {
            parent,
            children: IndexMap::new(),
            alert_tag: notation.alert_tag.clone(),
            alertable: notation.alertable,
            announceable: notation.announceable,
            notation,
            description: None,
            priority: 0,
            macros: MacroTable::new(),
            steps: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn call(&self) -> Option<Call> {
        self.notation.call()
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::from(&self.notation)
    }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ConventionTree {
    nodes: Vec<ConventionNode>,
}

impl Default for ConventionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConventionTree {
    /// A tree whose root is the empty auction.
    pub fn new() -> Self {
        Self::with_root("")
    }

    /// A tree whose root is reached by `raw`. Used for detached subtrees
    /// (expansion alternatives, step templates) that are later merged under
    /// a parent by that notation.
    pub fn with_root(raw: &str) -> Self {
        Self {
            nodes: vec![ConventionNode::new(None, Notation::parse(raw))],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &ConventionNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ConventionNode {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.values().copied()
    }

    pub fn child(&self, id: NodeId, key: &NodeKey) -> Option<NodeId> {
        self.node(id).children.get(key).copied()
    }

    /// Returns the child reached by `raw`, creating it if needed. An empty
    /// token names the node itself.
    pub fn child_or_insert(&mut self, id: NodeId, raw: &str) -> NodeId {
        if raw.is_empty() {
            return id;
        }
        let notation = Notation::parse(raw);
        let key = NodeKey::from(&notation);
        if let Some(existing) = self.child(id, &key) {
            return existing;
        }
        self.insert_child(id, key, notation)
    }

    pub fn call_child_or_insert(&mut self, id: NodeId, call: Call) -> NodeId {
        let key = NodeKey::Call(call);
        if let Some(existing) = self.child(id, &key) {
            return existing;
        }
        self.insert_child(id, key, Notation::parse(&call.render()))
    }

    fn insert_child(&mut self, parent: NodeId, key: NodeKey, notation: Notation) -> NodeId {
        let child = NodeId(self.nodes.len());
        self.nodes.push(ConventionNode::new(Some(parent), notation));
        self.nodes[parent.0].children.insert(key, child);
        child
    }

    /// Walks `path` from `id`, creating missing nodes on the way.
    pub fn path_or_insert<S: AsRef<str>>(&mut self, id: NodeId, path: &[S]) -> NodeId {
        path.iter()
            .fold(id, |node, raw| self.child_or_insert(node, raw.as_ref()))
    }

    /// Detaches a child. Its arena slot stays behind but is no longer
    /// reachable from the root.
    pub fn remove_child(&mut self, id: NodeId, key: &NodeKey) -> Option<NodeId> {
        self.nodes[id.0].children.shift_remove(key)
    }

    /// Exact-path lookup by raw notation. Empty segments are skipped.
    pub fn get_node<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        path.iter().try_fold(self.root(), |node, raw| {
            let raw = raw.as_ref();
            if raw.is_empty() {
                return Some(node);
            }
            self.child(node, &NodeKey::from(&Notation::parse(raw)))
        })
    }

    pub fn get_node_by_calls(&self, calls: &[Call]) -> Option<NodeId> {
        calls
            .iter()
            .try_fold(self.root(), |node, call| self.child(node, &NodeKey::Call(*call)))
    }

    /// Lookup by a sequence string such as `"1NT-P-2C"` or `"1NT/2C"`.
    pub fn lookup(&self, sequence: &str) -> Option<NodeId> {
        self.get_node(&split_sequence(sequence))
    }

    /// The node itself followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&node| self.parent(node))
    }

    /// Keys from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self
            .ancestors(id)
            .filter(|&node| self.parent(node).is_some())
            .map(|node| self.node(node).key())
            .collect();
        keys.reverse();
        keys
    }

    /// The calls from the root down to `id`, or `None` if any step on the
    /// way is not a concrete call.
    pub fn sequence(&self, id: NodeId) -> Option<Vec<Call>> {
        self.path(id).iter().map(NodeKey::call).collect()
    }

    /// The raw notation from the root down to `id`, joined with `-`.
    pub fn sequence_string(&self, id: NodeId) -> String {
        let mut raws: Vec<&str> = self
            .ancestors(id)
            .filter(|&node| self.parent(node).is_some())
            .map(|node| self.node(node).notation.raw.as_str())
            .collect();
        raws.reverse();
        raws.join("-")
    }

    /// Every node reachable from `id`, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children: Vec<NodeId> = self.children(node).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Number of nodes reachable from the root, root included.
    pub fn len(&self) -> usize {
        self.descendants(self.root()).len()
    }

    pub fn is_empty(&self) -> bool {
        !self.node(self.root()).has_children()
    }
}

/// Splits a bidding-sequence key into raw call tokens. `-` separates calls,
/// `/` stands for an intervening pass, and spaces are ignored.
pub fn split_sequence(sequence: &str) -> Vec<String> {
    sequence
        .replace('/', "-P-")
        .replace(' ', "")
        .split('-')
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
        .collect()
}
