//! Core node types for the leftmost-child / right-sibling encoding

use std::fmt;
use std::hash::Hash;

/// Handle of a node inside a [`Tree`](crate::Tree) arena
///
/// Handles are positions in the arena, not the externally assigned ids.
/// Two handles are the same node; two nodes with equal ids are the "same
/// node" as far as the algorithms are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// The sentinel root always sits at index 0
    pub const ROOT: NodeIndex = NodeIndex(0);

    /// Get the inner arena position
    pub const fn get(self) -> usize {
        self.0
    }

    /// Returns true if this is the sentinel root
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}

impl From<NodeIndex> for usize {
    fn from(index: NodeIndex) -> Self {
        index.0
    }
}

/// Bound on externally assigned node ids
///
/// Ids are opaque to the engine; it only compares, clones and hashes them.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// A single tree cell
///
/// `leftmost_child` and `right_sibling` are the structural edges of the
/// tree; `parent` is only a lookup aid and is rewritten by the link
/// operations and by the parent fix-up after reconstruction.
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    pub(crate) id: Option<K>,
    pub(crate) value: Option<V>,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) leftmost_child: Option<NodeIndex>,
    pub(crate) right_sibling: Option<NodeIndex>,
}

impl<K, V> Node<K, V> {
    /// Create a detached node carrying an id and an optional payload
    pub fn new(id: K, value: Option<V>) -> Self {
        Self {
            id: Some(id),
            value,
            parent: None,
            leftmost_child: None,
            right_sibling: None,
        }
    }

    /// Create a detached node with a payload
    pub fn with_value(id: K, value: V) -> Self {
        Self::new(id, Some(value))
    }

    pub(crate) fn sentinel() -> Self {
        Self {
            id: None,
            value: None,
            parent: None,
            leftmost_child: None,
            right_sibling: None,
        }
    }

    /// The node's external id, `None` for the sentinel root
    pub fn id(&self) -> Option<&K> {
        self.id.as_ref()
    }

    /// The payload bound by the caller
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Mutable access to the payload
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    /// Replace the payload, returning the previous one
    pub fn set_value(&mut self, value: Option<V>) -> Option<V> {
        std::mem::replace(&mut self.value, value)
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn leftmost_child(&self) -> Option<NodeIndex> {
        self.leftmost_child
    }

    pub fn right_sibling(&self) -> Option<NodeIndex> {
        self.right_sibling
    }

    /// Returns true if the node has at least one child
    pub fn has_children(&self) -> bool {
        self.leftmost_child.is_some()
    }

    /// Returns true if this is the id-less sentinel
    pub fn is_sentinel(&self) -> bool {
        self.id.is_none()
    }
}

impl<K: PartialEq, V> Node<K, V> {
    /// Id equality, the engine's notion of "same node"
    pub fn is_same_node(&self, other: &Node<K, V>) -> bool {
        self.id == other.id
    }

    /// Returns true if this node carries the given id
    pub fn has_id(&self, id: &K) -> bool {
        self.id.as_ref() == Some(id)
    }
}

impl<K: fmt::Display, V> fmt::Display for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "Node({})", id),
            None => write!(f, "Node(<root>)"),
        }
    }
}
