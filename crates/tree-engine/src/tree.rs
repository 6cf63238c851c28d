//! Arena storage and link operations for leftmost-child / right-sibling trees

use std::ops::{Index, IndexMut};

use crate::node::{Node, NodeIndex};

/// A general (unbounded-arity) tree stored as leftmost-child / right-sibling
/// links inside an arena
///
/// The tree always contains the id-less sentinel root at [`NodeIndex::ROOT`];
/// every externally meaningful node hangs off its `leftmost_child` chain.
/// Nodes created with [`Tree::create`] start out detached and become part of
/// the tree once linked with one of the link operations.
///
/// # Example
///
/// ```
/// use tree_engine::Tree;
///
/// let mut tree: Tree<u32, &str> = Tree::new();
/// let a = tree.create(1, "a");
/// let b = tree.create(2, "b");
/// tree.append(tree.root(), a);
/// tree.append(tree.root(), b);
///
/// let ids: Vec<_> = tree.children(tree.root()).filter_map(|ix| tree.id(ix)).collect();
/// assert_eq!(ids, vec![&1, &2]);
/// ```
#[derive(Debug, Clone)]
pub struct Tree<K, V> {
    nodes: Vec<Option<Node<K, V>>>,
    live: usize,
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Tree<K, V> {
    /// Create an empty tree holding only the sentinel root
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::sentinel())],
            live: 1,
        }
    }

    /// The sentinel root
    pub fn root(&self) -> NodeIndex {
        NodeIndex::ROOT
    }

    /// Number of live nodes in the arena, sentinel included
    ///
    /// Detached nodes still count until they are discarded.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if the sentinel has no children
    pub fn is_empty(&self) -> bool {
        self[NodeIndex::ROOT].leftmost_child.is_none()
    }

    /// Get a node by index
    ///
    /// Returns `None` for indexes that were released by [`Tree::discard`] or
    /// by pruning.
    pub fn get(&self, index: NodeIndex) -> Option<&Node<K, V>> {
        self.nodes.get(index.0).and_then(Option::as_ref)
    }

    /// Get a node mutably by index
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(index.0).and_then(Option::as_mut)
    }

    /// Returns true if the index refers to a live node
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.get(index).is_some()
    }

    /// Allocate a detached node with the given id and payload
    pub fn create(&mut self, id: K, value: V) -> NodeIndex {
        self.adopt(Node::with_value(id, value))
    }

    /// Allocate a detached node without a payload
    pub fn create_bare(&mut self, id: K) -> NodeIndex {
        self.adopt(Node::new(id, None))
    }

    /// Move a node value into the arena, detached
    ///
    /// Any links the value carries are reset.
    pub fn adopt(&mut self, mut node: Node<K, V>) -> NodeIndex {
        node.parent = None;
        node.leftmost_child = None;
        node.right_sibling = None;
        let index = NodeIndex(self.nodes.len());
        self.nodes.push(Some(node));
        self.live += 1;
        index
    }

    /// The external id of a node (`None` for the sentinel or stale indexes)
    pub fn id(&self, index: NodeIndex) -> Option<&K> {
        self.get(index).and_then(Node::id)
    }

    /// The payload of a node
    pub fn value(&self, index: NodeIndex) -> Option<&V> {
        self.get(index).and_then(Node::value)
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get(index).and_then(|n| n.parent)
    }

    pub fn leftmost_child(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get(index).and_then(|n| n.leftmost_child)
    }

    pub fn right_sibling(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.get(index).and_then(|n| n.right_sibling)
    }

    /// Iterate over the children of a node, left to right
    pub fn children(&self, index: NodeIndex) -> Children<'_, K, V> {
        Children {
            tree: self,
            next: self.leftmost_child(index),
        }
    }

    /// The last child of a node, found by walking the sibling chain
    pub fn last_child(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.children(index).last()
    }

    /// Count children of a node
    pub fn child_count(&self, index: NodeIndex) -> usize {
        self.children(index).count()
    }

    /// Get the depth of a node (sentinel = 0), following parent links
    pub fn depth(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = self.parent(index);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Make `child` the leftmost child of `parent`
    ///
    /// `child` and every node on its right-sibling chain are re-parented to
    /// `parent`. The previous child chain of `parent` is not detached; it is
    /// simply no longer reachable through `parent`.
    pub fn set_leftmost_child(&mut self, parent: NodeIndex, child: Option<NodeIndex>) {
        self[parent].leftmost_child = child;
        self.reparent_chain(child, Some(parent));
    }

    /// Make `sibling` the right sibling of `node`
    ///
    /// `sibling` and its own sibling chain take over `node`'s parent.
    pub fn set_right_sibling(&mut self, node: NodeIndex, sibling: Option<NodeIndex>) {
        self[node].right_sibling = sibling;
        let parent = self[node].parent;
        self.reparent_chain(sibling, parent);
    }

    /// Prepend `child` to the children of `parent`
    ///
    /// `child` must be detached; linking a node that already sits in
    /// `parent`'s chain would close the chain into a loop.
    pub fn insert(&mut self, parent: NodeIndex, child: NodeIndex) {
        debug_assert!(
            self.children(parent).all(|c| c != child),
            "{} is already a child of {}",
            child,
            parent
        );
        let previous = self[parent].leftmost_child;
        let node = &mut self[child];
        node.right_sibling = previous;
        node.parent = Some(parent);
        self[parent].leftmost_child = Some(child);
    }

    /// Add `child` as the last child of `parent`
    ///
    /// `child` must be detached. A right sibling it still carries is
    /// dropped, so only `child` itself is appended.
    pub fn append(&mut self, parent: NodeIndex, child: NodeIndex) {
        debug_assert!(
            self.children(parent).all(|c| c != child),
            "{} is already a child of {}",
            child,
            parent
        );
        match self.last_child(parent) {
            Some(last) => self[last].right_sibling = Some(child),
            None => self[parent].leftmost_child = Some(child),
        }
        let node = &mut self[child];
        node.parent = Some(parent);
        node.right_sibling = None;
    }

    /// Splice `sibling` in directly after `node`
    pub fn insert_right_sibling(&mut self, node: NodeIndex, sibling: NodeIndex) {
        let next = self[node].right_sibling;
        let parent = self[node].parent;
        let inserted = &mut self[sibling];
        inserted.right_sibling = next;
        inserted.parent = parent;
        self[node].right_sibling = Some(sibling);
    }

    /// Reset all three links of a node
    ///
    /// The former children stay in the arena, detached from this node.
    pub fn clear(&mut self, node: NodeIndex) {
        let node = &mut self[node];
        node.parent = None;
        node.leftmost_child = None;
        node.right_sibling = None;
    }

    /// Splice a node out of its parent's child chain
    ///
    /// The node keeps its own subtree. Returns false if the node was not
    /// attached (no parent, or not found in the parent's chain).
    pub fn detach(&mut self, node: NodeIndex) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        let next = self[node].right_sibling;

        if self[parent].leftmost_child == Some(node) {
            self[parent].leftmost_child = next;
        } else {
            let previous = self.children(parent).find(|&c| self.right_sibling(c) == Some(node));
            match previous {
                Some(previous) => self[previous].right_sibling = next,
                None => return false,
            }
        }

        let node = &mut self[node];
        node.parent = None;
        node.right_sibling = None;
        true
    }

    /// Detach a node and release its whole subtree from the arena
    ///
    /// The sentinel cannot be discarded; discarding it only empties the tree.
    pub fn discard(&mut self, node: NodeIndex) {
        if node.is_root() {
            if let Some(child) = self[NodeIndex::ROOT].leftmost_child.take() {
                self.release_chain(child);
            }
            return;
        }
        if !self.contains(node) {
            return;
        }
        self.detach(node);
        self.release_subtree(node);
    }

    /// Walk the tree starting from `start` in the specified order
    pub fn walk(&self, start: NodeIndex, order: TraversalOrder) -> TreeWalker<'_, K, V> {
        TreeWalker::new(self, start, order)
    }

    /// Release `node` and everything below it, returning how many nodes
    /// were released
    pub(crate) fn release_subtree(&mut self, node: NodeIndex) -> usize {
        let before = self.live;
        let below = self.get(node).and_then(|n| n.leftmost_child);
        self.free(node);
        if let Some(child) = below {
            self.release_chain(child);
        }
        before - self.live
    }

    /// Release `first`, its siblings and all their descendants
    fn release_chain(&mut self, first: NodeIndex) {
        let mut stack = vec![first];
        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get_mut(index.0).and_then(Option::take) else {
                continue;
            };
            self.live -= 1;
            stack.extend(node.right_sibling);
            stack.extend(node.leftmost_child);
        }
    }

    fn free(&mut self, node: NodeIndex) {
        if let Some(slot) = self.nodes.get_mut(node.0) {
            if slot.take().is_some() {
                self.live -= 1;
            }
        }
    }

    fn reparent_chain(&mut self, first: Option<NodeIndex>, parent: Option<NodeIndex>) {
        let mut current = first;
        while let Some(index) = current {
            let node = &mut self[index];
            node.parent = parent;
            current = node.right_sibling;
        }
    }

    /// Raw leftmost-child link without touching parents, used while
    /// reconstructing before the parent fix-up pass
    pub(crate) fn link_child_raw(&mut self, parent: NodeIndex, child: NodeIndex) {
        self[parent].leftmost_child = Some(child);
    }

    /// Raw right-sibling link without touching parents
    pub(crate) fn link_sibling_raw(&mut self, node: NodeIndex, sibling: NodeIndex) {
        self[node].right_sibling = Some(sibling);
    }

    /// Assign every node reachable from the sentinel its structural parent
    pub(crate) fn fix_parents(&mut self) {
        let mut stack = vec![NodeIndex::ROOT];
        while let Some(parent) = stack.pop() {
            let mut current = self[parent].leftmost_child;
            while let Some(child) = current {
                let node = &mut self[child];
                node.parent = Some(parent);
                current = node.right_sibling;
                if node.leftmost_child.is_some() {
                    stack.push(child);
                }
            }
        }
    }
}

impl<K, V> Index<NodeIndex> for Tree<K, V> {
    type Output = Node<K, V>;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        match self.get(index) {
            Some(node) => node,
            None => panic!("stale or foreign node index {}", index),
        }
    }
}

impl<K, V> IndexMut<NodeIndex> for Tree<K, V> {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        match self.get_mut(index) {
            Some(node) => node,
            None => panic!("stale or foreign node index {}", index),
        }
    }
}

/// Iterator over a node's children, following the right-sibling chain
pub struct Children<'a, K, V> {
    tree: &'a Tree<K, V>,
    next: Option<NodeIndex>,
}

impl<K, V> Iterator for Children<'_, K, V> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.right_sibling(current);
        Some(current)
    }
}

/// Traversal order for walking the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Visit parent before children (top-down)
    PreOrder,
    /// Visit children before parent (bottom-up)
    PostOrder,
}

/// Iterator for traversing a subtree, the start node included
///
/// Uses an explicit stack so depth is bounded by memory, not by the call
/// stack.
pub struct TreeWalker<'a, K, V> {
    tree: &'a Tree<K, V>,
    start: NodeIndex,
    order: TraversalOrder,
    stack: Vec<(NodeIndex, bool)>,
}

impl<'a, K, V> TreeWalker<'a, K, V> {
    /// Create a new tree walker starting from the given node
    pub fn new(tree: &'a Tree<K, V>, start: NodeIndex, order: TraversalOrder) -> Self {
        let stack = if tree.contains(start) {
            vec![(start, false)]
        } else {
            Vec::new()
        };
        Self {
            tree,
            start,
            order,
            stack,
        }
    }

    /// Siblings of the start node are outside the walked subtree
    fn sibling_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        if index == self.start {
            None
        } else {
            self.tree.right_sibling(index)
        }
    }

    fn next_preorder(&mut self) -> Option<NodeIndex> {
        let (current, _) = self.stack.pop()?;

        // Sibling first so the child is popped before it
        if let Some(sibling) = self.sibling_of(current) {
            self.stack.push((sibling, false));
        }
        if let Some(child) = self.tree.leftmost_child(current) {
            self.stack.push((child, false));
        }

        Some(current)
    }

    fn next_postorder(&mut self) -> Option<NodeIndex> {
        while let Some(top) = self.stack.last_mut() {
            let (current, expanded) = *top;
            if expanded {
                self.stack.pop();
                if let Some(sibling) = self.sibling_of(current) {
                    self.stack.push((sibling, false));
                }
                return Some(current);
            }

            top.1 = true;
            if let Some(child) = self.tree.leftmost_child(current) {
                self.stack.push((child, false));
            }
        }
        None
    }
}

impl<K, V> Iterator for TreeWalker<'_, K, V> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            TraversalOrder::PreOrder => self.next_preorder(),
            TraversalOrder::PostOrder => self.next_postorder(),
        }
    }
}
