//! Traversal, search and pruning algorithms
//!
//! Every algorithm here runs on an explicit stack of sibling cursors, so
//! tree depth is bounded by memory rather than by the call stack. The
//! visitation order is the one a recursive descent over the
//! leftmost-child / right-sibling links produces.
//!
//! Filtered algorithms drive the filter's state: before a child is tested
//! the walker sets the first/last position flags, and the depth is raised
//! while the walker is below an accepted node. Depth is back at its starting
//! value when an algorithm returns.

use crate::filter::TraversalFilter;
use crate::node::{Node, NodeIndex, NodeKey};
use crate::tree::{TraversalOrder, Tree};

/// Cursor over one level of siblings
struct Level {
    next: Option<NodeIndex>,
    first: bool,
}

impl Level {
    fn new(next: Option<NodeIndex>) -> Self {
        Self { next, first: true }
    }
}

/// Visit `start` and then every descendant, parents before children
///
/// No filter is involved; the sentinel is visited too when it is passed.
pub fn preorder<K, V>(tree: &Tree<K, V>, start: NodeIndex, mut visit: impl FnMut(NodeIndex, &Node<K, V>)) {
    for index in tree.walk(start, TraversalOrder::PreOrder) {
        visit(index, &tree[index]);
    }
}

/// Visit every descendant of `start` and then `start`, children before
/// parents
pub fn postorder<K, V>(tree: &Tree<K, V>, start: NodeIndex, mut visit: impl FnMut(NodeIndex, &Node<K, V>)) {
    for index in tree.walk(start, TraversalOrder::PostOrder) {
        visit(index, &tree[index]);
    }
}

/// Filtered preorder walk over the descendants of `start`
///
/// `start` itself is not visited. Each child is tested with `filter`; an
/// accepted child is visited and then descended into, a rejected child is
/// skipped along with its whole subtree. `visit` sees the filter in the
/// state it had when the node was accepted.
pub fn preorder_walk<K, V, F>(
    tree: &Tree<K, V>,
    start: NodeIndex,
    filter: &mut F,
    mut visit: impl FnMut(NodeIndex, &Node<K, V>, &F),
) where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    let mut stack = vec![Level::new(tree.leftmost_child(start))];

    while let Some(level) = stack.last_mut() {
        let Some(child) = level.next else {
            stack.pop();
            if !stack.is_empty() {
                filter.less_deep();
            }
            continue;
        };

        let node = &tree[child];
        level.next = node.right_sibling;
        filter.set_first_node(level.first);
        level.first = false;
        filter.set_last_node(node.right_sibling.is_none());

        if filter.accept(node) {
            visit(child, node, &*filter);
            filter.more_deep();
            stack.push(Level::new(node.leftmost_child));
        }
    }
}

/// Find the first descendant of `start` accepted by `filter`
///
/// Search order is preorder, left to right. Unlike [`preorder_walk`] every
/// node is tested: a rejected node is still searched below, so a search by
/// id reaches the whole tree. The first accepted node wins.
pub fn get_node<K, V, F>(tree: &Tree<K, V>, start: NodeIndex, filter: &mut F) -> Option<NodeIndex>
where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    let base = filter.deep_level();
    let mut stack = vec![Level::new(tree.leftmost_child(start))];

    while let Some(level) = stack.last_mut() {
        let Some(child) = level.next else {
            stack.pop();
            if !stack.is_empty() {
                filter.less_deep();
            }
            continue;
        };

        let node = &tree[child];
        level.next = node.right_sibling;
        filter.set_first_node(level.first);
        level.first = false;
        filter.set_last_node(node.right_sibling.is_none());

        if filter.accept(node) {
            filter.set_deep_level(base);
            return Some(child);
        }
        if node.leftmost_child.is_some() {
            filter.more_deep();
            stack.push(Level::new(node.leftmost_child));
        }
    }

    None
}

/// Path from the top level down to the first node accepted by `filter`
///
/// The search is [`get_node`]'s; the path then follows parent links up to
/// the sentinel, which is not part of the result. Empty when nothing
/// matches.
pub fn get_path<K, V, F>(tree: &Tree<K, V>, start: NodeIndex, filter: &mut F) -> Vec<NodeIndex>
where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    let Some(target) = get_node(tree, start, filter) else {
        return Vec::new();
    };

    let mut path = Vec::new();
    let mut current = Some(target);
    while let Some(index) = current {
        if index.is_root() {
            break;
        }
        path.push(index);
        current = tree.parent(index);
    }
    path.reverse();
    path
}

/// Like [`get_path`], resolved to the nodes themselves
pub fn breadcrumbs<'a, K, V, F>(tree: &'a Tree<K, V>, start: NodeIndex, filter: &mut F) -> Vec<&'a Node<K, V>>
where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    get_path(tree, start, filter)
        .into_iter()
        .map(|index| &tree[index])
        .collect()
}

/// Detach the first descendant of `start` accepted by `filter`
///
/// The node is spliced out of its sibling chain and its parent link is
/// cleared; its own subtree stays attached to it. Returns the detached
/// node, or `None` when nothing matches or the node's parent link does not
/// lead back to the chain it sits in.
pub fn delete_node<K, V, F>(tree: &mut Tree<K, V>, start: NodeIndex, filter: &mut F) -> Option<NodeIndex>
where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    let target = get_node(tree, start, filter)?;
    tree.detach(target).then_some(target)
}

/// Ids of every descendant of `start`, in preorder
pub fn get_all_ids<K: Clone, V>(tree: &Tree<K, V>, start: NodeIndex) -> Vec<K> {
    tree.walk(start, TraversalOrder::PreOrder)
        .filter(|&index| index != start)
        .filter_map(|index| tree.id(index).cloned())
        .collect()
}

/// Ids of the nodes a [`preorder_walk`] with `filter` visits
pub fn get_ids<K, V, F>(tree: &Tree<K, V>, start: NodeIndex, filter: &mut F) -> Vec<K>
where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    let mut ids = Vec::new();
    preorder_walk(tree, start, filter, |_, node, _| ids.extend(node.id().cloned()));
    ids
}

/// Cursor over one level of siblings that remembers the last kept node
struct PruneLevel {
    parent: NodeIndex,
    previous: Option<NodeIndex>,
    next: Option<NodeIndex>,
    first: bool,
}

/// Physically remove every descendant of `start` that `filter` rejects
///
/// A rejected node is unlinked from its sibling chain and released from the
/// arena together with its whole subtree; its descendants are not tested.
/// Accepted nodes are descended into and pruned in turn. Returns the number
/// of nodes released.
pub fn prune<K, V, F>(tree: &mut Tree<K, V>, start: NodeIndex, filter: &mut F) -> usize
where
    K: NodeKey,
    F: TraversalFilter<K, V> + ?Sized,
{
    let mut released = 0;
    let mut stack = vec![PruneLevel {
        parent: start,
        previous: None,
        next: tree.leftmost_child(start),
        first: true,
    }];

    while let Some(level) = stack.last_mut() {
        let Some(child) = level.next else {
            stack.pop();
            if !stack.is_empty() {
                filter.less_deep();
            }
            continue;
        };

        let right = tree.right_sibling(child);
        level.next = right;
        filter.set_first_node(level.first);
        level.first = false;
        filter.set_last_node(right.is_none());

        if filter.accept(&tree[child]) {
            level.previous = Some(child);
            let below = tree.leftmost_child(child);
            filter.more_deep();
            stack.push(PruneLevel {
                parent: child,
                previous: None,
                next: below,
                first: true,
            });
        } else {
            match level.previous {
                Some(previous) => tree[previous].right_sibling = right,
                None => tree[level.parent].leftmost_child = right,
            }
            released += tree.release_subtree(child);
        }
    }

    released
}
