//! Flat edge-list ("matrix") form of a tree
//!
//! Each [`Row`] stores a node's id together with the ids of its parent,
//! leftmost child and right sibling. [`normalize`] flattens a tree into rows
//! and [`build_from_matrix`] rebuilds the pointer structure from rows alone.

use std::collections::{HashMap, VecDeque};

use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeIndex, NodeKey};
use crate::tree::{TraversalOrder, Tree};

/// One node of a flattened tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Row<K, P> {
    pub node_id: K,
    /// `None` for top-level nodes (children of the sentinel)
    pub parent_id: Option<K>,
    pub leftmost_child: Option<K>,
    pub right_sibling: Option<K>,
    pub payload: P,
}

impl<K, P> Row<K, P> {
    pub fn new(node_id: K, parent_id: Option<K>, leftmost_child: Option<K>, right_sibling: Option<K>, payload: P) -> Self {
        Self {
            node_id,
            parent_id,
            leftmost_child,
            right_sibling,
            payload,
        }
    }

    /// Same row with its payload mapped through `f`
    pub fn map_payload<Q>(self, f: impl FnOnce(P) -> Q) -> Row<K, Q> {
        Row {
            node_id: self.node_id,
            parent_id: self.parent_id,
            leftmost_child: self.leftmost_child,
            right_sibling: self.right_sibling,
            payload: f(self.payload),
        }
    }
}

/// Flatten the descendants of `start` into rows, cloning payloads
pub fn normalize<K, V>(tree: &Tree<K, V>, start: NodeIndex) -> Vec<Row<K, Option<V>>>
where
    K: NodeKey,
    V: Clone,
{
    normalize_with(tree, start, |value| value.cloned())
}

/// Flatten the descendants of `start` into rows
///
/// Rows come out depth-first, left to right; `start` itself is not part of
/// the output. `serialize` turns each node's payload into the row payload.
pub fn normalize_with<K, V, P>(
    tree: &Tree<K, V>,
    start: NodeIndex,
    mut serialize: impl FnMut(Option<&V>) -> P,
) -> Vec<Row<K, P>>
where
    K: NodeKey,
{
    let id_of = |index: Option<NodeIndex>| index.and_then(|ix| tree.id(ix)).cloned();

    tree.walk(start, TraversalOrder::PreOrder)
        .filter(|&index| index != start)
        .filter_map(|index| {
            let node = &tree[index];
            let node_id = node.id()?.clone();
            Some(Row {
                node_id,
                parent_id: id_of(node.parent),
                leftmost_child: id_of(node.leftmost_child),
                right_sibling: id_of(node.right_sibling),
                payload: serialize(node.value()),
            })
        })
        .collect()
}

/// Identity construction hook for rows produced by [`normalize`]
pub fn from_row<K, V>(row: Row<K, Option<V>>) -> Node<K, V> {
    Node::new(row.node_id, row.payload)
}

/// Rebuild a tree from rows that carry no structure beyond ids
///
/// The entry point is the leftmost top-level row, found by starting at the
/// top-level row without a right sibling and walking backwards along the
/// right-sibling references. From there every row is resolved by id: its
/// node is built with `construct`, the row is consumed, and its leftmost
/// child and right sibling are resolved the same way. A final pass assigns
/// every node its structural parent.
///
/// Malformed input never fails. Dangling references resolve to nothing,
/// each row is consumed at most once (so cycles terminate), and rows that
/// are never reached are dropped. When several rows share an id the first
/// row not yet consumed wins.
pub fn build_from_matrix<K, V, P>(
    rows: impl IntoIterator<Item = Row<K, P>>,
    mut construct: impl FnMut(Row<K, P>) -> Node<K, V>,
) -> Tree<K, V>
where
    K: NodeKey,
{
    let rows: Vec<Row<K, P>> = rows.into_iter().collect();
    let mut tree = Tree::new();

    match rows.len() {
        0 => return tree,
        1 => {
            if let Some(row) = rows.into_iter().next() {
                trace!("Single row, attaching {:?} to the root", row.node_id);
                let index = tree.adopt(construct(row));
                tree.link_child_raw(NodeIndex::ROOT, index);
                tree.fix_parents();
            }
            return tree;
        }
        _ => {}
    }

    let Some(entry) = find_entry(&rows) else {
        warn!("No top-level row among {} rows, returning an empty tree", rows.len());
        return tree;
    };
    debug!("Rebuilding {} rows from entry {:?}", rows.len(), entry);

    let mut lookup = RowLookup::new(rows);
    let mut pending = vec![(Link::Child(NodeIndex::ROOT), entry)];

    while let Some((link, id)) = pending.pop() {
        let Some(row) = lookup.take(&id) else {
            warn!("Reference to {:?} does not resolve to an unconsumed row", id);
            continue;
        };
        trace!("Node found: {:?}", id);

        let leftmost_child = row.leftmost_child.clone();
        let right_sibling = row.right_sibling.clone();
        let index = tree.adopt(construct(row));
        match link {
            Link::Child(parent) => tree.link_child_raw(parent, index),
            Link::Sibling(left) => tree.link_sibling_raw(left, index),
        }

        // Child last so the whole subtree is resolved before the sibling
        if let Some(sibling) = right_sibling {
            pending.push((Link::Sibling(index), sibling));
        }
        if let Some(child) = leftmost_child {
            pending.push((Link::Child(index), child));
        }
    }

    let unreached = lookup.remaining();
    if unreached > 0 {
        debug!("{} rows were not reachable from the entry point", unreached);
    }

    tree.fix_parents();
    tree
}

/// Where a resolved node gets attached
enum Link {
    Child(NodeIndex),
    Sibling(NodeIndex),
}

/// Id of the leftmost top-level row
fn find_entry<K: NodeKey, P>(rows: &[Row<K, P>]) -> Option<K> {
    let mut level0: Vec<&Row<K, P>> = rows.iter().filter(|row| row.parent_id.is_none()).collect();
    if level0.is_empty() {
        return None;
    }

    let Some(start) = level0.iter().position(|row| row.right_sibling.is_none()) else {
        // Top level is a cycle: there is no chain end to walk back from
        warn!("Every top-level row has a right sibling, starting from the first one");
        return Some(level0[0].node_id.clone());
    };

    let bound = level0.len();
    let mut anchor = level0.remove(start);
    for _ in 0..bound {
        let Some(position) = level0
            .iter()
            .position(|row| row.right_sibling.as_ref() == Some(&anchor.node_id))
        else {
            break;
        };
        anchor = level0.remove(position);
        trace!("Anchor moved left to {:?}", anchor.node_id);
    }

    Some(anchor.node_id.clone())
}

/// Rows keyed by id, each row handed out once, in input order per id
struct RowLookup<K, P> {
    rows: Vec<Option<Row<K, P>>>,
    positions: HashMap<K, VecDeque<usize>>,
}

impl<K: NodeKey, P> RowLookup<K, P> {
    fn new(rows: Vec<Row<K, P>>) -> Self {
        let mut positions: HashMap<K, VecDeque<usize>> = HashMap::new();
        for (position, row) in rows.iter().enumerate() {
            positions.entry(row.node_id.clone()).or_default().push_back(position);
        }
        Self {
            rows: rows.into_iter().map(Some).collect(),
            positions,
        }
    }

    fn take(&mut self, id: &K) -> Option<Row<K, P>> {
        let position = self.positions.get_mut(id)?.pop_front()?;
        self.rows.get_mut(position).and_then(Option::take)
    }

    fn remaining(&self) -> usize {
        self.rows.iter().filter(|row| row.is_some()).count()
    }
}
