//! Rendering driven by a filter and a presentation visitor
//!
//! The engine decides *which* nodes are emitted and in which order; a
//! [`RenderVisitor`] decides what text each step produces. Concrete markup
//! (nested lists, select options, checkbox lists) lives with the visitors.

use derive_more::Display;

use crate::filter::TraversalFilter;
use crate::node::{Node, NodeIndex, NodeKey};
use crate::tree::Tree;

/// How [`render`] groups the nodes of one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum RenderMode {
    /// Each level with at least one accepted node is wrapped in a fold, and
    /// children are rendered inside their parent's open/close pair
    #[default]
    #[display(fmt = "folded")]
    Folded,
    /// Every node is opened and closed before its children are rendered,
    /// with no fold markers
    #[display(fmt = "flat")]
    Flat,
}

/// Everything a visitor gets to look at for one step
pub struct Visit<'a, K: NodeKey, V> {
    pub tree: &'a Tree<K, V>,
    pub index: NodeIndex,
    pub node: &'a Node<K, V>,
    /// The filter in its current state (depth, position flags, selection)
    pub filter: &'a dyn TraversalFilter<K, V>,
}

impl<K: NodeKey, V> Visit<'_, K, V> {
    pub fn depth(&self) -> usize {
        self.filter.deep_level()
    }

    pub fn is_selected(&self) -> bool {
        self.filter.is_selected(self.node)
    }
}

/// Produces the text fragments of a render
///
/// `open_fold` and `close_fold` are called with the same anchor node: the
/// first accepted node of the level. Every `open_node` is paired with a
/// `close_node` for the same node.
pub trait RenderVisitor<K: NodeKey, V> {
    fn open_fold(&mut self, visit: &Visit<'_, K, V>) -> String;

    fn close_fold(&mut self, visit: &Visit<'_, K, V>) -> String;

    fn open_node(&mut self, visit: &Visit<'_, K, V>) -> String;

    fn close_node(&mut self, visit: &Visit<'_, K, V>) -> String;

    fn render_node(&mut self, visit: &Visit<'_, K, V>, mode: RenderMode) -> String;
}

/// Position flags of an accepted node, restored before its `close_node`
#[derive(Clone, Copy)]
struct Opened {
    index: NodeIndex,
    first: bool,
    last: bool,
}

struct Fold {
    owner: Option<Opened>,
    next: Option<NodeIndex>,
    first: bool,
    anchor: Option<NodeIndex>,
}

impl Fold {
    fn new(owner: Option<Opened>, next: Option<NodeIndex>) -> Self {
        Self {
            owner,
            next,
            first: true,
            anchor: None,
        }
    }
}

fn visit<'a, K: NodeKey, V, F: TraversalFilter<K, V>>(
    tree: &'a Tree<K, V>,
    index: NodeIndex,
    filter: &'a F,
) -> Visit<'a, K, V> {
    Visit {
        tree,
        index,
        node: &tree[index],
        filter,
    }
}

/// Render the descendants of `start` as an ordered list of fragments
///
/// Rejected nodes are skipped together with their subtrees and play no part
/// in fold anchoring. Position flags are set before each node is tested;
/// the first flag stays up until a node of the level has been accepted.
pub fn render<K, V, F, R>(
    tree: &Tree<K, V>,
    start: NodeIndex,
    filter: &mut F,
    visitor: &mut R,
    mode: RenderMode,
) -> Vec<String>
where
    K: NodeKey,
    F: TraversalFilter<K, V>,
    R: RenderVisitor<K, V> + ?Sized,
{
    let folded = mode == RenderMode::Folded;
    let mut out = Vec::new();
    let mut stack = vec![Fold::new(None, tree.leftmost_child(start))];

    while let Some(level) = stack.last_mut() {
        let Some(child) = level.next else {
            let Some(done) = stack.pop() else { break };
            if let Some(anchor) = done.anchor {
                out.push(visitor.close_fold(&visit(tree, anchor, &*filter)));
            }
            if let Some(owner) = done.owner {
                filter.less_deep();
                if folded {
                    filter.set_first_node(owner.first);
                    filter.set_last_node(owner.last);
                    out.push(visitor.close_node(&visit(tree, owner.index, &*filter)));
                }
            }
            continue;
        };

        let right = tree.right_sibling(child);
        level.next = right;
        filter.set_first_node(level.first);
        filter.set_last_node(right.is_none());

        if !filter.accept(&tree[child]) {
            continue;
        }

        let opened = Opened {
            index: child,
            first: level.first,
            last: right.is_none(),
        };
        level.first = false;
        if folded && level.anchor.is_none() {
            level.anchor = Some(child);
            out.push(visitor.open_fold(&visit(tree, child, &*filter)));
        }

        let current = visit(tree, child, &*filter);
        out.push(visitor.open_node(&current));
        out.push(visitor.render_node(&current, mode));
        if !folded {
            out.push(visitor.close_node(&current));
        }

        filter.more_deep();
        stack.push(Fold::new(Some(opened), tree.leftmost_child(child)));
    }

    out
}

/// [`render`] joined into a single string
pub fn render_to_string<K, V, F, R>(
    tree: &Tree<K, V>,
    start: NodeIndex,
    filter: &mut F,
    visitor: &mut R,
    mode: RenderMode,
) -> String
where
    K: NodeKey,
    F: TraversalFilter<K, V>,
    R: RenderVisitor<K, V> + ?Sized,
{
    render(tree, start, filter, visitor, mode).concat()
}
