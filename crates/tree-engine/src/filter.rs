//! Traversal filters
//!
//! A filter is both a predicate (`accept`) and a small state tracker the
//! walking algorithms drive: the current depth, whether the node being
//! tested is the first and/or last of its siblings, and an independent set
//! of selected ids used for highlighting.
//!
//! The algorithms own the state transitions. A filter never moves its own
//! depth or position flags; it only reads them inside `accept`.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use derive_more::Display;
use smallvec::SmallVec;

use crate::node::{Node, NodeKey};

/// Mutable traversal state shared by every filter
#[derive(Debug, Clone)]
pub struct FilterState<K> {
    depth: usize,
    first: bool,
    last: bool,
    selected: HashSet<K>,
}

impl<K> Default for FilterState<K> {
    fn default() -> Self {
        Self {
            depth: 0,
            first: false,
            last: false,
            selected: HashSet::new(),
        }
    }
}

impl<K: NodeKey> FilterState<K> {
    /// Create a state with the given ids selected
    pub fn with_selection(ids: impl IntoIterator<Item = K>) -> Self {
        Self {
            selected: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn selection(&self) -> &HashSet<K> {
        &self.selected
    }
}

/// Predicate plus traversal-state tracker consumed by the tree algorithms
///
/// Implementors provide `accept` and access to a [`FilterState`]; all other
/// operations have default implementations on top of that state. Composite
/// filters override the setters to keep their members synchronized.
pub trait TraversalFilter<K: NodeKey, V> {
    /// Whether `node` should be included by the calling algorithm
    fn accept(&self, node: &Node<K, V>) -> bool;

    fn state(&self) -> &FilterState<K>;

    fn state_mut(&mut self) -> &mut FilterState<K>;

    /// Current depth, 0 at the level directly below the walk's start node
    fn deep_level(&self) -> usize {
        self.state().depth
    }

    fn more_deep(&mut self) {
        self.state_mut().depth += 1;
    }

    fn less_deep(&mut self) {
        let state = self.state_mut();
        state.depth = state.depth.saturating_sub(1);
    }

    /// Force the depth counter, used to reset a filter between walks
    fn set_deep_level(&mut self, depth: usize) {
        self.state_mut().depth = depth;
    }

    fn is_first_node(&self) -> bool {
        self.state().first
    }

    fn set_first_node(&mut self, first: bool) {
        self.state_mut().first = first;
    }

    fn is_last_node(&self) -> bool {
        self.state().last
    }

    fn set_last_node(&mut self, last: bool) {
        self.state_mut().last = last;
    }

    /// Replace the selection with the given ids
    fn select_items(&mut self, ids: &[K]) {
        let selected = &mut self.state_mut().selected;
        selected.clear();
        selected.extend(ids.iter().cloned());
    }

    fn deselect_all(&mut self) {
        self.state_mut().selected.clear();
    }

    /// Whether the node's id is in the selection; the sentinel never is
    fn is_selected(&self, node: &Node<K, V>) -> bool {
        node.id()
            .map(|id| self.state().selected.contains(id))
            .unwrap_or(false)
    }
}

impl<K: NodeKey, V, F: TraversalFilter<K, V> + ?Sized> TraversalFilter<K, V> for Box<F> {
    fn accept(&self, node: &Node<K, V>) -> bool {
        (**self).accept(node)
    }

    fn state(&self) -> &FilterState<K> {
        (**self).state()
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        (**self).state_mut()
    }

    fn more_deep(&mut self) {
        (**self).more_deep()
    }

    fn less_deep(&mut self) {
        (**self).less_deep()
    }

    fn set_deep_level(&mut self, depth: usize) {
        (**self).set_deep_level(depth)
    }

    fn set_first_node(&mut self, first: bool) {
        (**self).set_first_node(first)
    }

    fn set_last_node(&mut self, last: bool) {
        (**self).set_last_node(last)
    }

    fn select_items(&mut self, ids: &[K]) {
        (**self).select_items(ids)
    }

    fn deselect_all(&mut self) {
        (**self).deselect_all()
    }

    fn is_selected(&self, node: &Node<K, V>) -> bool {
        (**self).is_selected(node)
    }
}

/// Accepts every node
#[derive(Debug, Clone)]
pub struct AcceptAll<K, V> {
    state: FilterState<K>,
    _payload: PhantomData<fn(&V)>,
}

impl<K, V> Default for AcceptAll<K, V> {
    fn default() -> Self {
        Self {
            state: FilterState::default(),
            _payload: PhantomData,
        }
    }
}

impl<K: NodeKey, V> AcceptAll<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accept-all filter that highlights the given ids
    pub fn with_selection(ids: impl IntoIterator<Item = K>) -> Self {
        Self {
            state: FilterState::with_selection(ids),
            _payload: PhantomData,
        }
    }
}

impl<K: NodeKey, V> TraversalFilter<K, V> for AcceptAll<K, V> {
    fn accept(&self, _node: &Node<K, V>) -> bool {
        true
    }

    fn state(&self) -> &FilterState<K> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        &mut self.state
    }
}

/// Accepts exactly the nodes carrying one id
#[derive(Debug, Clone)]
pub struct ById<K, V> {
    target: K,
    state: FilterState<K>,
    _payload: PhantomData<fn(&V)>,
}

impl<K: NodeKey, V> ById<K, V> {
    pub fn new(target: K) -> Self {
        Self {
            target,
            state: FilterState::default(),
            _payload: PhantomData,
        }
    }

    pub fn target(&self) -> &K {
        &self.target
    }
}

impl<K: NodeKey, V> TraversalFilter<K, V> for ById<K, V> {
    fn accept(&self, node: &Node<K, V>) -> bool {
        node.has_id(&self.target)
    }

    fn state(&self) -> &FilterState<K> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        &mut self.state
    }
}

/// Accepts nodes above a depth limit
///
/// With a limit of `n`, nodes are accepted while `deep_level() < n`, so a
/// walk from the sentinel yields `n` levels. Without a limit every node is
/// accepted.
#[derive(Debug, Clone)]
pub struct MaxDepth<K, V> {
    limit: Option<usize>,
    state: FilterState<K>,
    _payload: PhantomData<fn(&V)>,
}

impl<K: NodeKey, V> MaxDepth<K, V> {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            state: FilterState::default(),
            _payload: PhantomData,
        }
    }

    pub fn unlimited() -> Self {
        Self {
            limit: None,
            state: FilterState::default(),
            _payload: PhantomData,
        }
    }

    /// Negative limits mean "no limit"
    pub fn from_signed(limit: i64) -> Self {
        match usize::try_from(limit) {
            Ok(limit) => Self::new(limit),
            Err(_) => Self::unlimited(),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl<K: NodeKey, V> TraversalFilter<K, V> for MaxDepth<K, V> {
    fn accept(&self, _node: &Node<K, V>) -> bool {
        match self.limit {
            Some(limit) => self.state.depth < limit,
            None => true,
        }
    }

    fn state(&self) -> &FilterState<K> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        &mut self.state
    }
}

/// Accepts only nodes whose id is in the selection
#[derive(Debug, Clone)]
pub struct SelectedItemsOnly<K, V> {
    state: FilterState<K>,
    _payload: PhantomData<fn(&V)>,
}

impl<K: NodeKey, V> SelectedItemsOnly<K, V> {
    pub fn new(ids: impl IntoIterator<Item = K>) -> Self {
        Self {
            state: FilterState::with_selection(ids),
            _payload: PhantomData,
        }
    }
}

impl<K: NodeKey, V> TraversalFilter<K, V> for SelectedItemsOnly<K, V> {
    fn accept(&self, node: &Node<K, V>) -> bool {
        self.is_selected(node)
    }

    fn state(&self) -> &FilterState<K> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        &mut self.state
    }
}

/// Filter backed by a caller-supplied predicate
pub struct Predicate<K, V> {
    predicate: Box<dyn Fn(&Node<K, V>) -> bool>,
    state: FilterState<K>,
}

impl<K: NodeKey, V> Predicate<K, V> {
    pub fn new(predicate: impl Fn(&Node<K, V>) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            state: FilterState::default(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Predicate<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<K: NodeKey, V> TraversalFilter<K, V> for Predicate<K, V> {
    fn accept(&self, node: &Node<K, V>) -> bool {
        (self.predicate)(node)
    }

    fn state(&self) -> &FilterState<K> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        &mut self.state
    }
}

/// How a [`Chain`] combines its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ChainMode {
    /// Every member must accept
    #[display(fmt = "AND")]
    And,
    /// At least one member must accept
    #[display(fmt = "OR")]
    Or,
}

/// Boxed filter as stored in a [`Chain`]
pub type BoxedFilter<K, V> = Box<dyn TraversalFilter<K, V>>;

/// Conjunction or disjunction of filters
///
/// Every state change made on the chain is broadcast to each member, so a
/// member testing its own depth or selection sees the same values as the
/// chain itself.
pub struct Chain<K: NodeKey, V> {
    mode: ChainMode,
    filters: SmallVec<[BoxedFilter<K, V>; 4]>,
    state: FilterState<K>,
}

impl<K: NodeKey, V> Chain<K, V> {
    pub fn new(mode: ChainMode) -> Self {
        Self {
            mode,
            filters: SmallVec::new(),
            state: FilterState::default(),
        }
    }

    pub fn and() -> Self {
        Self::new(ChainMode::And)
    }

    pub fn or() -> Self {
        Self::new(ChainMode::Or)
    }

    /// Add a member, bringing it in line with the chain's current state
    pub fn push(&mut self, mut filter: BoxedFilter<K, V>) {
        filter.set_deep_level(self.state.depth);
        filter.set_first_node(self.state.first);
        filter.set_last_node(self.state.last);
        if !self.state.selected.is_empty() {
            let ids: Vec<K> = self.state.selected.iter().cloned().collect();
            filter.select_items(&ids);
        }
        self.filters.push(filter);
    }

    /// Builder-style [`Chain::push`]
    pub fn with(mut self, filter: impl TraversalFilter<K, V> + 'static) -> Self {
        self.push(Box::new(filter));
        self
    }

    pub fn mode(&self) -> ChainMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<K: NodeKey, V> fmt::Debug for Chain<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("mode", &self.mode)
            .field("filters", &self.filters.len())
            .field("state", &self.state)
            .finish()
    }
}

impl<K: NodeKey, V> TraversalFilter<K, V> for Chain<K, V> {
    fn accept(&self, node: &Node<K, V>) -> bool {
        match self.mode {
            ChainMode::And => self.filters.iter().all(|f| f.accept(node)),
            ChainMode::Or => self.filters.iter().any(|f| f.accept(node)),
        }
    }

    fn state(&self) -> &FilterState<K> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<K> {
        &mut self.state
    }

    fn more_deep(&mut self) {
        self.state.depth += 1;
        self.filters.iter_mut().for_each(|f| f.more_deep());
    }

    fn less_deep(&mut self) {
        self.state.depth = self.state.depth.saturating_sub(1);
        self.filters.iter_mut().for_each(|f| f.less_deep());
    }

    fn set_deep_level(&mut self, depth: usize) {
        self.state.depth = depth;
        self.filters.iter_mut().for_each(|f| f.set_deep_level(depth));
    }

    fn set_first_node(&mut self, first: bool) {
        self.state.first = first;
        self.filters.iter_mut().for_each(|f| f.set_first_node(first));
    }

    fn set_last_node(&mut self, last: bool) {
        self.state.last = last;
        self.filters.iter_mut().for_each(|f| f.set_last_node(last));
    }

    fn select_items(&mut self, ids: &[K]) {
        self.state.selected.clear();
        self.state.selected.extend(ids.iter().cloned());
        self.filters.iter_mut().for_each(|f| f.select_items(ids));
    }

    fn deselect_all(&mut self) {
        self.state.selected.clear();
        self.filters.iter_mut().for_each(|f| f.deselect_all());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32) -> Node<u32, ()> {
        Node::new(id, None)
    }

    #[test]
    fn test_accept_all() {
        let filter = AcceptAll::<u32, ()>::new();
        assert!(filter.accept(&node(1)));
        assert_eq!(filter.deep_level(), 0);
        assert!(!filter.is_first_node());
        assert!(!filter.is_last_node());
    }

    #[test]
    fn test_by_id() {
        let filter = ById::new(4u32);
        assert!(filter.accept(&node(4)));
        assert!(!filter.accept(&node(5)));
        assert!(!filter.accept(&Node::sentinel()));
        assert_eq!(filter.target(), &4);
    }

    #[test]
    fn test_max_depth() {
        let mut filter = MaxDepth::<u32, ()>::new(2);
        let n = node(1);
        assert!(filter.accept(&n));
        filter.more_deep();
        assert!(filter.accept(&n));
        filter.more_deep();
        assert!(!filter.accept(&n));
        filter.less_deep();
        assert!(filter.accept(&n));
    }

    #[test]
    fn test_max_depth_negative_is_unlimited() {
        let mut filter = MaxDepth::<u32, ()>::from_signed(-1);
        assert_eq!(filter.limit(), None);
        for _ in 0..100 {
            filter.more_deep();
        }
        assert!(filter.accept(&node(1)));
        assert_eq!(MaxDepth::<u32, ()>::from_signed(3).limit(), Some(3));
    }

    #[test]
    fn test_less_deep_saturates() {
        let mut filter = AcceptAll::<u32, ()>::new();
        filter.less_deep();
        assert_eq!(filter.deep_level(), 0);
        filter.set_deep_level(3);
        assert_eq!(filter.state().depth(), 3);
    }

    #[test]
    fn test_position_flags() {
        let mut filter = AcceptAll::<u32, ()>::new();
        filter.set_first_node(true);
        filter.set_last_node(true);
        assert!(filter.is_first_node());
        assert!(filter.is_last_node());
    }

    #[test]
    fn test_selection() {
        let mut filter = AcceptAll::<u32, ()>::new();
        filter.select_items(&[1, 3]);
        assert!(filter.is_selected(&node(1)));
        assert!(!filter.is_selected(&node(2)));

        filter.select_items(&[2]);
        assert!(!filter.is_selected(&node(1)));
        assert!(filter.is_selected(&node(2)));

        filter.deselect_all();
        assert!(!filter.is_selected(&node(2)));
        assert!(!filter.is_selected(&Node::sentinel()));
    }

    #[test]
    fn test_selected_items_only() {
        let filter = SelectedItemsOnly::new([2u32, 4]);
        assert!(filter.accept(&node(2)));
        assert!(!filter.accept(&node(3)));
        assert!(!filter.accept(&Node::sentinel()));
        assert_eq!(filter.state().selection().len(), 2);
    }

    #[test]
    fn test_predicate() {
        let filter = Predicate::new(|n: &Node<u32, ()>| n.id().is_some_and(|id| id % 2 == 0));
        assert!(filter.accept(&node(2)));
        assert!(!filter.accept(&node(3)));
    }

    #[test]
    fn test_chain_and_or() {
        let and = Chain::and().with(ById::new(2u32)).with(MaxDepth::new(1));
        let or = Chain::or().with(ById::new(2u32)).with(ById::new(3u32));

        assert!(and.accept(&node(2)));
        assert!(!and.accept(&node(3)));
        assert!(or.accept(&node(2)));
        assert!(or.accept(&node(3)));
        assert!(!or.accept(&node(4)));
        assert_eq!(and.mode().to_string(), "AND");
        assert_eq!(or.mode().to_string(), "OR");
    }

    #[test]
    fn test_empty_chain() {
        let and: Chain<u32, ()> = Chain::and();
        let or: Chain<u32, ()> = Chain::or();
        assert!(and.is_empty());
        assert!(and.accept(&node(1)));
        assert!(!or.accept(&node(1)));
    }

    #[test]
    fn test_chain_broadcasts_depth() {
        let mut chain = Chain::and().with(ById::new(1u32)).with(MaxDepth::new(1));
        assert!(chain.accept(&node(1)));

        chain.more_deep();
        assert_eq!(chain.deep_level(), 1);
        // The depth-limited member sees the broadcast depth
        assert!(!chain.accept(&node(1)));

        chain.less_deep();
        assert!(chain.accept(&node(1)));
    }

    #[test]
    fn test_chain_broadcasts_selection() {
        let mut chain = Chain::or().with(SelectedItemsOnly::new(Vec::<u32>::new()));
        assert!(!chain.accept(&node(7)));

        chain.select_items(&[7]);
        assert!(chain.is_selected(&node(7)));
        assert!(chain.accept(&node(7)));

        chain.deselect_all();
        assert!(!chain.accept(&node(7)));
    }

    #[test]
    fn test_chain_push_syncs_new_member() {
        let mut chain: Chain<u32, ()> = Chain::and();
        chain.more_deep();
        chain.more_deep();
        chain.push(Box::new(MaxDepth::new(2)));
        assert!(!chain.accept(&node(1)));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_nested_chain() {
        let inner = Chain::or().with(ById::new(1u32)).with(ById::new(2u32));
        let outer = Chain::and().with(inner).with(MaxDepth::unlimited());
        assert!(outer.accept(&node(1)));
        assert!(!outer.accept(&node(3)));
    }
}
