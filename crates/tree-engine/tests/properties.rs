use std::cell::RefCell;
use std::collections::HashMap;

use proptest::prelude::*;
use proptest::sample::Index;
use tree_engine::prelude::*;
use tree_engine::FilterState;

/// Build a tree where node `i + 1` hangs below an earlier node chosen by
/// `parents[i]`
fn build(parents: &[Index]) -> Tree<u32, u32> {
    let mut tree = Tree::new();
    let mut created = vec![NodeIndex::ROOT];
    for (i, choice) in parents.iter().enumerate() {
        let id = i as u32 + 1;
        let node = tree.create(id, id * 10);
        let parent = created[choice.index(created.len())];
        tree.append(parent, node);
        created.push(node);
    }
    tree
}

fn trees() -> impl Strategy<Value = Tree<u32, u32>> {
    prop::collection::vec(any::<Index>(), 0..64).prop_map(|parents| build(&parents))
}

/// Depth of every node below the sentinel, keyed by id (top level = 0)
fn depths(tree: &Tree<u32, u32>) -> HashMap<u32, usize> {
    let mut depths = HashMap::new();
    preorder(tree, NodeIndex::ROOT, |index, node| {
        if let Some(id) = node.id() {
            depths.insert(*id, tree.depth(index) - 1);
        }
    });
    depths
}

/// Accepts ids not divisible by `modulus` and logs the depth it was asked at
struct Logging {
    modulus: u32,
    seen: RefCell<Vec<(u32, usize)>>,
    state: FilterState<u32>,
}

impl Logging {
    fn new(modulus: u32) -> Self {
        Self {
            modulus,
            seen: RefCell::new(Vec::new()),
            state: FilterState::default(),
        }
    }
}

impl TraversalFilter<u32, u32> for Logging {
    fn accept(&self, node: &Node<u32, u32>) -> bool {
        let id = *node.id().unwrap();
        self.seen.borrow_mut().push((id, self.deep_level()));
        id % self.modulus != 0
    }

    fn state(&self) -> &FilterState<u32> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FilterState<u32> {
        &mut self.state
    }
}

proptest! {
    #[test]
    fn round_trip_preserves_structure(tree in trees()) {
        let rows = normalize(&tree, NodeIndex::ROOT);
        let rebuilt = build_from_matrix(rows.clone(), from_row);
        prop_assert_eq!(normalize(&rebuilt, NodeIndex::ROOT), rows);
        prop_assert_eq!(rebuilt.len(), tree.len());
    }

    #[test]
    fn round_trip_survives_row_shuffling(tree in trees(), seed in any::<u64>()) {
        let rows = normalize(&tree, NodeIndex::ROOT);
        let mut shuffled = rows.clone();
        // Deterministic rotation plus reversal is enough to break input order
        if !shuffled.is_empty() {
            let shift = (seed % shuffled.len() as u64) as usize;
            shuffled.rotate_left(shift);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
        }
        let rebuilt = build_from_matrix(shuffled, from_row);
        prop_assert_eq!(normalize(&rebuilt, NodeIndex::ROOT), rows);
    }

    #[test]
    fn preorder_and_postorder_visit_everything_once(tree in trees()) {
        let mut pre = Vec::new();
        let mut post = Vec::new();
        preorder(&tree, NodeIndex::ROOT, |index, _| pre.push(index));
        postorder(&tree, NodeIndex::ROOT, |index, _| post.push(index));

        prop_assert_eq!(pre.len(), tree.len());
        prop_assert_eq!(post.len(), tree.len());

        let pre_pos: HashMap<_, _> = pre.iter().enumerate().map(|(i, ix)| (*ix, i)).collect();
        let post_pos: HashMap<_, _> = post.iter().enumerate().map(|(i, ix)| (*ix, i)).collect();
        prop_assert_eq!(pre_pos.len(), tree.len());
        prop_assert_eq!(post_pos.len(), tree.len());

        for &index in &pre {
            if let Some(parent) = tree.parent(index) {
                prop_assert!(pre_pos[&parent] < pre_pos[&index]);
                prop_assert!(post_pos[&parent] > post_pos[&index]);
            }
        }
    }

    #[test]
    fn walk_depth_counts_accepted_ancestors(tree in trees(), modulus in 2u32..6) {
        let expected = depths(&tree);
        let mut filter = Logging::new(modulus);
        preorder_walk(&tree, NodeIndex::ROOT, &mut filter, |_, _, _| {});

        for (id, depth) in filter.seen.borrow().iter() {
            prop_assert_eq!(*depth, expected[id], "depth for node {}", id);
        }
        prop_assert_eq!(filter.deep_level(), 0);
    }

    #[test]
    fn prune_keeps_exactly_what_a_walk_accepts(tree in trees(), modulus in 2u32..6) {
        let accepted = get_ids(&tree, NodeIndex::ROOT, &mut Logging::new(modulus));

        let mut pruned = tree.clone();
        let released = prune(&mut pruned, NodeIndex::ROOT, &mut Logging::new(modulus));

        let remaining = get_all_ids(&pruned, NodeIndex::ROOT);
        prop_assert_eq!(&remaining, &accepted);
        prop_assert!(remaining.iter().all(|id| id % modulus != 0));
        prop_assert_eq!(pruned.len() + released, tree.len());
    }

    #[test]
    fn chain_combines_members(id in 0u32..20, a in 0u32..20, b in 0u32..20) {
        let node: Node<u32, ()> = Node::new(id, None);
        let and = Chain::and().with(ById::new(a)).with(ById::new(b));
        let or = Chain::or().with(ById::new(a)).with(ById::new(b));
        let fa = ById::new(a);
        let fb = ById::new(b);

        prop_assert_eq!(and.accept(&node), fa.accept(&node) && fb.accept(&node));
        prop_assert_eq!(or.accept(&node), fa.accept(&node) || fb.accept(&node));
    }

    #[test]
    fn folds_are_balanced_and_anchored(tree in trees(), modulus in 2u32..6) {
        let mut visitor = Tags;
        let mut filter = Predicate::new(move |node: &Node<u32, u32>| node.id().is_some_and(|id| id % modulus != 0));
        let out = render(&tree, NodeIndex::ROOT, &mut filter, &mut visitor, RenderMode::Folded);

        let mut folds = Vec::new();
        let mut nodes = Vec::new();
        for fragment in &out {
            let (step, id) = fragment.split_once(':').unwrap();
            match step {
                "of" => folds.push(id.to_string()),
                "cf" => {
                    prop_assert_eq!(folds.pop(), Some(id.to_string()));
                }
                "on" => nodes.push(id.to_string()),
                "cn" => {
                    prop_assert_eq!(nodes.pop(), Some(id.to_string()));
                }
                _ => {}
            }
        }
        prop_assert!(folds.is_empty());
        prop_assert!(nodes.is_empty());

        let has_top_level = tree.children(NodeIndex::ROOT).any(|ix| tree.id(ix).is_some_and(|id| id % modulus != 0));
        prop_assert_eq!(out.first().is_some_and(|s| s.starts_with("of:")), has_top_level);
    }
}

struct Tags;

impl RenderVisitor<u32, u32> for Tags {
    fn open_fold(&mut self, visit: &Visit<'_, u32, u32>) -> String {
        format!("of:{}", visit.node.id().unwrap())
    }

    fn close_fold(&mut self, visit: &Visit<'_, u32, u32>) -> String {
        format!("cf:{}", visit.node.id().unwrap())
    }

    fn open_node(&mut self, visit: &Visit<'_, u32, u32>) -> String {
        format!("on:{}", visit.node.id().unwrap())
    }

    fn close_node(&mut self, visit: &Visit<'_, u32, u32>) -> String {
        format!("cn:{}", visit.node.id().unwrap())
    }

    fn render_node(&mut self, visit: &Visit<'_, u32, u32>, _mode: RenderMode) -> String {
        format!("rn:{}", visit.node.id().unwrap())
    }
}
