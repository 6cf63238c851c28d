//! Tree Engine
//!
//! General (unbounded-arity) trees in leftmost-child / right-sibling form,
//! with filter-driven traversal, rendering, pruning, and a flat edge-list
//! format that a tree can be rebuilt from.
//!
//! # Core Concepts
//!
//! - **Tree**: arena of nodes under an id-less sentinel root
//! - **Node**: external id, optional payload, child/sibling/parent links
//! - **TraversalFilter**: predicate plus depth, position and selection state
//! - **RenderVisitor**: produces the text for each step of a render
//! - **Row**: one node of the flat edge list
//!
//! # Example
//!
//! ```
//! use tree_engine::prelude::*;
//!
//! let mut tree: Tree<u32, &str> = Tree::new();
//! let docs = tree.create(1, "docs");
//! let guide = tree.create(2, "guide");
//! let api = tree.create(3, "api");
//! tree.append(tree.root(), docs);
//! tree.append(docs, guide);
//! tree.append(tree.root(), api);
//!
//! assert_eq!(get_all_ids(&tree, tree.root()), vec![1, 2, 3]);
//!
//! // Flatten and rebuild
//! let rows = normalize(&tree, tree.root());
//! let rebuilt = build_from_matrix(rows, from_row);
//!
//! let path = get_path(&rebuilt, rebuilt.root(), &mut ById::new(2));
//! let names: Vec<_> = path.iter().filter_map(|&ix| rebuilt.value(ix).copied()).collect();
//! assert_eq!(names, vec!["docs", "guide"]);
//! ```

pub mod filter;
pub mod matrix;
mod node;
#[cfg(feature = "serde")]
pub mod records;
pub mod render;
pub mod traverse;
mod tree;

pub use filter::{
    AcceptAll, BoxedFilter, ById, Chain, ChainMode, FilterState, MaxDepth, Predicate, SelectedItemsOnly,
    TraversalFilter,
};
pub use matrix::{build_from_matrix, from_row, normalize, normalize_with, Row};
pub use node::{Node, NodeIndex, NodeKey};
#[cfg(feature = "serde")]
pub use records::{FieldMap, Record};
pub use render::{render, render_to_string, RenderMode, RenderVisitor, Visit};
pub use traverse::{
    breadcrumbs, delete_node, get_all_ids, get_ids, get_node, get_path, postorder, preorder, preorder_walk, prune,
};
pub use tree::{Children, TraversalOrder, Tree, TreeWalker};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::filter::{AcceptAll, ById, Chain, ChainMode, MaxDepth, Predicate, SelectedItemsOnly, TraversalFilter};
    pub use crate::matrix::{build_from_matrix, from_row, normalize, normalize_with, Row};
    pub use crate::node::{Node, NodeIndex, NodeKey};
    pub use crate::render::{render, render_to_string, RenderMode, RenderVisitor, Visit};
    pub use crate::traverse::{
        breadcrumbs, delete_node, get_all_ids, get_ids, get_node, get_path, postorder, preorder, preorder_walk,
        prune,
    };
    pub use crate::tree::{TraversalOrder, Tree};
}
