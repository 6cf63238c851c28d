//! Tree Markup
//!
//! HTML presentation visitors for [`tree_engine::render`]. Each visitor
//! decides what text a render step produces, while the engine decides which
//! nodes are emitted and in which order.
//!
//! # Visitors
//!
//! - **NestedList**: nested `<ul>` (or `<ol>`) lists, one `<li>` per node
//! - **SelectOptions**: flat `<option>` elements, labels indented by depth
//! - **CheckboxList**: nested list of labelled checkboxes
//!
//! Every visitor takes a label function `Fn(&Node<K, V>) -> String`; labels
//! and attribute values are HTML-escaped.
//!
//! # Example
//!
//! ```
//! use tree_engine::prelude::*;
//! use tree_markup::prelude::*;
//!
//! let mut tree: Tree<u32, &str> = Tree::new();
//! let fruit = tree.create(1, "Fruit");
//! let apple = tree.create(2, "Apple");
//! tree.append(tree.root(), fruit);
//! tree.append(fruit, apple);
//!
//! let mut list = NestedList::new(display_value);
//! let html = render_to_string(&tree, tree.root(), &mut AcceptAll::new(), &mut list, RenderMode::Folded);
//! assert_eq!(html, "<ul><li>Fruit<ul><li>Apple</li></ul></li></ul>");
//! ```

pub mod checkbox;
pub mod escape;
pub mod list;
pub mod select;

use std::fmt::Display;

use tree_engine::{Node, NodeKey};

pub use checkbox::CheckboxList;
pub use escape::escape;
pub use list::{ListKind, NestedList};
pub use select::{render_select, SelectOptions};

/// Label a node with its payload, or nothing when it has none
pub fn display_value<K: NodeKey, V: Display>(node: &Node<K, V>) -> String {
    node.value().map(ToString::to_string).unwrap_or_default()
}

/// Label a node with its id
pub fn display_id<K: NodeKey + Display, V>(node: &Node<K, V>) -> String {
    node.id().map(ToString::to_string).unwrap_or_default()
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::checkbox::CheckboxList;
    pub use crate::list::{ListKind, NestedList};
    pub use crate::select::{render_select, SelectOptions};
    pub use crate::{display_id, display_value};
}
