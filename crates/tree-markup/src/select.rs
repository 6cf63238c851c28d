//! `<select>` options with depth-indented labels

use std::fmt::Display;

use tree_engine::{render_to_string, Node, NodeIndex, NodeKey, RenderMode, RenderVisitor, TraversalFilter, Tree, Visit};

use crate::escape::escape;

const DEFAULT_INDENT: &str = "&nbsp;&nbsp;";

/// Renders each node as an `<option>`, its value being the node id
///
/// Meant for [`RenderMode::Flat`]; folds produce no markup. Labels are
/// prefixed with the indent once per depth level and selected nodes get the
/// `selected` attribute.
pub struct SelectOptions<L> {
    label: L,
    indent: String,
}

impl<L> SelectOptions<L> {
    pub fn new(label: L) -> Self {
        Self {
            label,
            indent: DEFAULT_INDENT.to_string(),
        }
    }

    /// Markup repeated once per depth level before each label
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }
}

impl<K, V, L> RenderVisitor<K, V> for SelectOptions<L>
where
    K: NodeKey + Display,
    L: Fn(&Node<K, V>) -> String,
{
    fn open_fold(&mut self, _visit: &Visit<'_, K, V>) -> String {
        String::new()
    }

    fn close_fold(&mut self, _visit: &Visit<'_, K, V>) -> String {
        String::new()
    }

    fn open_node(&mut self, visit: &Visit<'_, K, V>) -> String {
        let value = visit.node.id().map(ToString::to_string).unwrap_or_default();
        let selected = if visit.is_selected() { " selected" } else { "" };
        format!("<option value=\"{}\"{}>", escape(&value), selected)
    }

    fn close_node(&mut self, _visit: &Visit<'_, K, V>) -> String {
        "</option>".to_string()
    }

    fn render_node(&mut self, visit: &Visit<'_, K, V>, _mode: RenderMode) -> String {
        let label = (self.label)(visit.node);
        format!("{}{}", self.indent.repeat(visit.depth()), escape(&label))
    }
}

/// Render the descendants of `start` as a complete `<select name=...>`
pub fn render_select<K, V, F, L>(
    name: &str,
    tree: &Tree<K, V>,
    start: NodeIndex,
    filter: &mut F,
    options: &mut SelectOptions<L>,
) -> String
where
    K: NodeKey + Display,
    F: TraversalFilter<K, V>,
    L: Fn(&Node<K, V>) -> String,
{
    format!(
        "<select name=\"{}\">{}</select>",
        escape(name),
        render_to_string(tree, start, filter, options, RenderMode::Flat)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_value;
    use tree_engine::prelude::*;

    fn categories() -> Tree<u32, &'static str> {
        let mut tree = Tree::new();
        let books = tree.create(1, "Books");
        let fiction = tree.create(2, "Fiction");
        let crime = tree.create(3, "Crime");
        let music = tree.create(4, "Music");
        tree.append(NodeIndex::ROOT, books);
        tree.append(books, fiction);
        tree.append(fiction, crime);
        tree.append(NodeIndex::ROOT, music);
        tree
    }

    #[test]
    fn test_options_indented_by_depth() {
        let tree = categories();
        let mut options = SelectOptions::new(display_value);
        let mut filter = AcceptAll::with_selection([2]);
        let html = render_to_string(&tree, NodeIndex::ROOT, &mut filter, &mut options, RenderMode::Flat);
        insta::assert_snapshot!(html, @r#"<option value="1">Books</option><option value="2" selected>&nbsp;&nbsp;Fiction</option><option value="3">&nbsp;&nbsp;&nbsp;&nbsp;Crime</option><option value="4">Music</option>"#);
    }

    #[test]
    fn test_render_select_with_depth_limit() {
        let tree = categories();
        let mut options = SelectOptions::new(display_value).indent("-");
        let html = render_select("category", &tree, NodeIndex::ROOT, &mut MaxDepth::new(2), &mut options);
        insta::assert_snapshot!(html, @r#"<select name="category"><option value="1">Books</option><option value="2">-Fiction</option><option value="4">Music</option></select>"#);
    }
}
