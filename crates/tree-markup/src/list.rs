//! Nested `<ul>` / `<ol>` lists

use derive_more::Display;
use tree_engine::{Node, NodeKey, RenderMode, RenderVisitor, Visit};

use crate::escape::escape;

/// Which list element wraps each level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ListKind {
    #[default]
    #[display(fmt = "ul")]
    Unordered,
    #[display(fmt = "ol")]
    Ordered,
}

/// Renders each level as a list and each node as an `<li>`
///
/// Meant for [`RenderMode::Folded`]. Selected nodes get
/// `class="selected"`; the outermost list can carry a class of its own.
pub struct NestedList<L> {
    label: L,
    kind: ListKind,
    class: Option<String>,
}

impl<L> NestedList<L> {
    /// `<ul>` lists labelled by `label`
    pub fn new(label: L) -> Self {
        Self {
            label,
            kind: ListKind::Unordered,
            class: None,
        }
    }

    /// `<ol>` lists labelled by `label`
    pub fn ordered(label: L) -> Self {
        Self::new(label).kind(ListKind::Ordered)
    }

    pub fn kind(mut self, kind: ListKind) -> Self {
        self.kind = kind;
        self
    }

    /// Class attribute for the outermost list
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl<K, V, L> RenderVisitor<K, V> for NestedList<L>
where
    K: NodeKey,
    L: Fn(&Node<K, V>) -> String,
{
    fn open_fold(&mut self, visit: &Visit<'_, K, V>) -> String {
        match &self.class {
            Some(class) if visit.depth() == 0 => format!("<{} class=\"{}\">", self.kind, escape(class)),
            _ => format!("<{}>", self.kind),
        }
    }

    fn close_fold(&mut self, _visit: &Visit<'_, K, V>) -> String {
        format!("</{}>", self.kind)
    }

    fn open_node(&mut self, visit: &Visit<'_, K, V>) -> String {
        if visit.is_selected() {
            "<li class=\"selected\">".to_string()
        } else {
            "<li>".to_string()
        }
    }

    fn close_node(&mut self, _visit: &Visit<'_, K, V>) -> String {
        "</li>".to_string()
    }

    fn render_node(&mut self, visit: &Visit<'_, K, V>, _mode: RenderMode) -> String {
        escape(&(self.label)(visit.node)).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_value;
    use tree_engine::prelude::*;

    fn menu() -> Tree<u32, &'static str> {
        let mut tree = Tree::new();
        let home = tree.create(1, "Home");
        let shop = tree.create(2, "Shop");
        let tea = tree.create(3, "Tea & Coffee");
        tree.append(NodeIndex::ROOT, home);
        tree.append(NodeIndex::ROOT, shop);
        tree.append(shop, tea);
        tree
    }

    #[test]
    fn test_list_kind_tags() {
        assert_eq!(ListKind::default().to_string(), "ul");
        assert_eq!(ListKind::Ordered.to_string(), "ol");
    }

    #[test]
    fn test_nested_list() {
        let tree = menu();
        let mut list = NestedList::new(display_value);
        let html = render_to_string(&tree, NodeIndex::ROOT, &mut AcceptAll::new(), &mut list, RenderMode::Folded);
        insta::assert_snapshot!(html, @"<ul><li>Home</li><li>Shop<ul><li>Tea &amp; Coffee</li></ul></li></ul>");
    }

    #[test]
    fn test_ordered_list_with_class_and_selection() {
        let tree = menu();
        let mut list = NestedList::ordered(display_value).class("menu");
        let mut filter = AcceptAll::with_selection([3]);
        let html = render_to_string(&tree, NodeIndex::ROOT, &mut filter, &mut list, RenderMode::Folded);
        insta::assert_snapshot!(html, @r#"<ol class="menu"><li>Home</li><li>Shop<ol><li class="selected">Tea &amp; Coffee</li></ol></li></ol>"#);
    }
}
