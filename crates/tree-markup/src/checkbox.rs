//! Nested lists of labelled checkboxes

use std::fmt::Display;

use tree_engine::{Node, NodeKey, RenderMode, RenderVisitor, Visit};

use crate::escape::escape;

/// Renders each node as a labelled checkbox inside an `<li>`
///
/// Meant for [`RenderMode::Folded`]. Every checkbox posts under `name[]`
/// with the node id as its value; selected nodes are `checked`.
pub struct CheckboxList<L> {
    name: String,
    label: L,
}

impl<L> CheckboxList<L> {
    pub fn new(name: impl Into<String>, label: L) -> Self {
        Self {
            name: name.into(),
            label,
        }
    }
}

impl<K, V, L> RenderVisitor<K, V> for CheckboxList<L>
where
    K: NodeKey + Display,
    L: Fn(&Node<K, V>) -> String,
{
    fn open_fold(&mut self, _visit: &Visit<'_, K, V>) -> String {
        "<ul>".to_string()
    }

    fn close_fold(&mut self, _visit: &Visit<'_, K, V>) -> String {
        "</ul>".to_string()
    }

    fn open_node(&mut self, _visit: &Visit<'_, K, V>) -> String {
        "<li>".to_string()
    }

    fn close_node(&mut self, _visit: &Visit<'_, K, V>) -> String {
        "</li>".to_string()
    }

    fn render_node(&mut self, visit: &Visit<'_, K, V>, _mode: RenderMode) -> String {
        let value = visit.node.id().map(ToString::to_string).unwrap_or_default();
        let checked = if visit.is_selected() { " checked" } else { "" };
        format!(
            "<label><input type=\"checkbox\" name=\"{}[]\" value=\"{}\"{}> {}</label>",
            escape(&self.name),
            escape(&value),
            checked,
            escape(&(self.label)(visit.node))
        )
    }
}
