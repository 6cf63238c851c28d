//! CLI example that loads a JSON edge list and renders it as HTML
//!
//! Usage:
//!   cargo run --example outline [path] [label-field] [max-depth]
//!
//! The file must hold a JSON array of records with numeric `node_id`,
//! `parent_id`, `leftmostchild` and `rightsibling` fields. Without a path a small
//! built-in outline is used. A negative depth means no limit.
//!
//! Set `RUST_LOG=trace` to watch the tree being rebuilt.

use std::env;

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;
use tree_engine::prelude::*;
use tree_engine::records::{build_from_records, read_records, FieldMap, Record};
use tree_markup::prelude::*;

const DEMO: &str = r#"[
    { "node_id": 1, "parent_id": null, "leftmostchild": 2, "rightsibling": 4, "title": "Getting started" },
    { "node_id": 2, "parent_id": 1, "leftmostchild": null, "rightsibling": 3, "title": "Install" },
    { "node_id": 3, "parent_id": 1, "leftmostchild": null, "rightsibling": null, "title": "First steps" },
    { "node_id": 4, "parent_id": null, "leftmostchild": 5, "rightsibling": null, "title": "Reference" },
    { "node_id": 5, "parent_id": 4, "leftmostchild": 6, "rightsibling": null, "title": "Filters" },
    { "node_id": 6, "parent_id": 5, "leftmostchild": null, "rightsibling": null, "title": "Chains & predicates" }
]"#;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let records: Vec<Record> = match args.get(1) {
        Some(path) => read_records(path)?,
        None => serde_json::from_str(DEMO).context("Built-in outline is not valid JSON")?,
    };
    let label_field = args.get(2).map(String::as_str).unwrap_or("title").to_string();
    let max_depth = match args.get(3) {
        Some(depth) => depth.parse::<i64>().with_context(|| format!("Invalid depth: {}", depth))?,
        None => -1,
    };

    info!("Loaded {} records", records.len());
    let tree: Tree<u64, Record> =
        build_from_records(records, &FieldMap::default(), |row| Node::with_value(row.node_id, row.payload))?;
    info!("Rebuilt tree with {} nodes", tree.len() - 1);

    let label = move |node: &Node<u64, Record>| match node.value().and_then(|record| record.get(&label_field)) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    let mut filter = MaxDepth::from_signed(max_depth);
    let mut list = NestedList::new(&label);
    println!(
        "{}",
        render_to_string(&tree, tree.root(), &mut filter, &mut list, RenderMode::Folded)
    );

    let mut options = SelectOptions::new(&label);
    println!("{}", render_select("node", &tree, tree.root(), &mut filter, &mut options));

    Ok(())
}
