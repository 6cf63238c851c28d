//! Untyped edge-list records, as stored in a table or a JSON document
//!
//! A record is a flat JSON object. Four of its fields carry the structure
//! (their names come from a [`FieldMap`]); every other field is payload.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::matrix::{self, Row};
use crate::node::{Node, NodeIndex, NodeKey};
use crate::tree::Tree;

/// A single untyped record
pub type Record = Map<String, Value>;

/// Names of the structural fields in a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub node_id: String,
    pub parent_id: String,
    pub leftmost_child: String,
    pub right_sibling: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            node_id: "node_id".to_string(),
            parent_id: "parent_id".to_string(),
            leftmost_child: "leftmostchild".to_string(),
            right_sibling: "rightsibling".to_string(),
        }
    }
}

impl FieldMap {
    /// Create a field map with the default names
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_id(mut self, name: impl Into<String>) -> Self {
        self.node_id = name.into();
        self
    }

    pub fn parent_id(mut self, name: impl Into<String>) -> Self {
        self.parent_id = name.into();
        self
    }

    pub fn leftmost_child(mut self, name: impl Into<String>) -> Self {
        self.leftmost_child = name.into();
        self
    }

    pub fn right_sibling(mut self, name: impl Into<String>) -> Self {
        self.right_sibling = name.into();
        self
    }
}

fn take_optional<K: DeserializeOwned>(record: &mut Record, field: &str) -> Result<Option<K>> {
    match record.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .with_context(|| format!("Invalid id in field '{}'", field)),
    }
}

/// Split a record into a typed row; the unmapped fields become the payload
pub fn from_record<K: DeserializeOwned>(mut record: Record, fields: &FieldMap) -> Result<Row<K, Record>> {
    let Some(node_id) = take_optional(&mut record, &fields.node_id)? else {
        bail!("Record has no '{}' field", fields.node_id);
    };
    let parent_id = take_optional(&mut record, &fields.parent_id)?;
    let leftmost_child = take_optional(&mut record, &fields.leftmost_child)?;
    let right_sibling = take_optional(&mut record, &fields.right_sibling)?;

    Ok(Row::new(node_id, parent_id, leftmost_child, right_sibling, record))
}

/// Merge a typed row back into a single record
pub fn to_record<K: Serialize>(row: Row<K, Record>, fields: &FieldMap) -> Result<Record> {
    let id_value = |id: Option<K>| -> Result<Value> {
        match id {
            Some(id) => serde_json::to_value(id).context("Failed to serialize node id"),
            None => Ok(Value::Null),
        }
    };

    let mut record = row.payload;
    record.insert(fields.node_id.clone(), id_value(Some(row.node_id))?);
    record.insert(fields.parent_id.clone(), id_value(row.parent_id)?);
    record.insert(fields.leftmost_child.clone(), id_value(row.leftmost_child)?);
    record.insert(fields.right_sibling.clone(), id_value(row.right_sibling)?);
    Ok(record)
}

/// Decode records and rebuild the tree they describe
pub fn build_from_records<K, V>(
    records: impl IntoIterator<Item = Record>,
    fields: &FieldMap,
    construct: impl FnMut(Row<K, Record>) -> Node<K, V>,
) -> Result<Tree<K, V>>
where
    K: NodeKey + DeserializeOwned,
{
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            from_record(record, fields).with_context(|| format!("Failed to decode record {}", position))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(matrix::build_from_matrix(rows, construct))
}

/// Flatten the descendants of `start` into records
pub fn to_records<K, V>(
    tree: &Tree<K, V>,
    start: NodeIndex,
    fields: &FieldMap,
    serialize: impl FnMut(Option<&V>) -> Record,
) -> Result<Vec<Record>>
where
    K: NodeKey + Serialize,
{
    matrix::normalize_with(tree, start, serialize)
        .into_iter()
        .map(|row| to_record(row, fields))
        .collect()
}

/// Read a JSON array of records from a file
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a JSON array of records", path.display()))
}
