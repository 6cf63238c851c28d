use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use tree_engine::prelude::*;

/// Keeps every warning emitted while rebuilding
struct Warnings(Mutex<Vec<String>>);

impl Log for Warnings {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.0.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static WARNINGS: Warnings = Warnings(Mutex::new(Vec::new()));

// One test per binary: the logger is process-wide
#[test]
fn test_malformed_rows_are_reported_as_warnings() {
    log::set_logger(&WARNINGS).unwrap();
    log::set_max_level(LevelFilter::Warn);

    // 1 points at a child that does not exist, 2 points back at 1
    let rows: Vec<Row<u32, Option<()>>> = [(1, None, Some(7), Some(2)), (2, None, None, Some(1))]
        .into_iter()
        .map(|(id, parent, child, sibling)| Row::new(id, parent, child, sibling, None))
        .collect();
    let tree = build_from_matrix(rows, from_row);
    assert_eq!(get_all_ids(&tree, NodeIndex::ROOT), vec![1, 2]);

    let warnings = WARNINGS.0.lock().unwrap();
    assert!(warnings.iter().any(|w| w.contains("Every top-level row has a right sibling")));
    assert!(warnings.iter().any(|w| w.starts_with("Reference to 7 ")));
    assert!(warnings.iter().any(|w| w.starts_with("Reference to 1 ")));
}
