//! Integration tests: documents nested far deeper than the call stack allows
//! for per-level recursion.

use jsonpool_arena::SLOT_SIZE;
use jsonpool_document::Document;
use jsonpool_tree::Visitor;

const DEPTH: usize = 100_000;

/// `[[[ ... [null] ... ]]]` with `depth` arrays, in a pool with `spare`
/// bytes left over.
fn nested_arrays_with_spare(depth: usize, spare: usize) -> Document {
    let mut doc = Document::new(depth * SLOT_SIZE + spare);
    let mut cursor = doc.to_array();
    for _ in 0..depth {
        cursor = cursor.add();
    }
    doc
}

fn nested_arrays(depth: usize) -> Document {
    nested_arrays_with_spare(depth, 0)
}

/// Counts containers and leaves without keeping the values.
#[derive(Default)]
struct Census {
    arrays_open: usize,
    arrays_closed: usize,
    nulls: usize,
}

impl Visitor for Census {
    fn visit_null(&mut self) {
        self.nulls += 1;
    }
    fn visit_bool(&mut self, _: bool) {}
    fn visit_signed(&mut self, _: i64) {}
    fn visit_unsigned(&mut self, _: u64) {}
    fn visit_float(&mut self, _: f64) {}
    fn visit_str(&mut self, _: &str) {}
    fn begin_array(&mut self, _: usize) {
        self.arrays_open += 1;
    }
    fn end_array(&mut self) {
        self.arrays_closed += 1;
    }
    fn begin_object(&mut self, _: usize) {}
    fn visit_key(&mut self, _: &str) {}
    fn end_object(&mut self) {}
}

#[test]
fn deep_document_reports_nesting_and_usage() {
    let doc = nested_arrays(DEPTH);
    assert!(!doc.overflowed());
    assert_eq!(doc.nesting(), DEPTH);
    assert_eq!(doc.memory_usage(), DEPTH * SLOT_SIZE);
    assert_eq!(doc.as_variant().memory_usage(), DEPTH * SLOT_SIZE);

    let mut census = Census::default();
    doc.as_variant().accept(&mut census);
    assert_eq!(census.arrays_open, DEPTH);
    assert_eq!(census.arrays_closed, DEPTH);
    assert_eq!(census.nulls, 1);
}

#[test]
fn deep_document_copies_and_compares() {
    let doc = nested_arrays(DEPTH);
    let copy = doc.clone();
    assert!(!copy.overflowed());
    assert_eq!(copy, doc);
    assert_eq!(copy.nesting(), DEPTH);

    let mut other = nested_arrays(DEPTH);
    let mut cursor = other.root_mut();
    for _ in 0..DEPTH - 1 {
        cursor = cursor.element(0);
    }
    cursor.element(0).set(1);
    assert_ne!(other, doc);
}

#[test]
fn deep_document_compacts_both_ways() {
    let mut doc = nested_arrays_with_spare(DEPTH, 64);
    assert!(doc.add_value("orphan"));
    doc.remove(1);
    assert_eq!(doc.memory_usage(), (DEPTH + 1) * SLOT_SIZE + "orphan".len());

    let mut collected = doc.clone();
    assert!(collected.garbage_collect());
    assert_eq!(collected.nesting(), DEPTH);
    assert_eq!(collected.memory_usage(), DEPTH * SLOT_SIZE);

    let relocation = doc.shrink_to_fit();
    assert_eq!(relocation.slots_after, DEPTH);
    assert_eq!(doc.capacity(), DEPTH * SLOT_SIZE);
    assert_eq!(doc, collected);

    let rebuilt = Document::from_value(doc.as_variant(), doc.allocator().clone());
    assert_eq!(rebuilt.capacity(), DEPTH * SLOT_SIZE);
    assert_eq!(rebuilt, nested_arrays(DEPTH));
}

#[test]
fn deep_document_debug_output_is_balanced() {
    let doc = nested_arrays(1_000);
    let text = format!("{:?}", doc.as_variant());
    assert_eq!(text.len(), 2 * 1_000 + "null".len());
    assert!(text.starts_with("[[") && text.ends_with("null]]"));

    let doc = nested_arrays(DEPTH);
    let text = format!("{:?}", doc.as_variant());
    assert_eq!(text.matches('[').count(), DEPTH);
    assert_eq!(text.matches(']').count(), DEPTH);
}
