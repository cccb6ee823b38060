//! Benchmark profiles for the jsonpool document engine.
//!
//! Provides pre-built documents sized for benchmarking:
//!
//! - [`telemetry_profile`]: a flat object of mixed scalars and strings
//! - [`table_profile`]: an array of uniform record objects
//! - [`churned_profile`]: a table with every other record removed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use jsonpool_document::Document;
use jsonpool_tree::JsonString;

/// Field names shared by every record in [`table_profile`].
pub const RECORD_FIELDS: [&str; 4] = ["id", "name", "score", "active"];

/// Exact pool size needed for a profile, measured on a generous pool.
pub fn required_capacity(build: impl Fn(usize) -> Document) -> usize {
    build(usize::from(u16::MAX)).memory_usage()
}

/// A flat object with `fields` members: integers, floats and short strings.
///
/// Keys are copied into the pool; values cycle through the scalar kinds.
pub fn telemetry_profile(capacity: usize, fields: usize) -> Document {
    let mut doc = Document::new(capacity);
    doc.to_object();
    for i in 0..fields {
        let key = format!("sensor_{i}");
        let mut member = doc.member(&key);
        match i % 3 {
            0 => member.set(i as i64),
            1 => member.set(i as f64 * 0.25),
            _ => member.set(format!("ok-{i}")),
        };
    }
    doc
}

/// An array of `rows` records, each an object over [`RECORD_FIELDS`].
///
/// Keys are linked, so only the record names consume string bytes.
pub fn table_profile(capacity: usize, rows: usize) -> Document {
    let mut doc = Document::new(capacity);
    doc.to_array();
    for row in 0..rows {
        let mut record = doc.create_nested_object();
        record
            .reborrow()
            .member(JsonString::linked(RECORD_FIELDS[0]))
            .set(row as u32);
        record
            .reborrow()
            .member(JsonString::linked(RECORD_FIELDS[1]))
            .set(format!("user-{row}"));
        record
            .reborrow()
            .member(JsonString::linked(RECORD_FIELDS[2]))
            .set(row as f64 / 7.0);
        record
            .member(JsonString::linked(RECORD_FIELDS[3]))
            .set(row % 2 == 0);
    }
    doc
}

/// [`table_profile`] with every odd record removed, leaving orphans behind.
pub fn churned_profile(capacity: usize, rows: usize) -> Document {
    let mut doc = table_profile(capacity, rows);
    let mut index = 1;
    while index < doc.size() {
        doc.remove(index);
        index += 1;
    }
    doc
}
