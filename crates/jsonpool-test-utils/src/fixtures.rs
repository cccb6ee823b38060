//! Canned documents shared by integration tests and benches.

use jsonpool_document::Document;
use jsonpool_tree::JsonString;

/// `{"name":"Alice","age":30,"tags":["x","y"]}` in a 200-byte pool.
pub fn person() -> Document {
    let mut doc = Document::new(200);
    doc.member("name").set("Alice");
    doc.member("age").set(30);
    doc.member("tags").add_value("x");
    doc.member("tags").add_value("y");
    doc
}

/// A root array of `count` owned strings `"item-0"`, `"item-1"`, ...
pub fn string_array(capacity: usize, count: usize) -> Document {
    let mut doc = Document::new(capacity);
    doc.to_array();
    for i in 0..count {
        doc.add_value(format!("item-{i}"));
    }
    doc
}

/// A root object with `width` members, each an array of `width` integers.
pub fn grid(capacity: usize, width: usize) -> Document {
    let mut doc = Document::new(capacity);
    doc.to_object();
    for row in 0..width {
        let key = format!("row{row}");
        let mut cells = doc.create_nested_array_in(&key);
        for col in 0..width {
            cells.add_value((row * width + col) as u32);
        }
    }
    doc
}

/// A sensor reading whose keys are linked rather than copied.
pub fn linked_reading(capacity: usize) -> Document {
    let mut doc = Document::new(capacity);
    doc.member(JsonString::linked("sensor"))
        .set(JsonString::linked("thermo-1"));
    doc.member(JsonString::linked("celsius")).set(21.5);
    doc
}
