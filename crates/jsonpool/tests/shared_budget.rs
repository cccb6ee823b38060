//! Documents sharing one bounded allocator, driven through the facade.

use std::sync::Arc;

use jsonpool::prelude::*;
use jsonpool_test_utils::to_value;
use serde_json::json;

#[test]
fn documents_compete_for_a_bounded_heap() {
    let heap = BoundedAllocator::shared(512);
    let mut first = Document::with_allocator(384, heap.clone());
    let second = Document::with_allocator(256, heap.clone());
    assert_eq!(first.capacity(), 384);
    assert_eq!(second.capacity(), 0);
    assert_eq!(heap.in_use(), 384);

    first.member("k").set("v");
    let _ = first.shrink_to_fit();
    assert_eq!(heap.in_use(), first.capacity());

    let third = Document::with_allocator(256, heap.clone());
    assert_eq!(third.capacity(), 256);
    drop(first);
    drop(third);
    assert_eq!(heap.in_use(), 0);
}

#[test]
fn clone_under_pressure_is_empty_but_valid() {
    let heap = BoundedAllocator::shared(300);
    let mut doc = Document::with_allocator(200, heap.clone());
    doc.member("a").add_value(1);
    let copy = doc.clone();
    assert_eq!(copy.capacity(), 0);
    assert!(copy.overflowed());
    assert!(!doc.garbage_collect());
    assert_eq!(doc.get("a").at(0), 1);
}

#[test]
fn config_validation_guards_construction() {
    let allocator: Arc<dyn Allocator> = DefaultAllocator::instance();
    let too_big = PoolConfig::new(PoolConfig::MAX_CAPACITY + 1);
    assert!(matches!(
        Document::from_config(&too_big, allocator.clone()),
        Err(ConfigError::CapacityTooLarge { .. })
    ));
    let doc = Document::from_config(&PoolConfig::default(), allocator)
        .expect("default config is valid");
    assert_eq!(doc.capacity(), 0);
}

#[test]
fn prelude_covers_read_write_round_trip() {
    let mut doc = Document::new(256);
    {
        let mut root = doc.to_object();
        root.reborrow().member("id").set(7u64);
        let mut list = root.member("list");
        list.add_value(JsonString::linked("static"));
        list.add_value(-1i8);
    }
    let view: VariantRef<'_> = doc.as_variant();
    assert_eq!(view.kind(), Some(VariantKind::Object));
    assert_eq!(view.get("id").kind(), Some(VariantKind::UnsignedInteger));
    assert_eq!(to_value(view), json!({"id": 7, "list": ["static", -1]}));
}
