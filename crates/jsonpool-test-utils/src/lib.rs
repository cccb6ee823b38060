//! Test utilities for jsonpool development.
//!
//! Provides a [`SpyingAllocator`] that records every call made through the
//! [`Allocator`] seam, [`to_value`] for comparing documents against
//! `serde_json::json!` literals, canned documents in [`fixtures`],
//! and [`init_tracing`] for tests that want to see pool events.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Once};

use jsonpool_arena::DefaultAllocator;
use jsonpool_core::Allocator;
use jsonpool_tree::{VariantRef, Visitor};
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// One call observed by a [`SpyingAllocator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocatorCall {
    Allocate { size: usize, granted: bool },
    Reallocate { from: usize, to: usize, granted: bool },
    Deallocate { size: usize },
}

/// Allocator that forwards to the heap and logs every call.
///
/// Can be told to refuse all further requests with
/// [`refuse_from_now_on`](SpyingAllocator::refuse_from_now_on), which is how
/// tests drive "allocator refused" paths at a precise point.
#[derive(Debug, Default)]
pub struct SpyingAllocator {
    log: Mutex<Vec<AllocatorCall>>,
    refusing: Mutex<bool>,
}

impl SpyingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh spy ready to hand to a document.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Refuse every request from now on.
    pub fn refuse_from_now_on(&self) {
        *self.refusing.lock() = true;
    }

    /// Grant requests again.
    pub fn grant_again(&self) {
        *self.refusing.lock() = false;
    }

    /// Calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<AllocatorCall> {
        self.log.lock().clone()
    }

    /// Bytes allocated and not yet released.
    pub fn outstanding(&self) -> usize {
        self.log.lock().iter().fold(0usize, |total, call| match *call {
            AllocatorCall::Allocate { size, granted: true } => total + size,
            AllocatorCall::Reallocate {
                from,
                to,
                granted: true,
            } => total + to - from,
            AllocatorCall::Deallocate { size } => total.saturating_sub(size),
            _ => total,
        })
    }

    fn record(&self, call: AllocatorCall) {
        self.log.lock().push(call);
    }

    fn refusing(&self) -> bool {
        *self.refusing.lock()
    }
}

impl Allocator for SpyingAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        let block = if self.refusing() {
            None
        } else {
            DefaultAllocator.allocate(size)
        };
        self.record(AllocatorCall::Allocate {
            size,
            granted: block.is_some(),
        });
        block
    }

    fn reallocate(&self, block: Box<[u8]>, size: usize) -> Result<Box<[u8]>, Box<[u8]>> {
        let from = block.len();
        let result = if self.refusing() {
            Err(block)
        } else {
            DefaultAllocator.reallocate(block, size)
        };
        self.record(AllocatorCall::Reallocate {
            from,
            to: size,
            granted: result.is_ok(),
        });
        result
    }

    fn deallocate(&self, block: Box<[u8]>) {
        self.record(AllocatorCall::Deallocate { size: block.len() });
    }
}

/// Convert a variant into a [`serde_json::Value`] for assertions.
///
/// Integers and floats stay distinct, so `1.0` and `1` compare unequal.
/// Non-finite floats have no JSON form and become `null`.
pub fn to_value(value: VariantRef<'_>) -> Value {
    let mut builder = ValueBuilder::default();
    value.accept(&mut builder);
    builder.done.unwrap_or(Value::Null)
}

#[derive(Default)]
struct ValueBuilder {
    open: Vec<Frame>,
    done: Option<Value>,
}

enum Frame {
    Array(Vec<Value>),
    Object(Map<String, Value>, Option<String>),
}

impl ValueBuilder {
    fn emit(&mut self, value: Value) {
        match self.open.last_mut() {
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object(map, key)) => {
                if let Some(key) = key.take() {
                    map.insert(key, value);
                }
            }
            None => self.done = Some(value),
        }
    }

    fn close(&mut self) {
        let value = match self.open.pop() {
            Some(Frame::Array(items)) => Value::Array(items),
            Some(Frame::Object(map, _)) => Value::Object(map),
            None => return,
        };
        self.emit(value);
    }
}

impl Visitor for ValueBuilder {
    fn visit_null(&mut self) {
        self.emit(Value::Null);
    }

    fn visit_bool(&mut self, value: bool) {
        self.emit(Value::Bool(value));
    }

    fn visit_signed(&mut self, value: i64) {
        self.emit(Value::from(value));
    }

    fn visit_unsigned(&mut self, value: u64) {
        self.emit(Value::from(value));
    }

    fn visit_float(&mut self, value: f64) {
        self.emit(Value::from(value));
    }

    fn visit_str(&mut self, value: &str) {
        self.emit(Value::String(value.to_owned()));
    }

    fn begin_array(&mut self, len: usize) {
        self.open.push(Frame::Array(Vec::with_capacity(len)));
    }

    fn end_array(&mut self) {
        self.close();
    }

    fn begin_object(&mut self, _len: usize) {
        self.open.push(Frame::Object(Map::new(), None));
    }

    fn visit_key(&mut self, key: &str) {
        if let Some(Frame::Object(_, pending)) = self.open.last_mut() {
            *pending = Some(key.to_owned());
        }
    }

    fn end_object(&mut self) {
        self.close();
    }
}

static TRACING: Once = Once::new();

/// Install a `RUST_LOG`-driven fmt subscriber for the test binary.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonpool_document::Document;
    use serde_json::json;

    #[test]
    fn spy_records_document_lifecycle() {
        let spy = SpyingAllocator::shared();
        {
            let mut doc = Document::with_allocator(64, spy.clone());
            doc.add_value(1);
            let _ = doc.shrink_to_fit();
        }
        assert_eq!(
            spy.calls(),
            vec![
                AllocatorCall::Allocate {
                    size: 64,
                    granted: true
                },
                AllocatorCall::Reallocate {
                    from: 64,
                    to: 16,
                    granted: true
                },
                AllocatorCall::Deallocate { size: 16 },
            ]
        );
        assert_eq!(spy.outstanding(), 0);
    }

    #[test]
    fn refusing_spy_yields_empty_pool() {
        let spy = SpyingAllocator::shared();
        spy.refuse_from_now_on();
        let doc = Document::with_allocator(64, spy.clone());
        assert_eq!(doc.capacity(), 0);
        spy.grant_again();
        assert_eq!(
            spy.calls(),
            vec![AllocatorCall::Allocate {
                size: 64,
                granted: false
            }]
        );
    }

    #[test]
    fn value_builder_output() {
        let mut doc = Document::new(256);
        doc.member("a").add_value(1);
        doc.member("a").add_value(-2);
        doc.member("a").add_value(0.5);
        doc.member("s").set("q\"x");
        doc.member("n").set(None::<i32>);
        doc.member("e").to_object();
        assert_eq!(
            to_value(doc.as_variant()),
            json!({"a": [1, -2, 0.5], "s": "q\"x", "n": null, "e": {}})
        );
    }

    #[test]
    fn floats_stay_distinct_from_integers() {
        let mut floats = Document::new(64);
        floats.add_value(1.0f64);
        floats.add_value(f64::NAN);
        let mut ints = Document::new(64);
        ints.add_value(1i32);
        ints.add_value(u64::MAX);

        assert_eq!(to_value(floats.as_variant()), json!([1.0, null]));
        assert_eq!(to_value(ints.as_variant()), json!([1, u64::MAX]));
        assert_ne!(to_value(floats.at(0)), to_value(ints.at(0)));
    }

    #[test]
    fn scalar_and_empty_roots() {
        assert_eq!(to_value(Document::new(0).as_variant()), Value::Null);
        let mut doc = Document::new(16);
        doc.set(false);
        assert_eq!(to_value(doc.as_variant()), json!(false));
        doc.to_array();
        assert_eq!(to_value(doc.as_variant()), json!([]));
    }
}
