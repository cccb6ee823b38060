//! The document: one pool, one root, value semantics.

use std::fmt;
use std::sync::Arc;

use jsonpool_arena::{DefaultAllocator, PoolConfig, Relocation};
use jsonpool_core::{Allocator, ConfigError};
use jsonpool_tree::{
    FromVariant, IntoVariant, JsonString, NodeId, Resources, Slot, Tree, VariantMut, VariantRef,
};
use tracing::debug;

/// A JSON document held in a fixed-capacity pool.
///
/// The root value lives inline in the document; everything below it lives
/// in the pool. A document is in one of three states:
///
/// - **Empty**: null root, nothing allocated (after construction, `clear`,
///   or being moved out of).
/// - **Populated**: the root holds a value.
/// - **Overflowed**: some mutation did not fit. The document stays usable;
///   the mutation that failed simply did not happen.
///
/// # Reclaiming space
///
/// Removing an element or member only unlinks it; its slots stay counted in
/// [`memory_usage`](Document::memory_usage). Two operations get them back:
/// [`shrink_to_fit`](Document::shrink_to_fit) compacts in place and trims
/// capacity, and [`garbage_collect`](Document::garbage_collect) rebuilds the
/// document from a deep copy at the same capacity.
///
/// # Example
///
/// ```
/// use jsonpool_document::Document;
///
/// let mut doc = Document::new(200);
/// doc.member("name").set("Alice");
/// doc.member("age").set(30);
/// doc.member("tags").add_value("x");
/// doc.member("tags").add_value("y");
///
/// assert_eq!(doc.get("name").as_::<&str>(), "Alice");
/// assert_eq!(doc.get("age").as_::<i32>(), 30);
/// assert_eq!(doc.get("tags").size(), 2);
/// assert_eq!(doc.size(), 3);
/// assert!(!doc.overflowed());
/// ```
pub struct Document {
    pool: Resources,
    root: Slot,
}

impl Document {
    /// Create an empty document with a pool of `capacity` bytes from the
    /// process-wide default allocator.
    pub fn new(capacity: usize) -> Self {
        Self::with_allocator(capacity, DefaultAllocator::instance())
    }

    /// Create an empty document with a pool of `capacity` bytes from
    /// `allocator`.
    ///
    /// Never fails: if the allocator refuses, the document has zero
    /// capacity and every allocation overflows.
    pub fn with_allocator(capacity: usize, allocator: Arc<dyn Allocator>) -> Self {
        Self {
            pool: Resources::new(capacity, allocator),
            root: Slot::default(),
        }
    }

    /// Validate `config` and create an empty document from it.
    pub fn from_config(
        config: &PoolConfig,
        allocator: Arc<dyn Allocator>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: Resources::from_config(config, allocator)?,
            root: Slot::default(),
        })
    }

    /// Create a document holding a deep copy of `value`, sized to exactly
    /// the pool bytes the copy needs.
    pub fn from_value(value: VariantRef<'_>, allocator: Arc<dyn Allocator>) -> Self {
        let mut doc = Self::with_allocator(value.memory_usage(), allocator);
        doc.set(value);
        doc
    }

    /// The allocator backing this document's pool.
    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        self.pool.allocator()
    }

    /// Pool capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Pool bytes in use, including space held by removed values.
    pub fn memory_usage(&self) -> usize {
        self.pool.size()
    }

    /// Whether a mutation failed for lack of space.
    ///
    /// Sticky: stays set until the document is cleared, grown, or replaced
    /// by a move or a garbage collection.
    pub fn overflowed(&self) -> bool {
        self.pool.overflowed()
    }

    /// Depth of the root value (0 for scalars).
    pub fn nesting(&self) -> usize {
        self.as_variant().nesting()
    }

    /// Number of elements or members of the root.
    pub fn size(&self) -> usize {
        self.as_variant().size()
    }

    /// Whether the root is null.
    pub fn is_null(&self) -> bool {
        self.as_variant().is_null()
    }

    fn tree(&mut self) -> Tree<'_> {
        Tree::new(&mut self.root, &mut self.pool)
    }

    /// Read-only view of the root.
    pub fn as_variant(&self) -> VariantRef<'_> {
        VariantRef::of(&self.root, &self.pool)
    }

    /// Mutable view of the root.
    pub fn root_mut(&mut self) -> VariantMut<'_> {
        VariantMut::new(self.tree(), Some(NodeId::Root))
    }

    /// Convert the root to `T`, falling back to `T`'s default.
    pub fn as_<'a, T: FromVariant<'a>>(&'a self) -> T {
        self.as_variant().as_()
    }

    /// Whether the root is representable as `T`.
    pub fn is<'a, T: FromVariant<'a>>(&'a self) -> bool {
        self.as_variant().is::<T>()
    }

    /// Empty the document: null root, pool usage zero, overflow cleared.
    /// Capacity is kept.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.root = Slot::default();
    }

    /// Replace the root with `value`.
    ///
    /// Returns `false` if the value did not fit; the document is then
    /// overflowed and holds whatever part of the value was stored.
    pub fn set<T: IntoVariant>(&mut self, value: T) -> bool {
        self.clear();
        value.write_into(&mut self.tree(), NodeId::Root)
    }

    /// Replace the root with a deep copy of `other`'s root.
    pub fn set_document(&mut self, other: &Document) -> bool {
        self.set(other.as_variant())
    }

    /// Replace the root with `value`, first growing the pool if `value`
    /// needs more than the current capacity.
    pub fn assign(&mut self, value: VariantRef<'_>) -> bool {
        let required = value.memory_usage();
        if required > self.capacity() {
            self.clear();
            // A refused grow leaves the old capacity; `set` then overflows.
            let _ = self.pool.reallocate(required);
        }
        self.set(value)
    }

    /// Clear the document and return a view of its (null) root.
    pub fn to_variant(&mut self) -> VariantMut<'_> {
        self.clear();
        self.root_mut()
    }

    /// Clear the document, make the root an empty array, and return it.
    pub fn to_array(&mut self) -> VariantMut<'_> {
        let mut root = self.to_variant();
        root.to_array();
        root
    }

    /// Clear the document, make the root an empty object, and return it.
    pub fn to_object(&mut self) -> VariantMut<'_> {
        let mut root = self.to_variant();
        root.to_object();
        root
    }

    /// Append a null element to the root array and return it.
    pub fn add(&mut self) -> VariantMut<'_> {
        self.root_mut().add()
    }

    /// Append `value` to the root array.
    pub fn add_value<T: IntoVariant>(&mut self, value: T) -> bool {
        self.root_mut().add_value(value)
    }

    /// Append an empty array to the root array and return it.
    pub fn create_nested_array(&mut self) -> VariantMut<'_> {
        let mut child = self.add();
        child.to_array();
        child
    }

    /// Append an empty object to the root array and return it.
    pub fn create_nested_object(&mut self) -> VariantMut<'_> {
        let mut child = self.add();
        child.to_object();
        child
    }

    /// Set the root member `key` to an empty array and return it.
    pub fn create_nested_array_in<'s>(&mut self, key: impl Into<JsonString<'s>>) -> VariantMut<'_> {
        let mut child = self.member(key);
        child.to_array();
        child
    }

    /// Set the root member `key` to an empty object and return it.
    pub fn create_nested_object_in<'s>(
        &mut self,
        key: impl Into<JsonString<'s>>,
    ) -> VariantMut<'_> {
        let mut child = self.member(key);
        child.to_object();
        child
    }

    /// Unlink the element at `index` from the root array.
    ///
    /// The element's slots stay in use until the next
    /// [`shrink_to_fit`](Document::shrink_to_fit) or
    /// [`garbage_collect`](Document::garbage_collect).
    pub fn remove(&mut self, index: usize) {
        self.root_mut().remove(index);
    }

    /// Unlink the member `key` from the root object.
    ///
    /// The member's slots stay in use until the next compaction.
    pub fn remove_key(&mut self, key: &str) {
        self.root_mut().remove_key(key);
    }

    /// The root member `key`, or an unbound view. Never creates.
    pub fn get(&self, key: &str) -> VariantRef<'_> {
        self.as_variant().get(key)
    }

    /// The root element at `index`, or an unbound view. Never creates.
    pub fn at(&self, index: usize) -> VariantRef<'_> {
        self.as_variant().at(index)
    }

    /// The root member `key`, created as null if absent.
    pub fn member<'s>(&mut self, key: impl Into<JsonString<'s>>) -> VariantMut<'_> {
        self.root_mut().member(key)
    }

    /// The root element at `index`, padding the array with nulls if needed.
    pub fn element(&mut self, index: usize) -> VariantMut<'_> {
        self.root_mut().element(index)
    }

    /// Whether the root object has a member `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.as_variant().contains_key(key)
    }

    /// Compact the pool and trim capacity to the live content.
    ///
    /// Removed values are dropped. Any view taken before the call is
    /// invalidated (the borrow checker enforces this).
    pub fn shrink_to_fit(&mut self) -> Relocation {
        self.pool.shrink_to_fit(&mut self.root)
    }

    /// Rebuild the document from a deep copy, reclaiming space held by
    /// removed values.
    ///
    /// The copy uses the same capacity and allocator. Returns `false`, and
    /// changes nothing, if the copy got no pool (zero capacity, or the
    /// allocator refused a second buffer).
    pub fn garbage_collect(&mut self) -> bool {
        let mut copy = self.clone();
        if copy.capacity() == 0 {
            debug!(capacity = self.capacity(), "garbage collection skipped: no pool for the copy");
            return false;
        }
        let before = self.memory_usage();
        self.move_from(&mut copy);
        debug!(before, after = self.memory_usage(), "garbage collected");
        true
    }

    /// Move this document's content out, leaving it Empty with zero
    /// capacity and the same allocator.
    pub fn take(&mut self) -> Document {
        Document {
            pool: self.pool.take(),
            root: std::mem::take(&mut self.root),
        }
    }

    /// Replace this document with `other`'s content, leaving `other` Empty.
    ///
    /// This document's previous pool is released to its allocator.
    pub fn move_from(&mut self, other: &mut Document) {
        *self = other.take();
    }
}

impl Clone for Document {
    /// Deep copy into a new pool of the same capacity and allocator.
    fn clone(&self) -> Self {
        let mut copy = Self::with_allocator(self.capacity(), Arc::clone(self.allocator()));
        copy.set(self.as_variant());
        copy
    }

    /// Deep copy `source` into this document, growing the pool to
    /// `source`'s capacity first if it is smaller.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        if self.capacity() < source.capacity() {
            let _ = self.pool.reallocate(source.capacity());
        }
        self.set(source.as_variant());
    }
}

impl Default for Document {
    /// An Empty, zero-capacity document on the default allocator.
    fn default() -> Self {
        Self::new(0)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.as_variant() == other.as_variant()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.as_variant())
            .field("capacity", &self.capacity())
            .field("memory_usage", &self.memory_usage())
            .field("overflowed", &self.overflowed())
            .finish()
    }
}
