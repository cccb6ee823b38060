//! Seams between the arena and the layers around it.

use std::fmt;

use crate::id::{SlotId, StringId};

/// Source of backing memory for a pool.
///
/// Follows the conventional allocate / reallocate / deallocate contract:
/// a refusal is a normal outcome (`None`, or the untouched block handed back
/// in `Err` for `reallocate`), never a panic. Implementations must be
/// shareable because a single instance usually serves many documents.
pub trait Allocator: Send + Sync + fmt::Debug {
    /// Obtain a zeroed block of exactly `size` bytes.
    fn allocate(&self, size: usize) -> Option<Box<[u8]>>;

    /// Resize `block` to `size` bytes, preserving its common prefix.
    ///
    /// On refusal the original block is returned unchanged in `Err`.
    fn reallocate(&self, block: Box<[u8]>, size: usize) -> Result<Box<[u8]>, Box<[u8]>>;

    /// Release a block previously obtained from this allocator.
    fn deallocate(&self, block: Box<[u8]>);
}

/// A mutable reference to one pool handle held by a node.
#[derive(Debug)]
pub enum PoolRef<'a> {
    /// Link to another slot (first child, last child, or next sibling).
    Slot(&'a mut SlotId),
    /// An owned string stored in the pool (value or key).
    String(&'a mut StringId),
}

/// A node type the arena can store and relocate.
///
/// The arena knows nothing about tree layout; compaction walks the live
/// graph through [`PoolNode::visit_refs`] and rewrites each handle in place.
pub trait PoolNode: Clone + Default {
    /// Call `visit` once for every pool handle this node holds.
    fn visit_refs(&mut self, visit: &mut dyn FnMut(PoolRef<'_>));
}
