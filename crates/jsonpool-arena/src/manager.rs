//! The resource manager: one pool, one allocator, one overflow flag.
//!
//! [`ResourceManager`] is the arena a document owns. It hands out node
//! slots and owned strings, tracks how many bytes of its capacity they
//! consume, and records exhaustion in a sticky overflow flag. Capacity
//! changes only through [`ResourceManager::reallocate`] (explicit growth or
//! trimming, content preserved) and [`ResourceManager::shrink_to_fit`]
//! (compaction from a root).

use std::fmt;
use std::sync::Arc;

use jsonpool_core::{Allocator, ConfigError, PoolError, PoolNode, SlotId, StringId};
use tracing::{debug, trace, warn};

use crate::buffer::PoolBuffer;
use crate::config::{PoolConfig, SLOT_SIZE};
use crate::free_list::FreeList;
use crate::relocation::{Compactor, Relocation};

/// Arena of node slots and string bytes under a single byte budget.
///
/// # Accounting
///
/// `size()` is the high-water mark: string bytes written plus
/// `SLOT_SIZE` for every slot ever carved, including slots sitting on the
/// free list or orphaned by a removal. `size() <= capacity()` always holds.
///
/// Only the string region comes from the [`Allocator`]: the whole
/// `capacity` is requested as one block, and slot charges are carved from
/// it without being stored there. The slot table is an ordinary `Vec` on
/// the global heap, so an allocator such as
/// [`BoundedAllocator`](crate::BoundedAllocator) bounds the blocks it
/// hands out but not the slot storage that sits beside them.
///
/// # Overflow
///
/// Any allocation that cannot be satisfied sets the overflow flag. The flag
/// survives later successful allocations and is cleared only by
/// [`ResourceManager::clear`] or by growing the pool.
pub struct ResourceManager<N> {
    /// Source of the backing block; receives it back on drop.
    allocator: Arc<dyn Allocator>,
    /// Backing block and owned string region.
    buffer: PoolBuffer,
    /// Slot table. Handles are indices into this vec.
    slots: Vec<N>,
    /// Slots returned for eager reuse.
    free_list: FreeList,
    /// Sticky exhaustion flag.
    overflowed: bool,
}

impl<N: PoolNode> ResourceManager<N> {
    /// Create a pool of `capacity` bytes backed by `allocator`.
    ///
    /// A zero capacity, or a refusal from the allocator, yields a pool
    /// without a backing block: every later allocation overflows.
    pub fn new(capacity: usize, allocator: Arc<dyn Allocator>) -> Self {
        let buffer = Self::obtain(allocator.as_ref(), capacity);
        Self {
            allocator,
            buffer,
            slots: Vec::new(),
            free_list: FreeList::new(),
            overflowed: false,
        }
    }

    /// Validate `config`, then create a pool from it.
    pub fn from_config(
        config: &PoolConfig,
        allocator: Arc<dyn Allocator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.capacity, allocator))
    }

    fn obtain(allocator: &dyn Allocator, capacity: usize) -> PoolBuffer {
        if capacity == 0 {
            return PoolBuffer::empty();
        }
        match allocator.allocate(capacity) {
            Some(block) => {
                debug!(capacity, "pool buffer allocated");
                PoolBuffer::from_block(block)
            }
            None => {
                warn!(capacity, "allocator refused pool buffer");
                PoolBuffer::empty()
            }
        }
    }

    /// The allocator backing this pool.
    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        &self.allocator
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Bytes in use (high-water mark of slots plus string bytes).
    pub fn size(&self) -> usize {
        self.buffer.used() + self.slot_bytes()
    }

    /// Bytes not yet carved out of the capacity.
    pub fn available(&self) -> usize {
        self.capacity().saturating_sub(self.size())
    }

    /// Whether an allocation has failed since the last clear or growth.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Slots carved so far, including free and orphaned ones.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots waiting on the free list.
    pub fn free_slots(&self) -> usize {
        self.free_list.len()
    }

    fn slot_bytes(&self) -> usize {
        self.slots.len() * SLOT_SIZE
    }

    /// Allocate a node slot initialised to `N::default()`.
    ///
    /// Reuses the most recently freed slot if there is one, otherwise
    /// carves a new slot from untouched capacity.
    pub fn allocate_node(&mut self) -> Result<SlotId, PoolError> {
        if let Some(id) = self.free_list.pop() {
            self.slots[id.index()] = N::default();
            trace!(slot = %id, "reused free slot");
            return Ok(id);
        }
        if self.available() < SLOT_SIZE {
            return Err(self.overflow(SLOT_SIZE));
        }
        let id = SlotId(self.slots.len() as u32);
        self.slots.push(N::default());
        Ok(id)
    }

    /// Copy `value` into the string region.
    ///
    /// Every call allocates fresh storage; equal strings are not shared.
    pub fn allocate_string(&mut self, value: &str) -> Result<StringId, PoolError> {
        let reserved = self.slot_bytes();
        match self.buffer.alloc(value.as_bytes(), reserved) {
            Some(id) => Ok(id),
            None => Err(self.overflow(value.len())),
        }
    }

    /// Return a slot to the free list.
    ///
    /// The slot is reset to `N::default()`. The high-water mark does not
    /// move, so `size()` is unchanged. Freeing an unknown or already free
    /// slot is ignored.
    pub fn free_node(&mut self, id: SlotId) {
        if id.index() >= self.slots.len() || !self.free_list.push(id) {
            return;
        }
        self.slots[id.index()] = N::default();
        trace!(slot = %id, "slot freed");
    }

    /// Borrow a slot.
    pub fn node(&self, id: SlotId) -> Option<&N> {
        self.slots.get(id.index())
    }

    /// Mutably borrow a slot.
    pub fn node_mut(&mut self, id: SlotId) -> Option<&mut N> {
        self.slots.get_mut(id.index())
    }

    /// Read back an owned string.
    pub fn string(&self, id: StringId) -> Option<&str> {
        self.buffer
            .get(id)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Forget all content, keeping the backing block.
    ///
    /// Usage drops to zero and the overflow flag is cleared; capacity is
    /// unchanged.
    pub fn clear(&mut self) {
        self.buffer.reset();
        self.slots.clear();
        self.free_list.clear();
        self.overflowed = false;
    }

    /// Resize the pool to exactly `capacity` bytes, keeping all content.
    ///
    /// Handles stay valid: slots keep their indices and strings their
    /// offsets. Growing clears the overflow flag. Fails without changing
    /// anything if `capacity` is below `size()` or the allocator refuses.
    pub fn reallocate(&mut self, capacity: usize) -> Result<(), PoolError> {
        let old = self.capacity();
        if capacity == old {
            return Ok(());
        }
        let used = self.size();
        if capacity < used {
            return Err(PoolError::ShrinkBelowUsage {
                requested: capacity,
                used,
            });
        }
        match self.resize_block(capacity) {
            Ok(()) => {
                if capacity > old {
                    self.overflowed = false;
                }
                debug!(from = old, to = capacity, "pool reallocated");
                Ok(())
            }
            Err(err) => {
                warn!(from = old, to = capacity, "allocator refused pool reallocation");
                Err(err)
            }
        }
    }

    /// Swap the backing block for one of `capacity` bytes, preserving the
    /// written string prefix. On refusal the old block is kept.
    fn resize_block(&mut self, capacity: usize) -> Result<(), PoolError> {
        let cursor = self.buffer.used();
        let outcome = match self.buffer.take_block() {
            None if capacity == 0 => Ok(None),
            None => self.allocator.allocate(capacity).map(Some).ok_or(None),
            Some(block) if capacity == 0 => {
                self.allocator.deallocate(block);
                Ok(None)
            }
            Some(block) => self
                .allocator
                .reallocate(block, capacity)
                .map(Some)
                .map_err(Some),
        };
        match outcome {
            Ok(block) => {
                self.buffer.install(block, cursor);
                Ok(())
            }
            Err(original) => {
                self.buffer.install(original, cursor);
                Err(PoolError::AllocatorRefused {
                    requested: capacity,
                })
            }
        }
    }

    /// Compact the pool around `root` and trim capacity to the result.
    ///
    /// Every slot and string reachable from `root` is packed into a dense
    /// layout in depth-first order; `root`'s own handles are rewritten in
    /// place. Unreachable slots (removed subtrees, free slots) are dropped.
    /// Any handle into this pool held elsewhere is invalidated.
    ///
    /// If the allocator refuses to trim the block, content is still
    /// compacted but capacity stays where it was. The overflow flag is
    /// left untouched.
    pub fn shrink_to_fit(&mut self, root: &mut N) -> Relocation {
        let slots_before = self.slots.len();
        let capacity_before = self.capacity();

        let (slots, strings) = Compactor::new(&self.slots, self.buffer.written()).run(root);
        let capacity = strings.len() + slots.len() * SLOT_SIZE;
        self.slots = slots;
        self.free_list.clear();
        self.buffer.overwrite(&strings);

        if capacity != capacity_before && self.resize_block(capacity).is_err() {
            warn!(
                from = capacity_before,
                to = capacity,
                "allocator refused to trim pool; capacity kept"
            );
        }

        let relocation = Relocation {
            slots_before,
            slots_after: self.slots.len(),
            capacity_before,
            capacity_after: self.capacity(),
        };
        debug!(
            slots_before,
            slots_after = relocation.slots_after,
            reclaimed = relocation.bytes_reclaimed(),
            "pool shrunk to fit"
        );
        relocation
    }

    /// Move the pool out, leaving an empty zero-capacity pool that shares
    /// the same allocator.
    pub fn take(&mut self) -> Self {
        let empty = Self::new(0, Arc::clone(&self.allocator));
        std::mem::replace(self, empty)
    }

    fn overflow(&mut self, requested: usize) -> PoolError {
        let available = self.available();
        if self.overflowed {
            trace!(requested, available, "allocation failed (already overflowed)");
        } else {
            debug!(
                requested,
                available,
                capacity = self.capacity(),
                "pool overflowed"
            );
            self.overflowed = true;
        }
        PoolError::CapacityExceeded {
            requested,
            available,
        }
    }
}

impl<N> Drop for ResourceManager<N> {
    fn drop(&mut self) {
        if let Some(block) = self.buffer.take_block() {
            self.allocator.deallocate(block);
        }
    }
}

impl<N> fmt::Debug for ResourceManager<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("capacity", &self.buffer.capacity())
            .field("string_bytes", &self.buffer.used())
            .field("slots", &self.slots.len())
            .field("free_slots", &self.free_list.len())
            .field("overflowed", &self.overflowed)
            .finish()
    }
}
