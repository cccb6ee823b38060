//! Free list of node slots awaiting reuse.
//!
//! Slots are all the same size, so reuse is exact: any freed slot can serve
//! any later node allocation. The list is LIFO so the most recently freed
//! (and most likely still cached) slot is handed out first.

use jsonpool_core::SlotId;

/// Stack of slots returned by `free_node` and not yet reallocated.
///
/// A per-slot flag mirrors the stack so membership checks do not scan it.
#[derive(Clone, Debug, Default)]
pub struct FreeList {
    slots: Vec<SlotId>,
    listed: Vec<bool>,
}

impl FreeList {
    /// Create an empty free list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a slot to the list.
    ///
    /// Returns `false` (and leaves the list unchanged) if the slot is
    /// already listed; freeing twice must not hand the slot out twice.
    pub fn push(&mut self, slot: SlotId) -> bool {
        let index = slot.index();
        if index >= self.listed.len() {
            self.listed.resize(index + 1, false);
        } else if self.listed[index] {
            return false;
        }
        self.listed[index] = true;
        self.slots.push(slot);
        true
    }

    /// Take the most recently freed slot.
    pub fn pop(&mut self) -> Option<SlotId> {
        let slot = self.slots.pop()?;
        if let Some(flag) = self.listed.get_mut(slot.index()) {
            *flag = false;
        }
        Some(slot)
    }

    /// Whether `slot` is currently free.
    pub fn contains(&self, slot: SlotId) -> bool {
        self.listed.get(slot.index()).copied().unwrap_or(false)
    }

    /// Number of slots available for reuse.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is available for reuse.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forget every free slot (the slot table is being reset or rebuilt).
    pub fn clear(&mut self) {
        self.slots.clear();
        self.listed.clear();
    }
}
