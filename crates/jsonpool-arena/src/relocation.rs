//! Live-graph compaction.
//!
//! `Compactor` copies every slot and string reachable from a root node
//! into a fresh, densely packed layout and rewrites handles as it goes.
//! Traversal is depth-first with an explicit stack, so the resulting layout
//! depends only on the shape of the live tree: compacting an already
//! compacted pool reproduces it exactly.

use indexmap::IndexMap;
use jsonpool_core::{PoolNode, PoolRef, SlotId, StringId};
use smallvec::SmallVec;

/// Outcome of a compaction pass.
///
/// Handles held outside the pool (the document root) have already been
/// rewritten by the time this is returned; the descriptor is for callers
/// that track statistics or hold derived state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Relocation {
    /// Slots in the table before compaction (live, orphaned and free).
    pub slots_before: usize,
    /// Slots after compaction (live only).
    pub slots_after: usize,
    /// Pool capacity before compaction, in bytes.
    pub capacity_before: usize,
    /// Pool capacity after compaction, in bytes.
    pub capacity_after: usize,
}

impl Relocation {
    /// Bytes of capacity given back to the allocator.
    pub fn bytes_reclaimed(&self) -> usize {
        self.capacity_before.saturating_sub(self.capacity_after)
    }

    /// Whether compaction changed nothing.
    pub fn is_noop(&self) -> bool {
        self.slots_before == self.slots_after && self.capacity_before == self.capacity_after
    }
}

/// Copies the live graph out of an old slot table and string region.
pub(crate) struct Compactor<'a, N> {
    old_slots: &'a [N],
    old_strings: &'a [u8],
    /// Old slot index → new slot, filled as slots are first reached.
    slot_map: Vec<Option<SlotId>>,
    string_map: IndexMap<StringId, StringId>,
    new_slots: Vec<N>,
    new_strings: Vec<u8>,
    /// New slots whose own handles still point into the old layout.
    pending: SmallVec<[SlotId; 16]>,
}

impl<'a, N: PoolNode> Compactor<'a, N> {
    pub(crate) fn new(old_slots: &'a [N], old_strings: &'a [u8]) -> Self {
        Self {
            old_slots,
            old_strings,
            slot_map: vec![None; old_slots.len()],
            string_map: IndexMap::new(),
            new_slots: Vec::new(),
            new_strings: Vec::new(),
            pending: SmallVec::new(),
        }
    }

    /// Relocate everything reachable from `root`, rewriting its handles.
    pub(crate) fn run(mut self, root: &mut N) -> (Vec<N>, Vec<u8>) {
        self.relocate(root);
        while let Some(id) = self.pending.pop() {
            let mut node = std::mem::take(&mut self.new_slots[id.index()]);
            self.relocate(&mut node);
            self.new_slots[id.index()] = node;
        }
        (self.new_slots, self.new_strings)
    }

    fn relocate(&mut self, node: &mut N) {
        node.visit_refs(&mut |handle| match handle {
            PoolRef::Slot(id) => *id = self.map_slot(*id),
            PoolRef::String(id) => *id = self.map_string(*id),
        });
    }

    fn map_slot(&mut self, old: SlotId) -> SlotId {
        if let Some(Some(new)) = self.slot_map.get(old.index()) {
            return *new;
        }
        let new = SlotId(self.new_slots.len() as u32);
        let node = self.old_slots.get(old.index()).cloned().unwrap_or_default();
        self.new_slots.push(node);
        if let Some(entry) = self.slot_map.get_mut(old.index()) {
            *entry = Some(new);
        }
        self.pending.push(new);
        new
    }

    fn map_string(&mut self, old: StringId) -> StringId {
        if let Some(&new) = self.string_map.get(&old) {
            return new;
        }
        let bytes = self.old_strings.get(old.range()).unwrap_or_default();
        let new = StringId::new(self.new_strings.len() as u32, bytes.len() as u32);
        self.new_strings.extend_from_slice(bytes);
        self.string_map.insert(old, new);
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal linked node: a label and a link to the next node.
    #[derive(Clone, Debug, Default, PartialEq)]
    struct Link {
        next: Option<SlotId>,
        label: Option<StringId>,
    }

    impl PoolNode for Link {
        fn visit_refs(&mut self, visit: &mut dyn FnMut(PoolRef<'_>)) {
            if let Some(next) = self.next.as_mut() {
                visit(PoolRef::Slot(next));
            }
            if let Some(label) = self.label.as_mut() {
                visit(PoolRef::String(label));
            }
        }
    }

    #[test]
    fn unreachable_slots_are_dropped() {
        // 0 -> 2, slot 1 is an orphan.
        let slots = vec![
            Link {
                next: Some(SlotId(2)),
                label: Some(StringId::new(0, 3)),
            },
            Link {
                next: None,
                label: Some(StringId::new(3, 7)),
            },
            Link {
                next: None,
                label: Some(StringId::new(10, 2)),
            },
        ];
        let strings = b"onedroppedtw";
        let mut root = Link {
            next: Some(SlotId(0)),
            label: None,
        };
        let (new_slots, new_strings) = Compactor::new(&slots, strings).run(&mut root);
        assert_eq!(new_slots.len(), 2);
        assert_eq!(new_strings, b"onetw");
        assert_eq!(root.next, Some(SlotId(0)));
        assert_eq!(new_slots[0].next, Some(SlotId(1)));
        assert_eq!(new_slots[1].next, None);
        assert_eq!(new_slots[1].label, Some(StringId::new(3, 2)));
    }

    #[test]
    fn compaction_is_idempotent() {
        let slots = vec![
            Link::default(),
            Link {
                next: Some(SlotId(0)),
                label: Some(StringId::new(0, 1)),
            },
        ];
        let mut root = Link {
            next: Some(SlotId(1)),
            label: None,
        };
        let (once_slots, once_strings) = Compactor::new(&slots, b"a").run(&mut root);
        let root_after_once = root.clone();
        let (twice_slots, twice_strings) =
            Compactor::new(&once_slots, &once_strings).run(&mut root);
        assert_eq!(root, root_after_once);
        assert_eq!(once_slots, twice_slots);
        assert_eq!(once_strings, twice_strings);
    }

    #[test]
    fn relocation_descriptor_reports_reclaimed_bytes() {
        let r = Relocation {
            slots_before: 10,
            slots_after: 4,
            capacity_before: 200,
            capacity_after: 80,
        };
        assert_eq!(r.bytes_reclaimed(), 120);
        assert!(!r.is_noop());
    }
}
