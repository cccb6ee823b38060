//! Node layout: the variant payload and the slot that carries it.
//!
//! A [`Slot`] is one node of the tree and one link of its parent's chain at
//! the same time: it holds the value, the handle of the next sibling and,
//! for object members, the key. Arrays and objects store only the handles of
//! the first and last slot of their chain.

use jsonpool_arena::ResourceManager;
use jsonpool_core::{PoolNode, PoolRef, SlotId, VariantKind};

use crate::string::StringRef;

/// The pool type documents use.
pub type Resources = ResourceManager<Slot>;

/// Head and tail of a child chain.
///
/// The tail is cached so appending does not walk the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collection {
    pub(crate) head: Option<SlotId>,
    pub(crate) tail: Option<SlotId>,
}

impl Collection {
    /// Whether the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// Value held by a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum VariantData {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Signed integer.
    Signed(i64),
    /// Unsigned integer.
    Unsigned(u64),
    /// Double-precision float.
    Float(f64),
    /// String value.
    String(StringRef),
    /// Ordered elements.
    Array(Collection),
    /// Insertion-ordered members.
    Object(Collection),
}

impl VariantData {
    /// The kind of value held.
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Null => VariantKind::Null,
            Self::Bool(_) => VariantKind::Bool,
            Self::Signed(_) => VariantKind::SignedInteger,
            Self::Unsigned(_) => VariantKind::UnsignedInteger,
            Self::Float(_) => VariantKind::Float,
            Self::String(_) => VariantKind::String,
            Self::Array(_) => VariantKind::Array,
            Self::Object(_) => VariantKind::Object,
        }
    }

    /// The child chain of an array or object.
    pub fn collection(&self) -> Option<Collection> {
        match *self {
            Self::Array(list) | Self::Object(list) => Some(list),
            _ => None,
        }
    }
}

/// One node of the tree, stored in a pool slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Slot {
    pub(crate) data: VariantData,
    pub(crate) next: Option<SlotId>,
    pub(crate) key: Option<StringRef>,
}

impl Slot {
    /// The value held by this node.
    pub fn data(&self) -> &VariantData {
        &self.data
    }
}

impl PoolNode for Slot {
    fn visit_refs(&mut self, visit: &mut dyn FnMut(PoolRef<'_>)) {
        match &mut self.data {
            VariantData::String(StringRef::Owned(id)) => visit(PoolRef::String(id)),
            VariantData::Array(list) | VariantData::Object(list) => {
                if let Some(head) = list.head.as_mut() {
                    visit(PoolRef::Slot(head));
                }
                if let Some(tail) = list.tail.as_mut() {
                    visit(PoolRef::Slot(tail));
                }
            }
            _ => {}
        }
        if let Some(StringRef::Owned(key)) = self.key.as_mut() {
            visit(PoolRef::String(key));
        }
        if let Some(next) = self.next.as_mut() {
            visit(PoolRef::Slot(next));
        }
    }
}

/// Walks a child chain from its head.
pub(crate) struct Chain<'a> {
    pool: &'a Resources,
    cursor: Option<SlotId>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(pool: &'a Resources, head: Option<SlotId>) -> Self {
        Self { pool, cursor: head }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = (SlotId, &'a Slot);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let slot = self.pool.node(id)?;
        self.cursor = slot.next;
        Some((id, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonpool_arena::DefaultAllocator;
    use jsonpool_core::StringId;

    #[test]
    fn default_slot_is_null_and_unlinked() {
        let slot = Slot::default();
        assert_eq!(slot.data().kind(), VariantKind::Null);
        assert!(slot.next.is_none());
        assert!(slot.key.is_none());
    }

    #[test]
    fn visit_refs_reports_every_owned_handle() {
        let mut slot = Slot {
            data: VariantData::Array(Collection {
                head: Some(SlotId(1)),
                tail: Some(SlotId(2)),
            }),
            next: Some(SlotId(3)),
            key: Some(StringRef::Owned(StringId::new(0, 4))),
        };
        let mut slots = Vec::new();
        let mut strings = 0;
        slot.visit_refs(&mut |handle| match handle {
            PoolRef::Slot(id) => slots.push(*id),
            PoolRef::String(_) => strings += 1,
        });
        assert_eq!(slots, vec![SlotId(1), SlotId(2), SlotId(3)]);
        assert_eq!(strings, 1);
    }

    #[test]
    fn linked_strings_are_not_visited() {
        let mut slot = Slot {
            data: VariantData::String(StringRef::Linked("x")),
            next: None,
            key: Some(StringRef::Linked("k")),
        };
        let mut count = 0;
        slot.visit_refs(&mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn chain_stops_at_last_link() {
        let mut pool = Resources::new(64, DefaultAllocator::instance());
        let a = pool.allocate_node().unwrap();
        let b = pool.allocate_node().unwrap();
        pool.node_mut(a).unwrap().next = Some(b);
        let ids: Vec<_> = Chain::new(&pool, Some(a)).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(Chain::new(&pool, None).count(), 0);
    }
}
