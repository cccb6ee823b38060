//! Mutation context over a root slot and the pool its descendants live in.
//!
//! Nodes cannot allocate on their own behalf: every mutation needs the pool.
//! [`Tree`] bundles the two mutable borrows (the root, which lives outside
//! the pool, and the pool itself) and addresses nodes by [`NodeId`].
//!
//! Failures never panic. An operation that cannot allocate returns `false`
//! or `None`, leaves the node as it was and, via the pool, sets the sticky
//! overflow flag.

use jsonpool_core::SlotId;
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::read::VariantRef;
use crate::slot::{Chain, Collection, Resources, Slot, VariantData};
use crate::string::{JsonString, StringRef};

/// Address of a node within a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// The inline root owned by the document.
    Root,
    /// A node stored in the pool.
    Slot(SlotId),
}

/// Mutable access to a tree: its root slot plus the pool it allocates from.
pub struct Tree<'a> {
    root: &'a mut Slot,
    pool: &'a mut Resources,
}

impl<'a> Tree<'a> {
    /// Borrow `root` and `pool` for mutation.
    pub fn new(root: &'a mut Slot, pool: &'a mut Resources) -> Self {
        Self { root, pool }
    }

    /// Reborrow for a shorter lifetime.
    pub fn reborrow(&mut self) -> Tree<'_> {
        Tree {
            root: &mut *self.root,
            pool: &mut *self.pool,
        }
    }

    /// The pool nodes are allocated from.
    pub fn pool(&self) -> &Resources {
        self.pool
    }

    fn slot(&self, node: NodeId) -> Option<&Slot> {
        match node {
            NodeId::Root => Some(&*self.root),
            NodeId::Slot(id) => self.pool.node(id),
        }
    }

    fn slot_mut(&mut self, node: NodeId) -> Option<&mut Slot> {
        match node {
            NodeId::Root => Some(&mut *self.root),
            NodeId::Slot(id) => self.pool.node_mut(id),
        }
    }

    /// The value held by `node`.
    pub fn data(&self, node: NodeId) -> Option<&VariantData> {
        self.slot(node).map(Slot::data)
    }

    /// Read-only view of `node`.
    pub fn get(&self, node: NodeId) -> VariantRef<'_> {
        VariantRef::new(self.data(node), self.pool)
    }

    /// Overwrite the value of `node`. The previous content is not freed.
    fn replace(&mut self, node: NodeId, data: VariantData) -> bool {
        match self.slot_mut(node) {
            Some(slot) => {
                slot.data = data;
                true
            }
            None => false,
        }
    }

    /// Set `node` to null.
    pub fn set_null(&mut self, node: NodeId) -> bool {
        self.replace(node, VariantData::Null)
    }

    /// Set `node` to a boolean.
    pub fn set_bool(&mut self, node: NodeId, value: bool) -> bool {
        self.replace(node, VariantData::Bool(value))
    }

    /// Set `node` to a signed integer.
    pub fn set_signed(&mut self, node: NodeId, value: i64) -> bool {
        self.replace(node, VariantData::Signed(value))
    }

    /// Set `node` to an unsigned integer.
    pub fn set_unsigned(&mut self, node: NodeId, value: u64) -> bool {
        self.replace(node, VariantData::Unsigned(value))
    }

    /// Set `node` to a float.
    pub fn set_float(&mut self, node: NodeId, value: f64) -> bool {
        self.replace(node, VariantData::Float(value))
    }

    /// Set `node` to a string, copying it into the pool unless linked.
    ///
    /// The string is stored before the node changes, so on overflow the
    /// node keeps its previous value.
    pub fn set_string(&mut self, node: NodeId, value: JsonString<'_>) -> bool {
        if self.slot(node).is_none() {
            return false;
        }
        match value.store(self.pool) {
            Ok(stored) => self.replace(node, VariantData::String(stored)),
            Err(_) => false,
        }
    }

    /// Replace `node` with an empty array.
    pub fn to_array(&mut self, node: NodeId) -> bool {
        self.replace(node, VariantData::Array(Collection::default()))
    }

    /// Replace `node` with an empty object.
    pub fn to_object(&mut self, node: NodeId) -> bool {
        self.replace(node, VariantData::Object(Collection::default()))
    }

    fn append(&mut self, list: &mut Collection, id: SlotId) {
        match list.tail {
            Some(tail) => {
                if let Some(slot) = self.pool.node_mut(tail) {
                    slot.next = Some(id);
                }
            }
            None => list.head = Some(id),
        }
        list.tail = Some(id);
    }

    /// Append a null element to the array at `node`.
    ///
    /// A null node becomes an array first. Returns `None` if `node` holds
    /// another kind of value or the pool is full; `node` is then unchanged.
    pub fn add_element(&mut self, node: NodeId) -> Option<NodeId> {
        let mut list = match *self.data(node)? {
            VariantData::Null => Collection::default(),
            VariantData::Array(list) => list,
            _ => return None,
        };
        let id = self.pool.allocate_node().ok()?;
        self.append(&mut list, id);
        self.replace(node, VariantData::Array(list));
        Some(NodeId::Slot(id))
    }

    /// The element at `index`, appending nulls until it exists.
    pub fn get_or_create_element(&mut self, node: NodeId, index: usize) -> Option<NodeId> {
        let existing = match *self.data(node)? {
            VariantData::Null => 0,
            VariantData::Array(list) => {
                if let Some((id, _)) = Chain::new(self.pool, list.head).nth(index) {
                    return Some(NodeId::Slot(id));
                }
                Chain::new(self.pool, list.head).count()
            }
            _ => return None,
        };
        let mut last = None;
        for _ in existing..=index {
            last = Some(self.add_element(node)?);
        }
        last
    }

    fn find_member(&self, list: Collection, key: &str) -> Option<(Option<SlotId>, SlotId)> {
        let mut prev = None;
        for (id, slot) in Chain::new(self.pool, list.head) {
            if slot.key.is_some_and(|k| k.resolve(self.pool) == key) {
                return Some((prev, id));
            }
            prev = Some(id);
        }
        None
    }

    /// The member of the object at `node` named `key`, created as null if
    /// absent.
    ///
    /// Keys are compared byte for byte. A null node becomes an object first.
    /// Returns `None` if `node` holds another kind of value or the pool
    /// cannot hold the new member; `node` is then unchanged.
    pub fn get_or_create_member(&mut self, node: NodeId, key: JsonString<'_>) -> Option<NodeId> {
        let mut list = match *self.data(node)? {
            VariantData::Null => Collection::default(),
            VariantData::Object(list) => list,
            _ => return None,
        };
        if let Some((_, id)) = self.find_member(list, key.as_str()) {
            return Some(NodeId::Slot(id));
        }
        let id = self.pool.allocate_node().ok()?;
        let stored = match key.store(self.pool) {
            Ok(stored) => stored,
            Err(_) => {
                self.pool.free_node(id);
                return None;
            }
        };
        if let Some(slot) = self.pool.node_mut(id) {
            slot.key = Some(stored);
        }
        self.append(&mut list, id);
        self.replace(node, VariantData::Object(list));
        Some(NodeId::Slot(id))
    }

    /// Unlink `target` (preceded by `prev`) from the chain of `node`.
    fn unlink(&mut self, node: NodeId, prev: Option<SlotId>, target: SlotId) {
        let Some(data) = self.data(node).copied() else {
            return;
        };
        let Some(mut list) = data.collection() else {
            return;
        };
        let next = self.pool.node_mut(target).and_then(|slot| slot.next.take());
        match prev {
            Some(p) => {
                if let Some(slot) = self.pool.node_mut(p) {
                    slot.next = next;
                }
            }
            None => list.head = next,
        }
        if list.tail == Some(target) {
            list.tail = prev;
        }
        let data = match data {
            VariantData::Array(_) => VariantData::Array(list),
            _ => VariantData::Object(list),
        };
        self.replace(node, data);
        trace!(slot = %target, "unlinked; slot not freed");
    }

    /// Unlink the element at `index` from the array at `node`.
    ///
    /// The removed subtree keeps its slots until the pool is compacted.
    pub fn remove_element(&mut self, node: NodeId, index: usize) {
        let Some(VariantData::Array(list)) = self.data(node).copied() else {
            return;
        };
        let mut prev = None;
        let mut target = None;
        for (i, (id, _)) in Chain::new(self.pool, list.head).enumerate() {
            if i == index {
                target = Some(id);
                break;
            }
            prev = Some(id);
        }
        if let Some(target) = target {
            self.unlink(node, prev, target);
        }
    }

    /// Unlink the member named `key` from the object at `node`.
    ///
    /// The removed subtree keeps its slots until the pool is compacted.
    pub fn remove_member(&mut self, node: NodeId, key: &str) {
        let Some(VariantData::Object(list)) = self.data(node).copied() else {
            return;
        };
        if let Some((prev, target)) = self.find_member(list, key) {
            self.unlink(node, prev, target);
        }
    }

    /// Deep-copy `source` into `node`.
    ///
    /// Owned strings are copied; linked strings stay linked. On overflow the
    /// copy stops and `node` holds whatever was copied so far.
    pub fn copy_from<'s>(&mut self, node: NodeId, source: VariantRef<'s>) -> bool {
        // Children are created with their parent and filled in from here.
        let mut pending: SmallVec<[(NodeId, VariantRef<'s>); 16]> = smallvec![(node, source)];
        while let Some((dst, src)) = pending.pop() {
            let data = src.data().copied().unwrap_or_default();
            let copied = match data {
                VariantData::Null => self.set_null(dst),
                VariantData::Bool(b) => self.set_bool(dst, b),
                VariantData::Signed(i) => self.set_signed(dst, i),
                VariantData::Unsigned(u) => self.set_unsigned(dst, u),
                VariantData::Float(f) => self.set_float(dst, f),
                VariantData::String(StringRef::Linked(text)) => {
                    self.replace(dst, VariantData::String(StringRef::Linked(text)))
                }
                VariantData::String(StringRef::Owned(_)) => {
                    self.set_string(dst, JsonString::Copied(src.as_str().unwrap_or_default()))
                }
                VariantData::Array(_) => {
                    self.to_array(dst) && {
                        let start = pending.len();
                        let mut complete = true;
                        for element in src.elements() {
                            match self.add_element(dst) {
                                Some(child) => pending.push((child, element)),
                                None => {
                                    complete = false;
                                    break;
                                }
                            }
                        }
                        pending[start..].reverse();
                        complete
                    }
                }
                VariantData::Object(_) => {
                    self.to_object(dst) && {
                        let start = pending.len();
                        let mut complete = true;
                        for (key, value) in src.stored_members() {
                            match self.get_or_create_member(dst, key) {
                                Some(child) => pending.push((child, value)),
                                None => {
                                    complete = false;
                                    break;
                                }
                            }
                        }
                        pending[start..].reverse();
                        complete
                    }
                }
            };
            if !copied {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for Tree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.get(NodeId::Root))
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonpool_arena::{DefaultAllocator, SLOT_SIZE};

    fn fixture(capacity: usize) -> (Slot, Resources) {
        (
            Slot::default(),
            Resources::new(capacity, DefaultAllocator::instance()),
        )
    }

    #[test]
    fn scalars_need_no_pool() {
        let (mut root, mut pool) = fixture(0);
        let mut tree = Tree::new(&mut root, &mut pool);
        assert!(tree.set_signed(NodeId::Root, -4));
        assert_eq!(tree.get(NodeId::Root).as_::<i32>(), -4);
        assert!(tree.set_float(NodeId::Root, 1.5));
        assert!(tree.set_bool(NodeId::Root, true));
        assert!(!pool.overflowed());
    }

    #[test]
    fn failed_string_set_keeps_previous_value() {
        let (mut root, mut pool) = fixture(4);
        let mut tree = Tree::new(&mut root, &mut pool);
        tree.set_signed(NodeId::Root, 7);
        assert!(!tree.set_string(NodeId::Root, "too long".into()));
        assert_eq!(tree.get(NodeId::Root).as_::<i64>(), 7);
        assert!(pool.overflowed());
    }

    #[test]
    fn add_element_converts_null_and_appends_in_order() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        for i in 0..3 {
            let child = tree.add_element(NodeId::Root).unwrap();
            tree.set_signed(child, i);
        }
        let view = tree.get(NodeId::Root);
        assert_eq!(view.size(), 3);
        let values: Vec<i64> = view.elements().map(|e| e.as_()).collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn add_element_on_scalar_fails() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        tree.set_bool(NodeId::Root, true);
        assert!(tree.add_element(NodeId::Root).is_none());
        assert_eq!(pool.size(), 0);
    }

    #[test]
    fn add_element_on_full_pool_leaves_null() {
        let (mut root, mut pool) = fixture(8);
        let mut tree = Tree::new(&mut root, &mut pool);
        assert!(tree.add_element(NodeId::Root).is_none());
        assert!(tree.get(NodeId::Root).is_null());
        assert!(pool.overflowed());
    }

    #[test]
    fn get_or_create_member_reuses_existing_key() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        let a = tree.get_or_create_member(NodeId::Root, "a".into()).unwrap();
        let again = tree.get_or_create_member(NodeId::Root, "a".into()).unwrap();
        assert_eq!(a, again);
        assert_eq!(tree.get(NodeId::Root).size(), 1);
        assert_eq!(pool.size(), SLOT_SIZE + 1);
    }

    #[test]
    fn member_keys_compare_exactly() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        tree.get_or_create_member(NodeId::Root, "Key".into());
        tree.get_or_create_member(NodeId::Root, "key".into());
        assert_eq!(tree.get(NodeId::Root).size(), 2);
    }

    #[test]
    fn get_or_create_member_on_array_fails() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        tree.to_array(NodeId::Root);
        assert!(tree.get_or_create_member(NodeId::Root, "k".into()).is_none());
    }

    #[test]
    fn key_overflow_frees_the_member_slot() {
        let (mut root, mut pool) = fixture(SLOT_SIZE + 2);
        let mut tree = Tree::new(&mut root, &mut pool);
        assert!(tree
            .get_or_create_member(NodeId::Root, "long key".into())
            .is_none());
        assert!(tree.get(NodeId::Root).is_null());
        assert_eq!(pool.free_slots(), 1);
        assert!(pool.overflowed());
    }

    #[test]
    fn linked_key_costs_only_the_slot() {
        let (mut root, mut pool) = fixture(SLOT_SIZE);
        let mut tree = Tree::new(&mut root, &mut pool);
        let member = tree
            .get_or_create_member(NodeId::Root, JsonString::linked("sensor"))
            .unwrap();
        tree.set_signed(member, 1);
        assert_eq!(tree.get(NodeId::Root).get("sensor").as_::<i32>(), 1);
        assert_eq!(pool.size(), SLOT_SIZE);
    }

    #[test]
    fn get_or_create_element_pads_with_nulls() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        let third = tree.get_or_create_element(NodeId::Root, 2).unwrap();
        tree.set_signed(third, 9);
        let view = tree.get(NodeId::Root);
        assert_eq!(view.size(), 3);
        assert!(view.at(0).is_null());
        assert_eq!(view.at(2).as_::<i32>(), 9);
        let first = tree.get_or_create_element(NodeId::Root, 0).unwrap();
        assert_eq!(tree.get(first).kind(), Some(jsonpool_core::VariantKind::Null));
        assert_eq!(tree.get(NodeId::Root).size(), 3);
    }

    #[test]
    fn remove_element_unlinks_without_freeing() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        for i in 0..3 {
            let child = tree.add_element(NodeId::Root).unwrap();
            tree.set_signed(child, i);
        }
        tree.remove_element(NodeId::Root, 1);
        let values: Vec<i64> = tree.get(NodeId::Root).elements().map(|e| e.as_()).collect();
        assert_eq!(values, vec![0, 2]);
        assert_eq!(pool.size(), 3 * SLOT_SIZE);
        assert_eq!(pool.free_slots(), 0);
    }

    #[test]
    fn removing_the_tail_keeps_append_working() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        for i in 0..2 {
            let child = tree.add_element(NodeId::Root).unwrap();
            tree.set_signed(child, i);
        }
        tree.remove_element(NodeId::Root, 1);
        let child = tree.add_element(NodeId::Root).unwrap();
        tree.set_signed(child, 5);
        let values: Vec<i64> = tree.get(NodeId::Root).elements().map(|e| e.as_()).collect();
        assert_eq!(values, vec![0, 5]);
    }

    #[test]
    fn removing_only_element_empties_array() {
        let (mut root, mut pool) = fixture(64);
        let mut tree = Tree::new(&mut root, &mut pool);
        tree.add_element(NodeId::Root);
        tree.remove_element(NodeId::Root, 0);
        tree.remove_element(NodeId::Root, 4);
        let view = tree.get(NodeId::Root);
        assert_eq!(view.size(), 0);
        assert_eq!(view.kind(), Some(jsonpool_core::VariantKind::Array));
    }

    #[test]
    fn remove_member_by_key() {
        let (mut root, mut pool) = fixture(128);
        let mut tree = Tree::new(&mut root, &mut pool);
        for key in ["a", "b", "c"] {
            tree.get_or_create_member(NodeId::Root, key.into());
        }
        tree.remove_member(NodeId::Root, "a");
        tree.remove_member(NodeId::Root, "missing");
        let keys: Vec<&str> = tree.get(NodeId::Root).members().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn copy_from_duplicates_across_pools() {
        let (mut src_root, mut src_pool) = fixture(256);
        {
            let mut tree = Tree::new(&mut src_root, &mut src_pool);
            let name = tree.get_or_create_member(NodeId::Root, "name".into()).unwrap();
            tree.set_string(name, "Ada".into());
            let tag = tree
                .get_or_create_member(NodeId::Root, JsonString::linked("tags"))
                .unwrap();
            let first = tree.add_element(tag).unwrap();
            tree.set_string(first, JsonString::linked("static"));
        }
        let source = VariantRef::new(Some(src_root.data()), &src_pool);

        let (mut dst_root, mut dst_pool) = fixture(256);
        let mut tree = Tree::new(&mut dst_root, &mut dst_pool);
        assert!(tree.copy_from(NodeId::Root, source));
        assert_eq!(tree.get(NodeId::Root), source);
        // Linked strings are not copied.
        assert_eq!(dst_pool.size(), 3 * SLOT_SIZE + "nameAda".len());
    }

    #[test]
    fn copy_from_handles_deep_chains() {
        const DEPTH: usize = 50_000;
        let (mut src_root, mut src_pool) = fixture(DEPTH * SLOT_SIZE);
        {
            let mut tree = Tree::new(&mut src_root, &mut src_pool);
            let mut node = NodeId::Root;
            for _ in 0..DEPTH {
                node = tree.add_element(node).unwrap();
            }
            assert!(tree.set_unsigned(node, 7));
        }
        let source = VariantRef::new(Some(src_root.data()), &src_pool);
        let (mut root, mut pool) = fixture(DEPTH * SLOT_SIZE);
        let mut tree = Tree::new(&mut root, &mut pool);
        assert!(tree.copy_from(NodeId::Root, source));
        assert_eq!(tree.get(NodeId::Root), source);
        assert_eq!(tree.get(NodeId::Root).nesting(), DEPTH);
    }

    #[test]
    fn copy_from_unbound_sets_null() {
        let (mut root, mut pool) = fixture(16);
        let source_pool = Resources::new(0, DefaultAllocator::instance());
        let mut tree = Tree::new(&mut root, &mut pool);
        tree.set_bool(NodeId::Root, true);
        assert!(tree.copy_from(NodeId::Root, VariantRef::unbound(&source_pool)));
        assert!(tree.get(NodeId::Root).is_null());
    }
}
