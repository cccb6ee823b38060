//! Mutable views: create on access.
//!
//! [`VariantMut`] pairs a [`Tree`] with one node. Navigating through it
//! (`member`, `element`, `add`) creates what is missing, converting null
//! nodes to objects or arrays on the way. When creation fails (wrong kind,
//! or the pool is full) the view becomes detached: reads see null and writes
//! return `false`, so a chain of accesses degrades into no-ops instead of
//! failing.

use std::fmt;

use crate::convert::{FromVariant, IntoVariant};
use crate::read::VariantRef;
use crate::string::JsonString;
use crate::tree::{NodeId, Tree};

/// A mutable view of one node.
pub struct VariantMut<'a> {
    tree: Tree<'a>,
    node: Option<NodeId>,
}

impl<'a> VariantMut<'a> {
    /// View `node` of `tree`. `None` is a detached view.
    pub fn new(tree: Tree<'a>, node: Option<NodeId>) -> Self {
        Self { tree, node }
    }

    /// The node this view addresses, if attached.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Reborrow for a shorter lifetime, so a chain can start again from
    /// this node.
    pub fn reborrow(&mut self) -> VariantMut<'_> {
        VariantMut {
            tree: self.tree.reborrow(),
            node: self.node,
        }
    }

    /// Read-only view of the node.
    pub fn as_ref(&self) -> VariantRef<'_> {
        match self.node {
            Some(node) => self.tree.get(node),
            None => VariantRef::unbound(self.tree.pool()),
        }
    }

    /// Whether the node is null, or the view is detached.
    pub fn is_null(&self) -> bool {
        self.as_ref().is_null()
    }

    /// Convert the node's value to `T`.
    pub fn as_<'s, T: FromVariant<'s>>(&'s self) -> T {
        self.as_ref().as_()
    }

    /// Whether the node's value is representable as `T`.
    pub fn is<'s, T: FromVariant<'s>>(&'s self) -> bool {
        self.as_ref().is::<T>()
    }

    /// Number of elements or members.
    pub fn size(&self) -> usize {
        self.as_ref().size()
    }

    /// Store `value` in the node.
    pub fn set<T: IntoVariant>(&mut self, value: T) -> bool {
        match self.node {
            Some(node) => value.write_into(&mut self.tree, node),
            None => false,
        }
    }

    /// Set the node to null.
    pub fn set_null(&mut self) -> bool {
        self.node.is_some_and(|node| self.tree.set_null(node))
    }

    /// Replace the node with an empty array.
    pub fn to_array(&mut self) -> bool {
        self.node.is_some_and(|node| self.tree.to_array(node))
    }

    /// Replace the node with an empty object.
    pub fn to_object(&mut self) -> bool {
        self.node.is_some_and(|node| self.tree.to_object(node))
    }

    /// The member named `key`, created as null if absent.
    pub fn member<'s>(self, key: impl Into<JsonString<'s>>) -> VariantMut<'a> {
        let Self { mut tree, node } = self;
        let node = node.and_then(|n| tree.get_or_create_member(n, key.into()));
        Self { tree, node }
    }

    /// The element at `index`, padding the array with nulls if needed.
    pub fn element(self, index: usize) -> VariantMut<'a> {
        let Self { mut tree, node } = self;
        let node = node.and_then(|n| tree.get_or_create_element(n, index));
        Self { tree, node }
    }

    /// Append a null element and view it.
    pub fn add(self) -> VariantMut<'a> {
        let Self { mut tree, node } = self;
        let node = node.and_then(|n| tree.add_element(n));
        Self { tree, node }
    }

    /// Append `value` to the array.
    pub fn add_value<T: IntoVariant>(&mut self, value: T) -> bool {
        let Some(child) = self.node.and_then(|n| self.tree.add_element(n)) else {
            return false;
        };
        value.write_into(&mut self.tree, child)
    }

    /// Unlink the element at `index`. Its slots are not freed.
    pub fn remove(&mut self, index: usize) {
        if let Some(node) = self.node {
            self.tree.remove_element(node, index);
        }
    }

    /// Unlink the member named `key`. Its slots are not freed.
    pub fn remove_key(&mut self, key: &str) {
        if let Some(node) = self.node {
            self.tree.remove_member(node, key);
        }
    }
}

impl fmt::Debug for VariantMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_ref(), f)
    }
}
