//! Arena-relative handles.
//!
//! Nothing in a document refers to memory by address. Slots are named by
//! their index in the pool's slot table, strings by their byte range in the
//! pool's string region. Relocating the pool therefore only re-numbers
//! handles; there is no pointer arithmetic to fix up.

use std::fmt;
use std::ops::Range;

/// Index of a node slot inside a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl SlotId {
    /// The slot index as a `usize`, for indexing the slot table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Byte range of an owned string inside a pool's string region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId {
    offset: u32,
    len: u32,
}

impl StringId {
    /// Create a handle for `len` bytes starting at `offset`.
    pub fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Byte offset of the first character within the string region.
    pub fn offset(self) -> u32 {
        self.offset
    }

    /// Length in bytes.
    pub fn len(self) -> u32 {
        self.len
    }

    /// Whether this handle names an empty string.
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// The byte range covered by this string.
    pub fn range(self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringId(off={}, len={})", self.offset, self.len)
    }
}
