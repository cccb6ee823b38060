//! The pool's backing buffer and its string region.
//!
//! A [`PoolBuffer`] owns the block obtained from the allocator (or nothing,
//! for a zero-capacity pool). Owned strings are bump-allocated from the
//! front of the block; the remaining bytes are the budget node slots draw
//! from. The buffer itself does not know about slots: callers pass the
//! number of bytes reserved for them when allocating a string.

use jsonpool_core::StringId;

/// Backing block plus bump cursor for owned string bytes.
#[derive(Debug, Default)]
pub struct PoolBuffer {
    /// Storage obtained from the pool's allocator. `None` when capacity is zero.
    block: Option<Box<[u8]>>,
    /// Bump pointer: bytes of string data written so far.
    cursor: usize,
}

impl PoolBuffer {
    /// A buffer without backing storage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a freshly allocated block. Nothing is in use yet.
    pub fn from_block(block: Box<[u8]>) -> Self {
        Self {
            block: Some(block),
            cursor: 0,
        }
    }

    /// Total size of the backing block in bytes.
    pub fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, |b| b.len())
    }

    /// Bytes of string data written so far.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Copy `bytes` into the string region.
    ///
    /// `reserved` is the number of bytes at the tail of the block already
    /// spoken for (node slots). Returns `None` if the string would run into
    /// them.
    pub fn alloc(&mut self, bytes: &[u8], reserved: usize) -> Option<StringId> {
        let block = self.block.as_mut()?;
        let end = self.cursor.checked_add(bytes.len())?;
        if end.checked_add(reserved)? > block.len() {
            return None;
        }
        block[self.cursor..end].copy_from_slice(bytes);
        let id = StringId::new(self.cursor as u32, bytes.len() as u32);
        self.cursor = end;
        Some(id)
    }

    /// Read back the bytes of a string allocated from this buffer.
    ///
    /// Returns `None` for a handle that lies outside the written region.
    pub fn get(&self, id: StringId) -> Option<&[u8]> {
        let range = id.range();
        if range.end > self.cursor {
            return None;
        }
        self.block.as_ref().and_then(|b| b.get(range))
    }

    /// The written prefix of the string region.
    pub fn written(&self) -> &[u8] {
        match &self.block {
            Some(block) => &block[..self.cursor],
            None => &[],
        }
    }

    /// Forget all strings without releasing the block.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Replace the string region with `packed`, which must fit the block.
    pub(crate) fn overwrite(&mut self, packed: &[u8]) {
        if let Some(block) = self.block.as_mut() {
            let len = packed.len().min(block.len());
            block[..len].copy_from_slice(&packed[..len]);
            self.cursor = len;
        } else {
            self.cursor = 0;
        }
    }

    /// Take ownership of the backing block, leaving the buffer empty.
    pub fn take_block(&mut self) -> Option<Box<[u8]>> {
        self.cursor = 0;
        self.block.take()
    }

    /// Install a block whose first `cursor` bytes are live string data.
    pub(crate) fn install(&mut self, block: Option<Box<[u8]>>, cursor: usize) {
        self.block = block;
        self.cursor = cursor.min(self.capacity());
    }
}
