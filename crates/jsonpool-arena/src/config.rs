//! Pool configuration parameters.

use jsonpool_core::ConfigError;

/// Bytes accounted against the pool for every node slot.
///
/// This is the footprint of one slot (value, sibling link, key) on the
/// 32-bit targets the pool is sized for. Slot bytes and string bytes are
/// drawn from the same capacity.
///
/// The charge is bookkeeping only. Slots live in a separate heap `Vec`
/// outside the allocator's block, so a pool's real footprint is
/// `capacity` plus `slot_count * size_of::<N>()`, and on 64-bit hosts a
/// slot is larger than this constant.
pub const SLOT_SIZE: usize = 16;

/// Configuration for a document pool.
///
/// Validated by [`PoolConfig::validate`]; values are immutable after the
/// pool is created. Growth is never implicit: capacity only changes through
/// an explicit reallocation or compaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Total pool capacity in bytes, shared by slots and strings.
    ///
    /// Zero is valid and yields a pool without a backing buffer.
    pub capacity: usize,
}

impl PoolConfig {
    /// Largest capacity addressable by 32-bit pool handles.
    pub const MAX_CAPACITY: usize = u32::MAX as usize;

    /// Create a config for a pool of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check that the capacity can be addressed by pool handles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity > Self::MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.capacity,
                max: Self::MAX_CAPACITY,
            });
        }
        Ok(())
    }

    /// Number of slots that fit when no strings are stored.
    pub fn slot_budget(&self) -> usize {
        self.capacity / SLOT_SIZE
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
