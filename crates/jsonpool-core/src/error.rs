//! Error types for pool operations.
//!
//! Running out of pool space is an expected outcome on small targets, so
//! these errors never reach the document surface as `Err`: the resource
//! manager records them in its sticky overflow flag and the document
//! reports "did not take effect" through `bool` / `Option` results.

/// Errors from the arena allocator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool has no free slot and not enough untouched capacity.
    #[error("pool capacity exceeded: requested {requested} bytes, {available} bytes available")]
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes still available in the pool.
        available: usize,
    },
    /// The backing allocator refused to provide a buffer.
    #[error("allocator refused a buffer of {requested} bytes")]
    AllocatorRefused {
        /// Size of the refused buffer in bytes.
        requested: usize,
    },
    /// A reallocation asked for less room than the live content occupies.
    #[error("cannot reallocate pool to {requested} bytes: {used} bytes in use")]
    ShrinkBelowUsage {
        /// Requested capacity in bytes.
        requested: usize,
        /// Bytes currently in use.
        used: usize,
    },
}

/// Errors from validating a pool configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The capacity cannot be addressed by 32-bit pool handles.
    #[error("pool capacity {requested} exceeds the maximum of {max} bytes")]
    CapacityTooLarge {
        /// Requested capacity in bytes.
        requested: usize,
        /// Largest supported capacity in bytes.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_message() {
        let err = PoolError::CapacityExceeded {
            requested: 16,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "pool capacity exceeded: requested 16 bytes, 4 bytes available"
        );
    }

    #[test]
    fn shrink_below_usage_message() {
        let err = PoolError::ShrinkBelowUsage {
            requested: 8,
            used: 32,
        };
        assert!(err.to_string().contains("32 bytes in use"));
    }

    #[test]
    fn config_error_message() {
        let err = ConfigError::CapacityTooLarge {
            requested: 10,
            max: 5,
        };
        assert_eq!(
            err.to_string(),
            "pool capacity 10 exceeds the maximum of 5 bytes"
        );
    }
}
