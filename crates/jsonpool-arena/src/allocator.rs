//! Backing allocators for pool buffers.
//!
//! [`DefaultAllocator`] is a thin wrapper over the global heap with a
//! single process-wide instance. [`BoundedAllocator`] models a fixed-size
//! embedded heap: it refuses any request that would push its outstanding
//! bytes above a limit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use jsonpool_core::Allocator;

/// The process-wide default allocator, created on first use.
static DEFAULT_INSTANCE: OnceLock<Arc<DefaultAllocator>> = OnceLock::new();

/// Heap-backed allocator that grows and shrinks blocks by reallocation.
///
/// Refusal only happens when the global heap cannot satisfy the request
/// (`try_reserve` fails); the process is never aborted for a pool buffer.
#[derive(Debug, Default)]
pub struct DefaultAllocator;

impl DefaultAllocator {
    /// The shared instance used by documents constructed without an
    /// explicit allocator.
    ///
    /// Initialised exactly once; concurrent first calls are synchronised
    /// and all observe the same instance. Lower layers never call this:
    /// only the outermost document constructors default to it.
    pub fn instance() -> Arc<dyn Allocator> {
        let shared = DEFAULT_INSTANCE.get_or_init(|| Arc::new(DefaultAllocator));
        Arc::clone(shared) as Arc<dyn Allocator>
    }
}

impl Allocator for DefaultAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        let mut data = Vec::new();
        data.try_reserve_exact(size).ok()?;
        data.resize(size, 0);
        Some(data.into_boxed_slice())
    }

    fn reallocate(&self, block: Box<[u8]>, size: usize) -> Result<Box<[u8]>, Box<[u8]>> {
        let mut data = block.into_vec();
        if size > data.len() && data.try_reserve_exact(size - data.len()).is_err() {
            return Err(data.into_boxed_slice());
        }
        data.resize(size, 0);
        Ok(data.into_boxed_slice())
    }

    fn deallocate(&self, block: Box<[u8]>) {
        drop(block);
    }
}

/// Allocator with a hard ceiling on outstanding bytes.
///
/// Stands in for the fixed heap of a small device: once `limit` bytes are
/// handed out, further requests are refused until blocks come back.
#[derive(Debug)]
pub struct BoundedAllocator {
    limit: usize,
    in_use: AtomicUsize,
}

impl BoundedAllocator {
    /// Create an allocator that never has more than `limit` bytes out.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            in_use: AtomicUsize::new(0),
        }
    }

    /// Wrap a new bounded allocator for sharing between documents.
    pub fn shared(limit: usize) -> Arc<Self> {
        Arc::new(Self::new(limit))
    }

    /// The configured ceiling in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes currently handed out.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Reserve `grow` more bytes against the ceiling.
    fn reserve(&self, grow: usize) -> bool {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(grow).filter(|&total| total <= self.limit)
            })
            .is_ok()
    }

    fn release(&self, bytes: usize) {
        // Saturating: a foreign block handed to deallocate must not wrap.
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }
}

impl Allocator for BoundedAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        if !self.reserve(size) {
            return None;
        }
        let block = DefaultAllocator.allocate(size);
        if block.is_none() {
            self.release(size);
        }
        block
    }

    fn reallocate(&self, block: Box<[u8]>, size: usize) -> Result<Box<[u8]>, Box<[u8]>> {
        let old = block.len();
        if size > old && !self.reserve(size - old) {
            return Err(block);
        }
        match DefaultAllocator.reallocate(block, size) {
            Ok(resized) => {
                if size < old {
                    self.release(old - size);
                }
                Ok(resized)
            }
            Err(block) => {
                if size > old {
                    self.release(size - old);
                }
                Err(block)
            }
        }
    }

    fn deallocate(&self, block: Box<[u8]>) {
        self.release(block.len());
    }
}
