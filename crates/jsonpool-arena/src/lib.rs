//! Fixed-capacity slot and string pool backing jsonpool documents.
//!
//! One [`ResourceManager`] owns one contiguous budget of bytes, obtained
//! from a pluggable [`Allocator`](jsonpool_core::Allocator). The budget is
//! shared by two regions that grow towards each other:
//!
//! ```text
//! capacity ────────────────────────────────────────────────┐
//! ├── PoolBuffer: owned string bytes, bump-allocated ──►   │
//! │                                    ◄── node slots ─────┤
//! │                                  (SLOT_SIZE bytes each) │
//! └── FreeList: slots handed back for eager reuse           │
//! ```
//!
//! # Reclamation tiers
//!
//! - **Eager reuse:** [`ResourceManager::free_node`] puts a slot on the free
//!   list; the next [`ResourceManager::allocate_node`] takes it back. The
//!   high-water mark never drops, so fragmentation can accumulate.
//! - **Compaction:** [`ResourceManager::shrink_to_fit`] walks the live graph
//!   from a root node, packs every reachable slot and string into a fresh
//!   layout, and trims capacity to the result. Unreachable slots are dropped.
//!
//! Exhaustion is not an error at this level's callers: a failed allocation
//! sets the sticky overflow flag and returns [`PoolError`](jsonpool_core::PoolError)
//! for the caller to turn into a no-op.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocator;
pub mod buffer;
pub mod config;
pub mod free_list;
pub mod manager;
pub mod relocation;

// Public re-exports for the primary API surface.
pub use allocator::{BoundedAllocator, DefaultAllocator};
pub use buffer::PoolBuffer;
pub use config::{PoolConfig, SLOT_SIZE};
pub use free_list::FreeList;
pub use manager::ResourceManager;
pub use relocation::Relocation;
