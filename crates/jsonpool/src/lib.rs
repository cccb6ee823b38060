//! jsonpool: JSON documents that live inside a single fixed-capacity pool.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the jsonpool sub-crates. For most users, adding `jsonpool` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use jsonpool::prelude::*;
//!
//! let mut doc = Document::new(256);
//! doc.member("name").set("Alice");
//! doc.member("age").set(30);
//! doc.member("tags").add_value("x");
//!
//! assert_eq!(doc.get("name").as_::<&str>(), "Alice");
//! assert_eq!(doc.get("age").as_::<i32>(), 30);
//! assert!(doc.get("missing").get("deeper").is_null());
//! assert!(!doc.overflowed());
//!
//! // Removal unlinks; compaction gives the bytes back.
//! doc.remove_key("tags");
//! let relocation = doc.shrink_to_fit();
//! assert_eq!(relocation.capacity_after, doc.memory_usage());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `jsonpool-core` | Handles, variant kinds, errors, the `Allocator` seam |
//! | [`arena`] | `jsonpool-arena` | Pool buffer, free list, `ResourceManager`, compaction |
//! | [`tree`] | `jsonpool-tree` | Slots, read and write views, conversions, visitors |
//! | [`document`] | `jsonpool-document` | `Document` with copy, move and garbage collection |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Handles, variant kinds, error types and core traits (`jsonpool-core`).
///
/// Implement [`types::Allocator`] to control where pool memory comes from.
pub use jsonpool_core as types;

/// The pool itself (`jsonpool-arena`).
///
/// [`arena::ResourceManager`] owns the byte budget;
/// [`arena::DefaultAllocator`] and [`arena::BoundedAllocator`] are the
/// stock allocators.
pub use jsonpool_arena as arena;

/// The variant tree (`jsonpool-tree`).
///
/// [`tree::VariantRef`] reads, [`tree::VariantMut`] writes, and
/// [`tree::Visitor`] walks a value depth-first.
pub use jsonpool_tree as tree;

/// Documents (`jsonpool-document`).
pub use jsonpool_document as document;

/// Common imports for typical jsonpool usage.
///
/// ```rust
/// use jsonpool::prelude::*;
/// ```
pub mod prelude {
    // Document
    pub use jsonpool_document::Document;

    // Views and conversions
    pub use jsonpool_tree::{
        FromVariant, IntoVariant, JsonString, VariantMut, VariantRef, Visitor,
    };

    // Pool
    pub use jsonpool_arena::{BoundedAllocator, DefaultAllocator, PoolConfig, Relocation};

    // Core
    pub use jsonpool_core::{Allocator, ConfigError, PoolError, VariantKind};
}
