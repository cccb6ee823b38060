//! Core types and traits for the jsonpool document engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the arena, the variant tree and the document:
//! pool handles, variant kinds, error types, and the two seams that let the
//! arena stay ignorant of tree layout ([`PoolNode`]) and of where its
//! backing memory comes from ([`Allocator`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod kind;
pub mod traits;

pub use error::{ConfigError, PoolError};
pub use id::{SlotId, StringId};
pub use kind::VariantKind;
pub use traits::{Allocator, PoolNode, PoolRef};
