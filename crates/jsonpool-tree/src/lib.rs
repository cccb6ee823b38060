//! The variant tree stored in a jsonpool pool.
//!
//! Every node is a [`Slot`]: a [`VariantData`] value plus the sibling link
//! and (for object members) the key. Arrays and objects hold the head and
//! tail of a singly linked chain of child slots. All links are
//! [`SlotId`](jsonpool_core::SlotId) indices into the pool, so compacting
//! the pool only renumbers them.
//!
//! - [`Tree`] is the mutation context: a root slot plus the pool.
//! - [`VariantRef`] reads; lookups that miss yield an unbound view that
//!   chains safely.
//! - [`VariantMut`] writes, creating members and elements on access.
//! - [`FromVariant`] / [`IntoVariant`] convert between Rust values and
//!   variants.
//!
//! Removal unlinks but never frees: a removed subtree's slots stay counted
//! until the pool is compacted from the root.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod convert;
pub mod read;
pub mod slot;
pub mod string;
pub mod tree;
pub mod visit;
pub mod write;

pub use convert::{FromVariant, IntoVariant};
pub use read::{Elements, Members, VariantRef};
pub use slot::{Collection, Resources, Slot, VariantData};
pub use string::{JsonString, StringRef};
pub use tree::{NodeId, Tree};
pub use visit::Visitor;
pub use write::VariantMut;
