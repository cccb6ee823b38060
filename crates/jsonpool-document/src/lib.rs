//! JSON documents backed by a single fixed-capacity pool.
//!
//! A [`Document`] pairs one pool with one root value and gives the pair
//! value semantics: `clone` deep-copies into a fresh pool, [`Document::take`]
//! and [`Document::move_from`] transfer the pool and leave the source Empty.
//! Running out of capacity is not an error; it sets the sticky
//! [`overflowed`](Document::overflowed) flag and the failed mutation is a
//! no-op.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod document;

pub use document::Document;
