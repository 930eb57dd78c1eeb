#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Deterministic filesystem tree traversal.
//!
//! Walks a directory tree in a fixed, sorted order so that two walks of an
//! unchanged tree produce an identical sequence of entries — the property
//! the source-side file-list emitter and the destination-side deletion
//! pass both rely on. Callers supply a visit callback; this crate owns
//! nothing about what the callback does with what it's handed.

mod entry;
mod error;
mod walker;

pub use entry::{EntryKind, EntryStat};
pub use error::WalkError;
pub use walker::{default_traverser, walk, Traverser, Visit};
