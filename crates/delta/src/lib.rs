#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Block-matching delta generation and application.
//!
//! Given a basis file's block signature, finds which ranges of a new file
//! already exist in the basis and produces a compact script of literal and
//! copy instructions that reconstructs the new file from that basis plus
//! the literal bytes it carries.
//!
//! The matching algorithm is the classic rsync one: slide a window of the
//! basis's fixed block length across the input one byte at a time, compare
//! its weak rolling checksum against an index of the basis's block
//! checksums, and confirm candidate hits with a strong digest before
//! committing to a copy.
//!
//! Finding a similarly-named or similarly-sized file to use as a basis
//! when the destination has no matching file at all is out of scope for
//! this crate; it only ever matches against the one basis file it is
//! given.

mod apply;
mod error;
mod generate;
mod index;
mod script;
mod token;
pub mod wire;

pub use apply::{apply_delta, apply_delta_stream, AppliedStats};
pub use error::DeltaError;
pub use generate::{generate_delta, generate_delta_slice};
pub use index::DeltaSignatureIndex;
pub use script::DeltaScript;
pub use token::DeltaToken;
