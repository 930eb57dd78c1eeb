#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! File signature layout and generation.
//!
//! A signature is the receiver's compact fingerprint of an existing
//! (possibly stale) destination file: one fixed-size block's weak rolling
//! checksum plus a truncated strong digest, for every block in the file.
//! The sender uses it to find which ranges of the destination file already
//! match the source and can be copied rather than retransmitted.
//!
//! Block length and strong-digest length are fixed, compile-time constants
//! shared by both peers (see `sync_engine::params`) — this crate has no
//! notion of protocol negotiation.

mod block;
mod error;
mod file_signature;
mod generate;
mod layout;
pub mod wire;

pub use block::SignatureBlock;
pub use error::SignatureError;
pub use file_signature::FileSignature;
pub use generate::generate_file_signature;
pub use layout::SignatureLayout;
