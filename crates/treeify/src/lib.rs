#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Local filesystem reconciliation for the delta-synchronization engine.
//!
//! Everything the receiver does to its destination tree that is not wire
//! protocol or delta math lives here: deciding whether an existing entry
//! is already up to date, materializing directories and symlinks, deriving
//! the mode a regular file is written with, and replacing file contents
//! atomically via a sibling temp file and rename.
//!
//! This crate never touches the network; it only ever sees [`wire::FileInfo`]
//! records the caller has already received and local paths the caller has
//! already resolved.

mod classify;
mod delete;
mod error;
mod materialize;
mod mode;

pub use classify::{classify, Classification};
pub use delete::delete_extraneous;
pub use error::TreeifyError;
pub use materialize::{create_whole_file, materialize_directory, materialize_symlink, replace_with_temp_file, set_mtime};
pub use mode::{derive_regular_mode, is_executable};
