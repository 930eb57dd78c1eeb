#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Wire codec for the delta-synchronization engine.
//!
//! The wire is a single byte stream carrying, in order, a file-list section
//! (`FileInfo` records terminated by a sentinel) followed by a
//! concurrent-frame section (tag-framed messages interleaved by both peers).
//! All integers are big-endian.

mod error;
mod file_info;
mod frame;
mod primitives;

pub use error::WireError;
pub use file_info::{FileInfo, FileType, MODE_DIR, MODE_REG_EXEC, MODE_REG_NONEXEC};
pub use frame::{Frame, FrameTag, read_frame, write_chunk, write_end_of_exchange, write_file_data_header};
pub use primitives::{read_byte_array, read_string, write_byte_array, write_string};

/// Sentinel path that terminates the file-list phase.
pub const SENTINEL_PATH: &str = "\u{0}";
