use std::io;
use std::path::PathBuf;

/// Errors raised while walking a directory tree.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// A directory listing, stat, or symlink-target read failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path the failing operation was performed on.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An entry's name or symlink target is not valid UTF-8; the wire
    /// format only carries UTF-8 paths.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },
}
