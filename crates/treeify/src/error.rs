use std::io;
use std::path::PathBuf;

/// Errors raised while reconciling the local filesystem against the
/// incoming file list.
#[derive(Debug, thiserror::Error)]
pub enum TreeifyError {
    /// A stat, readlink, remove, create, or rename call failed.
    #[error("failed to reconcile {path}: {source}")]
    Io {
        /// The path the failing operation was performed on.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A `FileInfo` carried a file type this engine does not support.
    #[error("unsupported file mode {0:#010x}")]
    UnsupportedMode(u32),
}

impl TreeifyError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}
