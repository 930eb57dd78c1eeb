use std::io;

/// Errors raised while encoding or decoding wire primitives.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The underlying stream failed.
    #[error("wire I/O error: {0}")]
    Io(#[from] io::Error),

    /// A string field was not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A frame carried an unrecognized tag byte.
    #[error("unknown frame tag {0:#04x}")]
    UnknownTag(u8),

    /// A `fileData` frame declared a size that did not match the bytes the
    /// sender actually wrote.
    #[error("declared file size {declared} does not match {actual} bytes written")]
    SizeMismatch { declared: u64, actual: u64 },

    /// A `FileInfo`'s mode indicated a file type this engine does not
    /// support.
    #[error("unsupported file mode {0:#010x}")]
    UnsupportedMode(u32),

    /// A post-list frame referenced an `id` that was never announced during
    /// the file-list phase.
    #[error("frame referenced out-of-range id {id} (only {known} files known)")]
    IdOutOfRange { id: u32, known: u32 },
}
