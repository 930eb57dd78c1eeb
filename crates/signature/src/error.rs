use std::io;

/// Errors raised while generating a file signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// Reading the basis file failed, including a short read where the
    /// caller's declared file length promised more bytes than were present.
    #[error("failed to read basis file: {0}")]
    Io(#[from] io::Error),

    /// The basis file was longer than the length the layout was computed
    /// from; the stream has bytes beyond what the signature covers.
    #[error("basis file has trailing data beyond its declared length")]
    TrailingData,

    /// A serialized signature ended before its declared block count was
    /// satisfied, or its block length was zero.
    #[error("signature data ended unexpectedly or was malformed")]
    Truncated,
}
