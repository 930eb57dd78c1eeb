use std::io;

/// Errors raised while generating or applying a delta script.
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    /// Reading the input, the basis file, or writing the output failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A token stream ended partway through a token's fields.
    #[error("delta token stream ended mid-token")]
    TruncatedToken,

    /// A copy token's block index, multiplied by the block length, does
    /// not fit in a byte offset.
    #[error("copy token references an out-of-range basis offset")]
    InvalidCopyRange,
}
