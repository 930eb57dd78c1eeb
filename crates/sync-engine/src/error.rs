use std::io;

use wire::WireError;

/// Errors raised while running a sender or receiver session.
///
/// Only failures that abort the whole session reach this type. A failure
/// scoped to one file (a classify error, a local I/O error while patching)
/// is logged and accounted for in [`crate::EngineStats`] instead of
/// propagating here — see the per-stage modules for exactly which errors
/// are fatal versus per-file.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A wire codec violation: malformed framing, an unknown tag, or a
    /// frame that does not belong in the direction it arrived from.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Reading or writing the session's own transport streams failed,
    /// outside of a specific file's reconciliation.
    #[error("session I/O error: {0}")]
    Io(#[from] io::Error),

    /// A pipeline worker thread panicked rather than returning an error.
    #[error("worker thread panicked: {0}")]
    WorkerPanicked(String),

    /// The session was cancelled before it completed normally.
    #[error("session was cancelled")]
    Cancelled,

    /// A frame arrived that does not belong in the direction it arrived
    /// from, or otherwise violates the session's phase-2 protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),
}
