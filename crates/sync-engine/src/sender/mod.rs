//! The sender side of a session: phase 1 walks the source tree and emits
//! the file list; phase 2 answers whatever the receiver asks for (whole
//! files or delta matches against a signature) until the receiver signals
//! it is done.

mod demux;
mod list_emit;
mod mux;
mod workers;

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use walk::Traverser;

use crate::cancel::CancellationToken;
use crate::params;
use crate::stats::StatsCollector;
use crate::{EngineError, EngineStats};

/// Runs the sender side of one session: announces every entry under
/// `root` (via `traverser`) to `writer`, then answers whole-file and
/// signature-driven delta requests arriving on `reader` until the
/// receiver sends `endOfExchange`.
///
/// # Errors
///
/// Returns [`EngineError`] if the file-list phase fails, if a phase-2
/// frame violates the protocol, or if a worker thread panics. Per-file
/// read failures during phase 2 are logged and do not fail the session.
pub fn send_files<R, W>(
    reader: R,
    writer: W,
    root: &Path,
    traverser: &Traverser<'_>,
) -> Result<EngineStats, EngineError>
where
    R: Read + Send + 'static,
    W: Write,
{
    send_files_with_cancellation(reader, writer, root, traverser, &CancellationToken::new())
}

/// Same as [`send_files`], but lets the caller supply a [`CancellationToken`]
/// shared with other code — calling [`CancellationToken::cancel`] on it (or
/// any of its clones) from another thread cancels this session at its next
/// suspension point, per phase 2. The caller is responsible for closing or
/// abandoning `reader`/`writer` afterward; this function never closes the
/// stream itself.
///
/// # Errors
///
/// Same as [`send_files`], plus a cancellation is reported as
/// [`EngineError::Cancelled`] if no other error occurred first.
pub fn send_files_with_cancellation<R, W>(
    mut reader: R,
    mut writer: W,
    root: &Path,
    traverser: &Traverser<'_>,
    cancel: &CancellationToken,
) -> Result<EngineStats, EngineError>
where
    R: Read + Send + 'static,
    W: Write,
{
    let cancel = cancel.clone();
    let stats = StatsCollector::new();

    let table = list_emit::emit_file_list(&mut writer, root, traverser, &stats)?;
    let table = Arc::new(table);
    let known_ids = table.len();

    let (requested_tx, requested_rx) = bounded::<u32>(params::CHANNEL_CAPACITY);
    let (sig_complete_tx, sig_complete_rx) = bounded::<(u32, Vec<u8>)>(params::CHANNEL_CAPACITY);
    let (delta_tx, delta_rx) = bounded::<(u32, Vec<u8>)>(params::CHANNEL_CAPACITY);

    let demux_cancel = cancel.clone();
    let demux_handle = thread::spawn(move || demux::run(reader, known_ids, requested_tx, sig_complete_tx, &demux_cancel));

    let mut worker_handles = Vec::new();
    for _ in 0..params::worker_pool_size() {
        let sig_complete_rx = sig_complete_rx.clone();
        let delta_tx = delta_tx.clone();
        let table = Arc::clone(&table);
        let cancel = cancel.clone();
        worker_handles.push(thread::spawn(move || workers::run(&sig_complete_rx, &delta_tx, &table, &cancel)));
    }
    drop(sig_complete_rx);
    drop(delta_tx);

    let mux_result = mux::run(&mut writer, &requested_rx, &delta_rx, &table);
    // Unblocks any demux/worker thread parked on a full channel after an
    // early mux failure, so the joins below cannot deadlock.
    drop(requested_rx);
    drop(delta_rx);

    let demux_result = join(demux_handle);
    let mut first_error = mux_result.err().or_else(|| demux_result.err());
    for handle in worker_handles {
        let result = join(handle);
        if first_error.is_none() {
            first_error = result.err();
        }
    }

    if let Some(err) = first_error {
        cancel.cancel();
        return Err(err);
    }

    Ok(stats.finalize())
}

fn join(handle: thread::JoinHandle<Result<(), EngineError>>) -> Result<(), EngineError> {
    match handle.join() {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(EngineError::WorkerPanicked(message))
        }
    }
}
