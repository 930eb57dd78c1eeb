//! The receiver side of a session: phase 1 reads the incoming file list,
//! deletes whatever locally present entry it does not cover, and
//! classifies every remaining entry; phase 2 signs and patches files that
//! differ and fetches those that are missing entirely, until its own
//! inbound stream ends.

mod demux;
mod mux;
mod reconcile;
mod workers;

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use dashmap::DashMap;

use crate::cancel::CancellationToken;
use crate::chunk_pipe::ChunkReader;
use crate::params;
use crate::stats::StatsCollector;
use crate::{EngineError, EngineStats};

/// Runs the receiver side of one session: reads the file list from
/// `reader`, reconciles `root` against it, and answers over `writer` with
/// whatever requests classification produced, until every pipeline stage
/// has drained.
///
/// # Errors
///
/// Returns [`EngineError`] if the file-list phase fails, if a phase-2
/// frame violates the protocol, or if a worker thread panics. Per-file
/// classify, materialize, sign, or patch failures are logged and do not
/// fail the session.
pub fn receive_files<R, W>(reader: R, writer: W, root: &Path) -> Result<EngineStats, EngineError>
where
    R: Read + Send + 'static,
    W: Write,
{
    receive_files_with_cancellation(reader, writer, root, &CancellationToken::new())
}

/// Same as [`receive_files`], but lets the caller supply a
/// [`CancellationToken`] shared with other code — calling
/// [`CancellationToken::cancel`] on it (or any of its clones) from another
/// thread cancels this session at its next suspension point, per phase 2.
/// The caller is responsible for closing or abandoning `reader`/`writer`
/// afterward; this function never closes the stream itself.
///
/// # Errors
///
/// Same as [`receive_files`].
pub fn receive_files_with_cancellation<R, W>(
    mut reader: R,
    mut writer: W,
    root: &Path,
    cancel: &CancellationToken,
) -> Result<EngineStats, EngineError>
where
    R: Read + Send + 'static,
    W: Write,
{
    let cancel = cancel.clone();
    let stats = StatsCollector::new();

    // Phase 1 owns `reader` exclusively; it must finish before `demux`
    // below takes over reading phase-2 frames off the same stream.
    let table = reconcile::build_table(&mut reader, root)?;
    let table = Arc::new(table);
    let known_ids = table.len();

    let (missing_tx, missing_rx) = bounded::<u32>(params::CHANNEL_CAPACITY);
    let (differing_tx, differing_rx) = bounded::<u32>(params::CHANNEL_CAPACITY);
    let (sig_chunks_tx, sig_chunks_rx) = bounded::<(u32, Vec<u8>)>(params::CHANNEL_CAPACITY);
    let (deltas_tx, deltas_rx) = bounded::<(u32, ChunkReader)>(params::CHANNEL_CAPACITY);
    let index_map = Arc::new(DashMap::new());

    let demux_cancel = cancel.clone();
    let demux_stats = stats.clone();
    let demux_table = Arc::clone(&table);
    let demux_handle = thread::spawn(move || {
        demux::run(reader, known_ids, &demux_table, deltas_tx, &demux_stats, &demux_cancel)
    });

    let mut worker_handles = Vec::new();
    for _ in 0..params::worker_pool_size() {
        let differing_rx = differing_rx.clone();
        let sig_chunks_tx = sig_chunks_tx.clone();
        let table = Arc::clone(&table);
        let index_map = Arc::clone(&index_map);
        let cancel = cancel.clone();
        worker_handles.push(thread::spawn(move || {
            workers::run_signature_worker(&differing_rx, &table, &index_map, &sig_chunks_tx, &cancel)
        }));
    }
    for _ in 0..params::worker_pool_size() {
        let deltas_rx = deltas_rx.clone();
        let table = Arc::clone(&table);
        let index_map = Arc::clone(&index_map);
        let stats = stats.clone();
        let cancel = cancel.clone();
        worker_handles.push(thread::spawn(move || {
            workers::run_patch_worker(&deltas_rx, &table, &index_map, &stats, &cancel)
        }));
    }
    drop(differing_rx);
    drop(sig_chunks_tx);
    drop(deltas_rx);

    // Only now, with the signature worker pool already draining
    // `differing_rx` and the outbound mux about to drain `missing_rx`, is
    // it safe to start classification: it sends on both channels and a
    // tree with more than `CHANNEL_CAPACITY` missing or differing entries
    // would otherwise block forever on a channel nobody is reading yet.
    let classify_table = Arc::clone(&table);
    let classify_stats = stats.clone();
    let classify_handle = thread::spawn(move || -> Result<(), EngineError> {
        reconcile::classify(&classify_table, &classify_stats, missing_tx, differing_tx);
        Ok(())
    });

    let mux_result = mux::run(&mut writer, &missing_rx, &sig_chunks_rx);
    drop(missing_rx);
    drop(sig_chunks_rx);

    let demux_result = join(demux_handle);
    let classify_result = join(classify_handle);
    let mut first_error = mux_result.err().or_else(|| demux_result.err()).or_else(|| classify_result.err());
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
