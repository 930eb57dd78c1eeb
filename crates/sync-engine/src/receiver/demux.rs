use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use crossbeam_channel::Sender;
use wire::{read_frame, Frame, WireError};

use crate::cancel::CancellationToken;
use crate::chunk_pipe::{chunk_pipe, ChunkReader, ChunkWriter};
use crate::params;
use crate::session::FileTable;
use crate::stats::StatsCollector;
use crate::EngineError;

/// Reads phase-2 frames arriving from the sender: whole-file bodies,
/// materialized directly, and delta chunks, routed by id to whichever
/// [`ChunkReader`] a patch worker is draining.
///
/// Stops at `EndOfExchange`, dropping every still-open `ChunkWriter` so
/// their readers observe a clean end of stream rather than hanging.
///
/// # Errors
///
/// Returns [`EngineError::Wire`] on a malformed frame or an out-of-range
/// id, and [`EngineError::Protocol`] if a frame that only ever flows
/// receiver-to-sender (`signatureData`) arrives here instead.
pub fn run(
    mut reader: impl Read,
    known_ids: u32,
    table: &Arc<FileTable>,
    deltas_tx: Sender<(u32, ChunkReader)>,
    stats: &StatsCollector,
    cancel: &CancellationToken,
) -> Result<(), EngineError> {
    let mut open_writers: HashMap<u32, ChunkWriter> = HashMap::new();

    loop {
        let frame = read_frame(&mut reader)?;
        match frame {
            Frame::EndOfExchange => {
                tracing::debug!("inbound demultiplexer observed end of exchange");
                return Ok(());
            }
            Frame::FileDataHeader { id, size } => {
                check_id(id, known_ids)?;
                let mut body = Vec::with_capacity(size.min(1 << 20) as usize);
                std::io::copy(&mut (&mut reader).take(size), &mut body)?;

                if cancel.is_cancelled() {
                    continue;
                }

                let Some((info, path)) = table.get(id) else {
                    tracing::warn!(id, "whole-file body received for unknown id");
                    continue;
                };

                let result = treeify::create_whole_file(
                    path,
                    &mut Cursor::new(body),
                    size,
                    info.mode,
                    info.mtime_secs,
                    info.mtime_nanos,
                );
                match result {
                    Ok(()) => stats.record_fetched_whole(),
                    Err(err) => tracing::warn!(id, path = %path.display(), %err, "failed to materialize whole file"),
                }
            }
            Frame::SignatureChunk { id, .. } => {
                return Err(EngineError::Protocol(format!("unexpected signatureData frame for id {id}")));
            }
            Frame::DeltaChunk { id, chunk } => {
                check_id(id, known_ids)?;
                if cancel.is_cancelled() {
                    open_writers.remove(&id);
                    continue;
                }

                // An id's writer is opened (and its reader published) on the
                // first chunk seen for it, even an empty one: a source file
                // truncated to nothing still produces a delta stream whose
                // only frame is the empty terminator, and that alone must be
                // enough to drive a patch worker that truncates the
                // destination.
                if !open_writers.contains_key(&id) {
                    let (writer, reader) = chunk_pipe(params::CHANNEL_CAPACITY);
                    open_writers.insert(id, writer);
                    if deltas_tx.send((id, reader)).is_err() {
                        tracing::warn!(id, "no patch worker available for delta stream");
                    }
                }

                if chunk.is_empty() {
                    open_writers.remove(&id);
                    continue;
                }

                if let Some(writer) = open_writers.get(&id) {
                    let _ = writer.send(chunk);
                }
            }
        }
    }
}

fn check_id(id: u32, known_ids: u32) -> Result<(), WireError> {
    if id >= known_ids {
        Err(WireError::IdOutOfRange { id, known: known_ids })
    } else {
        Ok(())
    }
}
