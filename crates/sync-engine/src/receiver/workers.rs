use std::fs::File;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;
use delta::DeltaSignatureIndex;
use signature::{generate_file_signature, FileSignature, SignatureLayout};

use crate::cancel::CancellationToken;
use crate::chunk_pipe::ChunkReader;
use crate::params;
use crate::session::FileTable;
use crate::stats::StatsCollector;
use crate::EngineError;

/// Builds the signature of an entry with no readable local basis: zero
/// blocks, so the sender's delta generator produces an all-literal script
/// (equivalent to treating the entry as missing, but over the delta path
/// rather than a whole-file fetch).
fn empty_signature() -> FileSignature {
    FileSignature::from_raw_parts(SignatureLayout::new(0, params::block_len()), Vec::new(), 0)
}

/// One signature worker: takes an id needing reconciliation off
/// `differing_rx`, signs the existing local file, records the resulting
/// [`DeltaSignatureIndex`] in `index_map` for the matching patch worker to
/// use later, and streams the serialized signature out on `sig_chunks_tx`
/// in [`params::CHUNK_SIZE`] chunks terminated by an empty chunk.
///
/// Runs until `differing_rx` disconnects, which happens once the
/// classification pass in [`super::reconcile::classify`] completes.
pub fn run_signature_worker(
    differing_rx: &Receiver<u32>,
    table: &Arc<FileTable>,
    index_map: &Arc<DashMap<u32, DeltaSignatureIndex>>,
    sig_chunks_tx: &Sender<(u32, Vec<u8>)>,
    cancel: &CancellationToken,
) -> Result<(), EngineError> {
    while let Ok(id) = differing_rx.recv() {
        if cancel.is_cancelled() {
            continue;
        }

        let Some((_info, path)) = table.get(id) else {
            tracing::warn!(id, "signature worker received unknown id");
            continue;
        };

        let signature = File::open(path)
            .and_then(|file| {
                let len = file.metadata()?.len();
                let layout = SignatureLayout::new(len, params::block_len());
                generate_file_signature(file, layout, params::strong_len())
                    .map_err(|err| std::io::Error::other(err.to_string()))
            })
            .unwrap_or_else(|err| {
                tracing::warn!(id, path = %path.display(), %err, "failed to sign local file, treating as absent");
                empty_signature()
            });

        let index = DeltaSignatureIndex::from_signature(&signature).unwrap_or_else(|| DeltaSignatureIndex::empty(params::BLOCK_LEN));
        index_map.insert(id, index);

        let mut encoded = Vec::new();
        signature::wire::write_file_signature(&mut encoded, &signature)?;

        for chunk in encoded.chunks(params::CHUNK_SIZE) {
            if sig_chunks_tx.send((id, chunk.to_vec())).is_err() {
                return Ok(());
            }
        }
        if sig_chunks_tx.send((id, Vec::new())).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

/// One patch worker: takes a reassembled delta stream for one id off
/// `deltas_rx`, looks up the basis signature index [`super::demux::run`]
/// populated earlier, and replaces the local file's contents by applying
/// the delta against the file's current (pre-sync) bytes as the basis.
///
/// Runs until `deltas_rx` disconnects, which happens once the inbound
/// demultiplexer observes `endOfExchange`.
pub fn run_patch_worker(
    deltas_rx: &Receiver<(u32, ChunkReader)>,
    table: &Arc<FileTable>,
    index_map: &Arc<DashMap<u32, DeltaSignatureIndex>>,
    stats: &StatsCollector,
    cancel: &CancellationToken,
) -> Result<(), EngineError> {
    while let Ok((id, mut chunk_reader)) = deltas_rx.recv() {
        if cancel.is_cancelled() {
            let _ = std::io::copy(&mut chunk_reader, &mut std::io::sink());
            continue;
        }

        let Some((info, path)) = table.get(id) else {
            tracing::warn!(id, "patch worker received unknown id");
            let _ = std::io::copy(&mut chunk_reader, &mut std::io::sink());
            continue;
        };

        let fallback_block_len = index_map
            .get(&id)
            .map(|entry| entry.block_length())
            .unwrap_or(params::BLOCK_LEN);

        // Applied directly off `chunk_reader` token-by-token rather than
        // buffered into memory first: a delta for a multi-gigabyte file
        // would otherwise hold the whole thing in RAM before writing a
        // single byte to the temp file.
        let mut applied = None;
        let result = treeify::replace_with_temp_file(path, info.mode, |tmp_file| {
            let mut basis = File::open(path)?;
            let index = index_map.get(&id).map(|entry| entry.clone()).unwrap_or_else(|| DeltaSignatureIndex::empty(fallback_block_len));
            let stats = delta::apply_delta_stream(&mut basis, &mut chunk_reader, tmp_file, &index)
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            applied = Some(stats);
            Ok(())
        });

        match result {
            Ok(()) => {
                if let Err(err) = treeify::set_mtime(path, info.mtime_secs, info.mtime_nanos) {
                    tracing::warn!(id, path = %path.display(), %err, "failed to set mtime after patch");
                }
                let applied = applied.unwrap_or_default();
                stats.record_patched(applied.literal_bytes(), applied.copy_bytes());
            }
            Err(err) => {
                tracing::warn!(id, path = %path.display(), %err, "failed to apply delta, destination left untouched");
            }
        }
    }
    Ok(())
}
