use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use delta::{generate_delta_slice, DeltaSignatureIndex};

use crate::cancel::CancellationToken;
use crate::params;
use crate::session::FileTable;
use crate::EngineError;

/// One delta worker: takes a completed basis signature off
/// `sig_complete_rx`, reads the matching source file, matches it against
/// the signature, and streams the resulting delta script out in
/// [`params::CHUNK_SIZE`]-sized chunks on `delta_tx`, terminated by an
/// empty chunk.
///
/// Runs until `sig_complete_rx` disconnects (every producer — the inbound
/// demultiplexer — has stopped sending). A file this worker cannot read is
/// logged and the id is skipped entirely rather than aborting the session
/// or emitting a delta: the receiver never blocks waiting on a specific
/// id's terminator (its demultiplexer only opens a patch reader on an id's
/// first chunk and otherwise keeps draining frames until `endOfExchange`),
/// so there is nothing to unblock by sending a synthetic empty script, and
/// doing so would apply a content-empty delta and silently truncate the
/// destination file.
pub fn run(
    sig_complete_rx: &Receiver<(u32, Vec<u8>)>,
    delta_tx: &Sender<(u32, Vec<u8>)>,
    table: &Arc<FileTable>,
    cancel: &CancellationToken,
) -> Result<(), EngineError> {
    while let Ok((id, raw_signature)) = sig_complete_rx.recv() {
        if cancel.is_cancelled() {
            continue;
        }

        let Some((_info, path)) = table.get(id) else {
            tracing::warn!(id, "delta worker received signature for unknown id");
            continue;
        };

        let index = signature::wire::read_file_signature(&mut Cursor::new(raw_signature))
            .map(|sig| DeltaSignatureIndex::from_signature(&sig).unwrap_or_else(|| DeltaSignatureIndex::empty(params::BLOCK_LEN)))
            .unwrap_or_else(|err| {
                tracing::warn!(id, %err, "failed to decode basis signature, treating as empty");
                DeltaSignatureIndex::empty(params::BLOCK_LEN)
            });

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(id, path = %path.display(), %err, "failed to read source file for delta generation, skipping");
                continue;
            }
        };

        let script = generate_delta_slice(&data, &index);
        tracing::debug!(id, literal = script.literal_bytes(), copy = script.copy_bytes(), "delta generated");

        let mut encoded = Vec::new();
        delta::wire::write_delta_script(&mut encoded, &script)?;

        for chunk in encoded.chunks(params::CHUNK_SIZE) {
            if delta_tx.send((id, chunk.to_vec())).is_err() {
                return Ok(());
            }
        }
        if delta_tx.send((id, Vec::new())).is_err() {
            return Ok(());
        }
    }
    Ok(())
}
