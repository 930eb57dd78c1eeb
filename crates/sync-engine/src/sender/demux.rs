use std::collections::HashMap;
use std::io::Read;

use crossbeam_channel::Sender;
use wire::{read_frame, Frame, WireError};

use crate::cancel::CancellationToken;
use crate::EngineError;

/// Reads phase-2 frames arriving from the receiver: whole-file requests
/// and reassembled signature blobs. Stops at `EndOfExchange`, dropping its
/// sender handles so downstream channels close in turn.
///
/// # Errors
///
/// Returns [`EngineError::Wire`] on a malformed frame or an out-of-range
/// id, and [`EngineError::Protocol`] if a frame that only ever flows
/// sender-to-receiver (`deltaData`) arrives here instead.
pub fn run(
    mut reader: impl Read,
    known_ids: u32,
    requested_tx: Sender<u32>,
    sig_complete_tx: Sender<(u32, Vec<u8>)>,
    cancel: &CancellationToken,
) -> Result<(), EngineError> {
    let mut pending: HashMap<u32, Vec<u8>> = HashMap::new();

    loop {
        let frame = read_frame(&mut reader)?;
        match frame {
            Frame::EndOfExchange => {
                tracing::debug!("inbound demultiplexer observed end of exchange");
                return Ok(());
            }
            Frame::FileDataHeader { id, size } => {
                check_id(id, known_ids)?;
                if size != 0 {
                    return Err(EngineError::Protocol(format!(
                        "file request for id {id} carried a nonzero size {size}"
                    )));
                }
                if cancel.is_cancelled() {
                    continue;
                }
                let _ = requested_tx.send(id);
            }
            Frame::SignatureChunk { id, chunk } => {
                check_id(id, known_ids)?;
                if cancel.is_cancelled() {
                    continue;
                }
                if chunk.is_empty() {
                    let buf = pending.remove(&id).unwrap_or_default();
                    let _ = sig_complete_tx.send((id, buf));
                } else {
                    pending.entry(id).or_default().extend_from_slice(&chunk);
                }
            }
            Frame::DeltaChunk { id, .. } => {
                return Err(EngineError::Protocol(format!("unexpected deltaData frame for id {id}")));
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
