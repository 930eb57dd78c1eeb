use std::io::Write;

use crossbeam_channel::{Receiver, Select};
use wire::{write_chunk, write_end_of_exchange, write_file_data_header, FrameTag};

use crate::EngineError;

/// The receiver's single outbound writer: serializes whole-file requests
/// (produced by classification) and signature chunks (produced by the
/// signature worker pool) onto one stream.
///
/// Ends the stream with `endOfExchange` once both channels have
/// disconnected — classification closed `missing_tx` when it finished, and
/// the last signature worker closed `sig_chunks_tx` when `differing_rx`
/// disconnected in turn.
///
/// # Errors
///
/// Returns [`EngineError::Wire`] if writing a frame fails.
pub fn run(
    writer: &mut impl Write,
    missing_rx: &Receiver<u32>,
    sig_chunks_rx: &Receiver<(u32, Vec<u8>)>,
) -> Result<(), EngineError> {
    let mut missing_open = true;
    let mut sig_open = true;

    while missing_open || sig_open {
        let mut select = Select::new();
        let missing_index = missing_open.then(|| select.recv(missing_rx));
        let sig_index = sig_open.then(|| select.recv(sig_chunks_rx));

        let oper = select.select();
        let index = oper.index();

        if Some(index) == missing_index {
            match oper.recv(missing_rx) {
                Ok(id) => write_file_data_header(writer, id, 0)?,
                Err(_) => missing_open = false,
            }
        } else if Some(index) == sig_index {
            match oper.recv(sig_chunks_rx) {
                Ok((id, chunk)) => write_chunk(writer, FrameTag::SignatureData, id, &chunk)?,
                Err(_) => sig_open = false,
            }
        } else {
            unreachable!("select only ever reports a registered operation");
        }
    }

    write_end_of_exchange(writer)?;
    writer.flush()?;
    tracing::debug!("outbound multiplexer sent end of exchange");
    Ok(())
}
