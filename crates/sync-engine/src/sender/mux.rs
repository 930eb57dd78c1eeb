use std::fs;
use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Select};
use wire::{write_chunk, write_end_of_exchange, write_file_data_header, FrameTag};

use crate::session::FileTable;
use crate::EngineError;

/// The sender's single outbound writer: serializes whole-file responses
/// (triggered by requests arriving on `requested_rx`) and delta chunks
/// (produced by the delta worker pool on `delta_rx`) onto one stream,
/// never blocking one in a way that starves the other.
///
/// Ends the stream with `endOfExchange` once both channels have
/// disconnected — the inbound demultiplexer closed `requested_tx` at
/// `EndOfExchange`, and the last delta worker closed `delta_tx` when
/// `sig_complete_rx` disconnected in turn.
///
/// # Errors
///
/// Returns [`EngineError::Io`] if reading a requested source file fails,
/// and [`EngineError::Wire`] if writing a frame fails.
pub fn run(
    writer: &mut impl Write,
    requested_rx: &Receiver<u32>,
    delta_rx: &Receiver<(u32, Vec<u8>)>,
    table: &Arc<FileTable>,
) -> Result<(), EngineError> {
    let mut requested_open = true;
    let mut delta_open = true;

    while requested_open || delta_open {
        let mut select = Select::new();
        let req_index = requested_open.then(|| select.recv(requested_rx));
        let delta_index = delta_open.then(|| select.recv(delta_rx));

        let oper = select.select();
        let index = oper.index();

        if Some(index) == req_index {
            match oper.recv(requested_rx) {
                Ok(id) => send_whole_file(writer, id, table)?,
                Err(_) => requested_open = false,
            }
        } else if Some(index) == delta_index {
            match oper.recv(delta_rx) {
                Ok((id, chunk)) => write_chunk(writer, FrameTag::DeltaData, id, &chunk)?,
                Err(_) => delta_open = false,
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

fn send_whole_file(writer: &mut impl Write, id: u32, table: &Arc<FileTable>) -> Result<(), EngineError> {
    let Some((_info, path)) = table.get(id) else {
        tracing::warn!(id, "request for unknown id ignored");
        return Ok(());
    };

    let data = fs::read(path).unwrap_or_else(|err| {
        tracing::warn!(id, path = %path.display(), %err, "failed to read requested file, sending empty body");
        Vec::new()
    });

    write_file_data_header(writer, id, data.len() as u64)?;
    writer.write_all(&data)?;
    tracing::debug!(id, bytes = data.len(), "whole file sent");
    Ok(())
}
