//! A bounded, in-process byte pipe between a frame demultiplexer and the
//! worker that consumes one id's reassembled chunk stream.
//!
//! This is what lets an inbound demultiplexer hand interleaved
//! `deltaData` chunks for many ids to many patch workers without
//! buffering a whole file's delta in memory: each id gets its own
//! [`ChunkReader`], fed chunk-by-chunk as frames for that id arrive.

use std::io::{self, Read};

use crossbeam_channel::{bounded, Receiver, Sender};

/// The producing half: the demultiplexer sends each chunk for one id here,
/// in order, and a final empty chunk (or simply dropping the writer) ends
/// the stream.
#[derive(Clone)]
pub struct ChunkWriter {
    tx: Sender<Vec<u8>>,
}

impl ChunkWriter {
    /// Sends one chunk of bytes to the paired [`ChunkReader`].
    ///
    /// # Errors
    ///
    /// Returns an error if the reader side has already been dropped (for
    /// example because the patch worker reading it failed and gave up).
    pub fn send(&self, chunk: Vec<u8>) -> Result<(), crossbeam_channel::SendError<Vec<u8>>> {
        self.tx.send(chunk)
    }
}

/// The consuming half: an [`io::Read`] implementation that blocks for the
/// next chunk when its internal buffer is drained, and reports a clean
/// end-of-file once the paired [`ChunkWriter`] is dropped.
pub struct ChunkReader {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
}

impl Read for ChunkReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.buf.len() {
                let n = (self.buf.len() - self.pos).min(out.len());
                out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            match self.rx.recv() {
                Ok(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
    }
}

/// Builds a connected [`ChunkWriter`]/[`ChunkReader`] pair with the given
/// channel capacity.
#[must_use]
pub fn chunk_pipe(capacity: usize) -> (ChunkWriter, ChunkReader) {
    let (tx, rx) = bounded(capacity);
    (ChunkWriter { tx }, ChunkReader { rx, buf: Vec::new(), pos: 0 })
}
