//! Serialization of a [`FileSignature`] to and from a byte stream.
//!
//! This is the payload carried inside a session's `signatureData` frames
//! (see `wire::Frame::SignatureChunk`): a flat, self-describing record with
//! no outer length prefix, since the frame layer already chunks and
//! terminates it.

use std::io::{self, Read, Write};
use std::num::NonZeroU32;

use checksums::RollingDigest;

use crate::{FileSignature, SignatureBlock, SignatureError, SignatureLayout};

/// Serializes `signature` to `writer`.
pub fn write_file_signature(writer: &mut impl Write, signature: &FileSignature) -> io::Result<()> {
    let layout = signature.layout();
    writer.write_all(&layout.block_length().get().to_be_bytes())?;
    writer.write_all(&signature.total_bytes().to_be_bytes())?;
    writer.write_all(&(signature.blocks().len() as u64).to_be_bytes())?;

    for block in signature.blocks() {
        writer.write_all(&block.rolling().value().to_be_bytes())?;
        writer.write_all(&(block.strong().len() as u8).to_be_bytes())?;
        writer.write_all(block.strong())?;
    }
    Ok(())
}

/// Reads a signature written by [`write_file_signature`].
///
/// Block byte lengths are not stored on the wire; they are recomputed from
/// `total_bytes` and `block_length`, the same way [`SignatureLayout::new`]
/// would have derived them from the basis file in the first place.
///
/// # Errors
///
/// Returns [`SignatureError::Truncated`] if the stream ends before the
/// declared block count is satisfied, or if the block length is zero, and
/// [`SignatureError::Io`] for any other read failure.
pub fn read_file_signature(reader: &mut impl Read) -> Result<FileSignature, SignatureError> {
    let block_len = read_u32(reader)?;
    let total_bytes = read_u64(reader)?;
    let block_count = read_u64(reader)?;

    let block_len = NonZeroU32::new(block_len).ok_or(SignatureError::Truncated)?;
    let layout = SignatureLayout::new(total_bytes, block_len);

    let mut blocks = Vec::with_capacity(block_count as usize);
    for index in 0..block_count {
        let value = read_u32(reader)?;
        let strong_len = read_u8(reader)? as usize;
        let mut strong = vec![0u8; strong_len];
        reader.read_exact(&mut strong).map_err(|_| SignatureError::Truncated)?;
        let byte_len = layout.block_len_at(index);
        blocks.push(SignatureBlock::from_raw_parts(index, byte_len, RollingDigest::from_value(value), strong));
    }

    Ok(FileSignature::from_raw_parts(layout, blocks, total_bytes))
}

fn read_u32(reader: &mut impl Read) -> Result<u32, SignatureError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(|_| SignatureError::Truncated)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64(reader: &mut impl Read) -> Result<u64, SignatureError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(|_| SignatureError::Truncated)?;
    Ok(u64::from_be_bytes(buf))
}

fn read_u8(reader: &mut impl Read) -> Result<u8, SignatureError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf).map_err(|_| SignatureError::Truncated)?;
    Ok(buf[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::num::NonZeroU8;

    use crate::generate_file_signature;

    fn sig_for(data: &[u8], block_len: u32) -> FileSignature {
        let layout = SignatureLayout::new(data.len() as u64, NonZeroU32::new(block_len).unwrap());
        generate_file_signature(Cursor::new(data.to_vec()), layout, NonZeroU8::new(8).unwrap()).unwrap()
    }

    #[test]
    fn signature_round_trips() {
        let sig = sig_for(b"the quick brown fox jumps over the lazy dog", 8);
        let mut buf = Vec::new();
        write_file_signature(&mut buf, &sig).unwrap();

        let read_back = read_file_signature(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back.total_bytes(), sig.total_bytes());
        assert_eq!(read_back.blocks().len(), sig.blocks().len());
        for (a, b) in read_back.blocks().iter().zip(sig.blocks()) {
            assert_eq!(a.len(), b.len());
            assert_eq!(a.strong(), b.strong());
            assert_eq!(a.rolling().value(), b.rolling().value());
        }
    }

    #[test]
    fn empty_signature_round_trips() {
        let sig = sig_for(b"", 700);
        let mut buf = Vec::new();
        write_file_signature(&mut buf, &sig).unwrap();

        let read_back = read_file_signature(&mut Cursor::new(buf)).unwrap();
        assert!(read_back.blocks().is_empty());
        assert_eq!(read_back.total_bytes(), 0);
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let sig = sig_for(b"some content here", 4);
        let mut buf = Vec::new();
        write_file_signature(&mut buf, &sig).unwrap();
        buf.truncate(buf.len() - 2);

        let result = read_file_signature(&mut Cursor::new(buf));
        assert!(matches!(result, Err(SignatureError::Truncated)));
    }
}
