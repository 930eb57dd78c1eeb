use std::io::{Read, Write};

use crate::primitives::{read_byte_array, write_byte_array};
use crate::WireError;

/// Single-byte tag identifying a post-file-list frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameTag {
    /// Carries a whole file payload from sender to receiver, or (in the
    /// sender-bound direction) a pure "send me the whole file" request.
    FileData = 0x01,
    /// Carries one chunk of a signature blob, receiver to sender.
    SignatureData = 0x02,
    /// Carries one chunk of a delta blob, sender to receiver.
    DeltaData = 0x03,
    /// Terminator: the sending peer will write no more frames this session.
    EndOfExchange = 0x04,
}

impl TryFrom<u8> for FrameTag {
    type Error = WireError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Self::FileData),
            0x02 => Ok(Self::SignatureData),
            0x03 => Ok(Self::DeltaData),
            0x04 => Ok(Self::EndOfExchange),
            other => Err(WireError::UnknownTag(other)),
        }
    }
}

/// A decoded post-file-list frame.
///
/// `FileData`'s body (exactly `size` bytes) is *not* buffered into this
/// enum — the caller reads it directly off the stream immediately after
/// receiving [`Frame::FileDataHeader`], so whole-file transfer never
/// requires holding the file in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Header for a whole-file frame; the body follows on the stream.
    FileDataHeader { id: u32, size: u64 },
    /// One chunk of a signature stream for `id`. An empty `chunk` is the
    /// end-of-stream marker for that id.
    SignatureChunk { id: u32, chunk: Vec<u8> },
    /// One chunk of a delta stream for `id`. An empty `chunk` is the
    /// end-of-stream marker for that id.
    DeltaChunk { id: u32, chunk: Vec<u8> },
    /// The peer will send no more frames.
    EndOfExchange,
}

fn read_id(r: &mut impl Read) -> Result<u32, WireError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn write_id(w: &mut impl Write, id: u32) -> Result<(), WireError> {
    w.write_all(&id.to_be_bytes())?;
    Ok(())
}

/// Reads the next frame off the stream.
///
/// For [`Frame::FileDataHeader`] the caller must immediately read exactly
/// `size` bytes off the same stream before requesting the next frame.
pub fn read_frame(r: &mut impl Read) -> Result<Frame, WireError> {
    let mut tag_buf = [0u8; 1];
    r.read_exact(&mut tag_buf)?;
    let tag = FrameTag::try_from(tag_buf[0])?;

    match tag {
        FrameTag::EndOfExchange => Ok(Frame::EndOfExchange),
        FrameTag::FileData => {
            let id = read_id(r)?;
            let mut size_buf = [0u8; 8];
            r.read_exact(&mut size_buf)?;
            Ok(Frame::FileDataHeader {
                id,
                size: u64::from_be_bytes(size_buf),
            })
        }
        FrameTag::SignatureData => {
            let id = read_id(r)?;
            let chunk = read_byte_array(r)?;
            Ok(Frame::SignatureChunk { id, chunk })
        }
        FrameTag::DeltaData => {
            let id = read_id(r)?;
            let chunk = read_byte_array(r)?;
            Ok(Frame::DeltaChunk { id, chunk })
        }
    }
}

/// Writes a `fileData` header (`[tag][id][size]`). The caller must follow
/// this with exactly `size` bytes of file content on the same stream.
pub fn write_file_data_header(w: &mut impl Write, id: u32, size: u64) -> Result<(), WireError> {
    w.write_all(&[FrameTag::FileData as u8])?;
    write_id(w, id)?;
    w.write_all(&size.to_be_bytes())?;
    Ok(())
}

/// Writes one `signatureData`/`deltaData` chunk frame. Pass an empty
/// `chunk` to emit the end-of-stream marker for `id`.
pub fn write_chunk(w: &mut impl Write, tag: FrameTag, id: u32, chunk: &[u8]) -> Result<(), WireError> {
    debug_assert!(matches!(tag, FrameTag::SignatureData | FrameTag::DeltaData));
    w.write_all(&[tag as u8])?;
    write_id(w, id)?;
    write_byte_array(w, chunk)?;
    Ok(())
}

/// Writes the `endOfExchange` terminator (`[tag]` alone).
pub fn write_end_of_exchange(w: &mut impl Write) -> Result<(), WireError> {
    w.write_all(&[FrameTag::EndOfExchange as u8])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn file_data_header_round_trips() {
        let mut buf = Vec::new();
        write_file_data_header(&mut buf, 7, 4096).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            read_frame(&mut cursor).unwrap(),
            Frame::FileDataHeader { id: 7, size: 4096 }
        );
    }

    #[test]
    fn signature_chunk_round_trips() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, FrameTag::SignatureData, 3, b"abc").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            read_frame(&mut cursor).unwrap(),
            Frame::SignatureChunk { id: 3, chunk: b"abc".to_vec() }
        );
    }

    #[test]
    fn zero_length_chunk_is_end_of_stream_marker() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, FrameTag::DeltaData, 9, &[]).unwrap();
        let mut cursor = Cursor::new(buf);
        match read_frame(&mut cursor).unwrap() {
            Frame::DeltaChunk { id, chunk } => {
                assert_eq!(id, 9);
                assert!(chunk.is_empty());
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn end_of_exchange_round_trips() {
        let mut buf = Vec::new();
        write_end_of_exchange(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_frame(&mut cursor).unwrap(), Frame::EndOfExchange);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut cursor = Cursor::new(vec![0xaa]);
        assert!(matches!(read_frame(&mut cursor), Err(WireError::UnknownTag(0xaa))));
    }

    #[test]
    fn sequence_of_frames_for_multiple_ids_interleaves() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, FrameTag::DeltaData, 1, b"aa").unwrap();
        write_chunk(&mut buf, FrameTag::DeltaData, 2, b"bb").unwrap();
        write_chunk(&mut buf, FrameTag::DeltaData, 1, &[]).unwrap();
        write_chunk(&mut buf, FrameTag::DeltaData, 2, &[]).unwrap();
        write_end_of_exchange(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let frames: Vec<_> = std::iter::from_fn(|| match read_frame(&mut cursor) {
            Ok(Frame::EndOfExchange) => None,
            Ok(frame) => Some(frame),
            Err(e) => panic!("{e}"),
        })
        .collect();

        assert_eq!(frames.len(), 4);
    }
}
