//! Serialization of [`DeltaToken`]s to and from a byte stream.
//!
//! This is the on-the-wire shape of a delta script: a flat sequence of
//! tagged tokens with no overall length prefix or terminator beyond the
//! stream's own end, since the transport layer already knows where the
//! stream stops.

use std::io::{self, Read, Write};

use crate::{DeltaError, DeltaScript, DeltaToken};

const TAG_LITERAL: u8 = 0;
const TAG_COPY: u8 = 1;

/// Serializes every token of `script` to `writer`, in order.
pub fn write_delta_script(writer: &mut impl Write, script: &DeltaScript) -> io::Result<()> {
    for token in script.tokens() {
        write_delta_token(writer, token)?;
    }
    Ok(())
}

/// Serializes a single token to `writer`.
pub fn write_delta_token(writer: &mut impl Write, token: &DeltaToken) -> io::Result<()> {
    match token {
        DeltaToken::Literal(bytes) => {
            writer.write_all(&[TAG_LITERAL])?;
            writer.write_all(&(bytes.len() as u32).to_be_bytes())?;
            writer.write_all(bytes)?;
        }
        DeltaToken::Copy { index, len } => {
            writer.write_all(&[TAG_COPY])?;
            writer.write_all(&index.to_be_bytes())?;
            writer.write_all(&len.to_be_bytes())?;
        }
    }
    Ok(())
}

/// Reads the next token from `reader`, or `None` at a clean end of stream
/// (no bytes at all where a tag was expected).
///
/// # Errors
///
/// Returns [`DeltaError::TruncatedToken`] if the stream ends partway
/// through a token's fields, and [`DeltaError::Io`] for any other read
/// failure.
pub fn read_delta_token(reader: &mut impl Read) -> Result<Option<DeltaToken>, DeltaError> {
    let mut tag = [0u8; 1];
    if reader.read(&mut tag)? == 0 {
        return Ok(None);
    }

    match tag[0] {
        TAG_LITERAL => {
            let len = read_u32(reader)?;
            let mut bytes = vec![0u8; len as usize];
            reader.read_exact(&mut bytes).map_err(|_| DeltaError::TruncatedToken)?;
            Ok(Some(DeltaToken::Literal(bytes)))
        }
        TAG_COPY => {
            let index = read_u64(reader)?;
            let len = read_u32(reader)?;
            Ok(Some(DeltaToken::Copy { index, len }))
        }
        _ => Err(DeltaError::TruncatedToken),
    }
}

fn read_u32(reader: &mut impl Read) -> Result<u32, DeltaError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(|_| DeltaError::TruncatedToken)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64(reader: &mut impl Read) -> Result<u64, DeltaError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(|_| DeltaError::TruncatedToken)?;
    Ok(u64::from_be_bytes(buf))
}
