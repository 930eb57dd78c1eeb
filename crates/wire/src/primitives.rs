use std::io::{Read, Write};

use crate::WireError;

/// Writes a length-prefixed byte array: a big-endian `u32` length followed
/// by that many raw bytes. A zero length is a valid, empty array.
pub fn write_byte_array(w: &mut impl Write, bytes: &[u8]) -> Result<(), WireError> {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    w.write_all(&len.to_be_bytes())?;
    w.write_all(bytes)?;
    Ok(())
}

/// Reads a length-prefixed byte array written by [`write_byte_array`].
pub fn read_byte_array(r: &mut impl Read) -> Result<Vec<u8>, WireError> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Writes a UTF-8 string as a length-prefixed byte array.
pub fn write_string(w: &mut impl Write, s: &str) -> Result<(), WireError> {
    write_byte_array(w, s.as_bytes())
}

/// Reads a UTF-8 string written by [`write_string`].
pub fn read_string(r: &mut impl Read) -> Result<String, WireError> {
    let bytes = read_byte_array(r)?;
    String::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn byte_array_round_trips() {
        let mut buf = Vec::new();
        write_byte_array(&mut buf, b"hello world").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_byte_array(&mut cursor).unwrap(), b"hello world");
    }

    #[test]
    fn empty_byte_array_round_trips() {
        let mut buf = Vec::new();
        write_byte_array(&mut buf, &[]).unwrap();
        assert_eq!(buf, 0u32.to_be_bytes());
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_byte_array(&mut cursor).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn string_round_trips_utf8() {
        let mut buf = Vec::new();
        write_string(&mut buf, "héllo/wörld.txt").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_string(&mut cursor).unwrap(), "héllo/wörld.txt");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut buf = Vec::new();
        write_byte_array(&mut buf, &[0xff, 0xfe]).unwrap();
        let mut cursor = Cursor::new(buf);
        assert!(matches!(read_string(&mut cursor), Err(WireError::InvalidUtf8)));
    }
}
