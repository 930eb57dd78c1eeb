//! In-memory duplex transport, for running both peers of a session in one
//! process (tests, loopback sync to the same host).

use std::io;
use std::io::{PipeReader, PipeWriter};

/// One peer's half of a duplex connection: reads what the other peer
/// writes, writes what the other peer reads.
pub type DuplexHalf = (PipeReader, PipeWriter);

/// Builds two connected, in-memory duplex halves.
///
/// # Errors
///
/// Returns an error if the underlying OS pipes cannot be created.
pub fn duplex() -> io::Result<(DuplexHalf, DuplexHalf)> {
    let (a_read, b_write) = io::pipe()?;
    let (b_read, a_write) = io::pipe()?;
    Ok(((a_read, a_write), (b_read, b_write)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn bytes_written_on_one_side_are_read_on_the_other() {
        let ((mut a_read, mut a_write), (mut b_read, mut b_write)) = duplex().unwrap();

        a_write.write_all(b"hello from a").unwrap();
        drop(a_write);
        let mut buf = Vec::new();
        b_read.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello from a");

        b_write.write_all(b"hello from b").unwrap();
        drop(b_write);
        let mut buf = Vec::new();
        a_read.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello from b");
    }
}
