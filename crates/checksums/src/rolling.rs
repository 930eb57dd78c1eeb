//! Weak rolling checksum (`rsum`) used for block-boundary candidate search.
//!
//! Mirrors the classic rsync Adler-32-style weak checksum: `s1` accumulates
//! the byte sum, `s2` accumulates the prefix sum, both truncated to 16 bits
//! after every update so the checksum packs into a stable `u32`.

use thiserror::Error;

/// Errors raised while rolling the checksum window forward.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RollingError {
    /// `roll` was called on a checksum that has not observed any bytes yet,
    /// so there is no window length to slide.
    #[error("cannot roll a checksum with an empty window")]
    EmptyWindow,
}

/// Saved `(s1, s2, len)` state, used to checkpoint a rolling checksum
/// without holding a borrow on the data that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RollingDigest {
    s1: u16,
    s2: u16,
    len: usize,
}

impl RollingDigest {
    /// Packs the digest into rsync's wire representation: `(s2 << 16) | s1`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.s2 as u32) << 16) | self.s1 as u32
    }

    /// Number of bytes the checksum was computed over.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the digest covers zero bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reconstructs a digest from its packed wire value (`value()`'s
    /// inverse). The byte count is not recoverable from the packed value
    /// alone and is set to zero; this is only meant for rebuilding a
    /// weak-checksum index keyed by `value()`, which never looks at `len`.
    #[must_use]
    pub const fn from_value(value: u32) -> Self {
        Self {
            s1: (value & 0xffff) as u16,
            s2: (value >> 16) as u16,
            len: 0,
        }
    }
}

/// Rolling (weak) checksum over a sliding window of bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RollingChecksum {
    s1: u32,
    s2: u32,
    len: usize,
}

impl RollingChecksum {
    /// Creates a checksum with an empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self { s1: 0, s2: 0, len: 0 }
    }

    /// Restores a checksum from a previously captured [`RollingDigest`].
    #[must_use]
    pub const fn from_digest(digest: RollingDigest) -> Self {
        Self {
            s1: digest.s1 as u32,
            s2: digest.s2 as u32,
            len: digest.len,
        }
    }

    /// Number of bytes currently contributing to the checksum.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes have been observed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extends the window with an additional slice of bytes (one-shot, not
    /// a slide — use [`Self::roll`] to slide a fixed-size window).
    pub fn update(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.s1 = self.s1.wrapping_add(u32::from(byte)) & 0xffff;
            self.s2 = self.s2.wrapping_add(self.s1) & 0xffff;
        }
        self.len += chunk.len();
    }

    /// Slides the window forward by one byte: removes `outgoing` from the
    /// front, appends `incoming` at the back. The window length is
    /// preserved.
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::EmptyWindow`] if no bytes have been observed
    /// yet (there is no window length to preserve).
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        if self.len == 0 {
            return Err(RollingError::EmptyWindow);
        }
        let window_len = self.len as u32;
        let out = u32::from(outgoing);
        let inn = u32::from(incoming);

        let new_s1 = self.s1.wrapping_sub(out).wrapping_add(inn) & 0xffff;
        let new_s2 = self
            .s2
            .wrapping_sub(window_len.wrapping_mul(out))
            .wrapping_add(new_s1)
            & 0xffff;

        self.s1 = new_s1;
        self.s2 = new_s2;
        Ok(())
    }

    /// Rsync's wire representation of the checksum: `(s2 << 16) | s1`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }

    /// Captures the current state as a [`RollingDigest`] checkpoint.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        RollingDigest {
            s1: self.s1 as u16,
            s2: self.s2 as u16,
            len: self.len,
        }
    }
}
