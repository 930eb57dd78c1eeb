use checksums::RollingDigest;

/// One fixed-size (except possibly the last) block's fingerprint: its
/// weak rolling checksum plus a truncated strong digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    index: u64,
    byte_len: u32,
    rolling: RollingDigest,
    strong: Vec<u8>,
}

impl SignatureBlock {
    /// Builds a block from its already-computed parts.
    #[must_use]
    pub fn from_raw_parts(index: u64, byte_len: u32, rolling: RollingDigest, strong: Vec<u8>) -> Self {
        Self { index, byte_len, rolling, strong }
    }

    /// This block's 0-based position within the file.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Number of source bytes this block covers.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.byte_len
    }

    /// `true` if this block covers zero bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.byte_len == 0
    }

    /// The block's weak rolling checksum.
    #[must_use]
    pub const fn rolling(&self) -> RollingDigest {
        self.rolling
    }

    /// The block's truncated strong digest.
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }
}
