use crate::{SignatureBlock, SignatureLayout};

/// The complete signature of one file: its block layout plus one
/// [`SignatureBlock`] per block, in index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSignature {
    layout: SignatureLayout,
    blocks: Vec<SignatureBlock>,
    total_bytes: u64,
}

impl FileSignature {
    /// Builds a signature from its already-computed parts.
    #[must_use]
    pub fn from_raw_parts(layout: SignatureLayout, blocks: Vec<SignatureBlock>, total_bytes: u64) -> Self {
        Self { layout, blocks, total_bytes }
    }

    /// The block geometry this signature was computed with.
    #[must_use]
    pub const fn layout(&self) -> SignatureLayout {
        self.layout
    }

    /// The signature's blocks, in index order.
    #[must_use]
    pub fn blocks(&self) -> &[SignatureBlock] {
        &self.blocks
    }

    /// Total number of bytes the signature was computed over.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}
