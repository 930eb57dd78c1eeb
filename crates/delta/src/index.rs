use rustc_hash::FxHashMap;

use checksums::strong::{truncate, StrongHash};
use signature::{FileSignature, SignatureBlock};

/// A basis file's signature, indexed by weak checksum for fast candidate
/// lookup during delta generation.
///
/// Only full-length blocks are indexed: the sliding window search always
/// compares windows of exactly `block_length()` bytes, so a basis file's
/// final (possibly shorter) block can never be a match target.
#[derive(Debug, Clone)]
pub struct DeltaSignatureIndex {
    block_len: u32,
    blocks: Vec<SignatureBlock>,
    by_weak: FxHashMap<u32, Vec<usize>>,
}

impl DeltaSignatureIndex {
    /// Builds an index from a basis file's signature.
    ///
    /// Returns `None` if the signature has no full-length blocks at all
    /// (the basis is empty or shorter than one block), since there is
    /// nothing such an index could ever match.
    #[must_use]
    pub fn from_signature(signature: &FileSignature) -> Option<Self> {
        let block_len = signature.layout().block_length().get();
        let mut blocks = Vec::new();
        let mut by_weak: FxHashMap<u32, Vec<usize>> = FxHashMap::default();

        for block in signature.blocks() {
            if block.len() != block_len {
                continue;
            }
            let pos = blocks.len();
            by_weak.entry(block.rolling().value()).or_default().push(pos);
            blocks.push(block.clone());
        }

        if blocks.is_empty() {
            return None;
        }

        Some(Self { block_len, blocks, by_weak })
    }

    /// Builds an index with no matchable blocks at all, for a basis so
    /// short it has no full-length block (`from_signature` returned
    /// `None`). Matching against it always misses, so a caller can feed it
    /// to delta generation uniformly rather than special-casing the
    /// no-basis case: the result is a delta made entirely of literal
    /// tokens.
    #[must_use]
    pub fn empty(block_len: u32) -> Self {
        Self { block_len, blocks: Vec::new(), by_weak: FxHashMap::default() }
    }

    /// The fixed block length every indexed block was computed with.
    #[must_use]
    pub const fn block_length(&self) -> u32 {
        self.block_len
    }

    /// Length in bytes of each block's truncated strong digest, or zero if
    /// the index has no blocks.
    #[must_use]
    pub fn strong_length(&self) -> usize {
        self.blocks.first().map_or(0, |block| block.strong().len())
    }

    /// Looks up a basis block whose weak checksum is `weak` and whose
    /// strong digest matches `window`'s, confirming the candidate against
    /// false-positive weak-checksum collisions.
    ///
    /// `window` must be exactly `block_length()` bytes.
    #[must_use]
    pub fn find(&self, weak: u32, window: &[u8]) -> Option<u64> {
        let candidates = self.by_weak.get(&weak)?;
        let digest = StrongHash::digest(window);
        let truncated = truncate(&digest, self.strong_length());
        candidates
            .iter()
            .map(|&pos| &self.blocks[pos])
            .find(|block| block.strong() == truncated.as_slice())
            .map(SignatureBlock::index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::num::{NonZeroU32, NonZeroU8};

    use signature::{generate_file_signature, SignatureLayout};

    fn sig_for(data: &[u8], block_len: u32) -> FileSignature {
        let layout = SignatureLayout::new(data.len() as u64, NonZeroU32::new(block_len).unwrap());
        generate_file_signature(Cursor::new(data.to_vec()), layout, NonZeroU8::new(16).unwrap()).unwrap()
    }

    #[test]
    fn empty_signature_yields_no_index() {
        let sig = sig_for(b"", 8);
        assert!(DeltaSignatureIndex::from_signature(&sig).is_none());
    }

    #[test]
    fn signature_shorter_than_one_block_yields_no_index() {
        let sig = sig_for(b"short", 100);
        assert!(DeltaSignatureIndex::from_signature(&sig).is_none());
    }

    #[test]
    fn find_locates_matching_window() {
        let data = b"AAAABBBBCCCC";
        let sig = sig_for(data, 4);
        let index = DeltaSignatureIndex::from_signature(&sig).unwrap();

        assert_eq!(index.block_length(), 4);

        let mut rolling = checksums::RollingChecksum::new();
        rolling.update(&data[4..8]);
        let found = index.find(rolling.value(), &data[4..8]);
        assert_eq!(found, Some(1));
    }

    #[test]
    fn find_rejects_weak_collision_without_strong_match() {
        let data = b"AAAABBBBCCCC";
        let sig = sig_for(data, 4);
        let index = DeltaSignatureIndex::from_signature(&sig).unwrap();

        // Same weak value, wrong bytes entirely: strong digest must reject it.
        let mut rolling = checksums::RollingChecksum::new();
        rolling.update(&data[0..4]);
        let found = index.find(rolling.value(), b"ZZZZ");
        assert_eq!(found, None);
    }

    #[test]
    fn empty_index_never_matches() {
        let index = DeltaSignatureIndex::empty(8);
        assert_eq!(index.block_length(), 8);
        assert_eq!(index.strong_length(), 0);
        assert_eq!(index.find(12345, b"AAAAAAAA"), None);
    }

    #[test]
    fn partial_final_block_is_not_indexed() {
        let data = b"AAAABBBBC";
        let sig = sig_for(data, 4);
        let index = DeltaSignatureIndex::from_signature(&sig).unwrap();

        // Only 2 full 4-byte blocks exist (index 0 and 1); no sliding
        // 4-byte window anywhere in `data` should ever resolve to index 2.
        for start in 0..=data.len() - 4 {
            let window = &data[start..start + 4];
            let mut rolling = checksums::RollingChecksum::new();
            rolling.update(window);
            if let Some(found) = index.find(rolling.value(), window) {
                assert!(found < 2);
            }
        }
    }
}
