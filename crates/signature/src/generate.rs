use std::io::Read;
use std::num::NonZeroU8;

use checksums::strong::{self, StrongHash};
use checksums::RollingChecksum;

use crate::{FileSignature, SignatureBlock, SignatureError, SignatureLayout};

/// Reads `reader` block by block according to `layout` and builds its
/// signature, truncating each block's strong digest to `strong_len` bytes.
///
/// Blocks are read sequentially and each block's checksums are computed
/// independently (no sliding window across block boundaries — that is the
/// delta generator's job, not the signature's).
///
/// # Errors
///
/// Returns [`SignatureError::Io`] if `reader` ends before `layout`'s block
/// count has been satisfied, and [`SignatureError::TrailingData`] if bytes
/// remain after the last block.
pub fn generate_file_signature(
    mut reader: impl Read,
    layout: SignatureLayout,
    strong_len: NonZeroU8,
) -> Result<FileSignature, SignatureError> {
    let strong_len = (strong_len.get() as usize).min(strong::DIGEST_LEN);
    let mut blocks = Vec::with_capacity(layout.block_count() as usize);
    let mut total_bytes = 0u64;

    for index in 0..layout.block_count() {
        let block_len = layout.block_len_at(index) as usize;
        let mut buf = vec![0u8; block_len];
        reader.read_exact(&mut buf)?;
        total_bytes += buf.len() as u64;

        let mut rolling = RollingChecksum::new();
        rolling.update(&buf);

        let digest = StrongHash::digest(&buf);
        let truncated = strong::truncate(&digest, strong_len);

        blocks.push(SignatureBlock::from_raw_parts(
            index,
            block_len as u32,
            rolling.digest(),
            truncated,
        ));
    }

    let mut probe = [0u8; 1];
    if reader.read(&mut probe)? != 0 {
        return Err(SignatureError::TrailingData);
    }

    Ok(FileSignature::from_raw_parts(layout, blocks, total_bytes))
}
