use std::io::{Read, Seek, SeekFrom, Write};

use crate::wire::read_delta_token;
use crate::{DeltaError, DeltaScript, DeltaSignatureIndex, DeltaToken};

/// Replays `script` against `basis`, writing the reconstructed file to
/// `output`.
///
/// # Errors
///
/// Returns [`DeltaError::Io`] if reading the basis or writing the output
/// fails, and [`DeltaError::InvalidCopyRange`] if a copy token's offset
/// does not fit in a `u64` byte offset.
pub fn apply_delta(
    basis: &mut (impl Read + Seek),
    output: &mut impl Write,
    index: &DeltaSignatureIndex,
    script: &DeltaScript,
) -> Result<(), DeltaError> {
    for token in script.tokens() {
        apply_token(basis, output, index, token)?;
    }
    Ok(())
}

/// Byte totals accumulated while [`apply_delta_stream`] replays a delta —
/// the same breakdown [`DeltaScript::literal_bytes`]/[`DeltaScript::copy_bytes`]
/// give a caller holding the whole script in memory, made available to a
/// caller that never builds one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedStats {
    total_bytes: u64,
    literal_bytes: u64,
}

impl AppliedStats {
    /// Total number of bytes written to the output.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Number of output bytes carried as literals (not found in the basis).
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Number of output bytes reconstructed by copying from the basis.
    #[must_use]
    pub const fn copy_bytes(&self) -> u64 {
        self.total_bytes - self.literal_bytes
    }
}

/// As [`apply_delta`], but decodes tokens one at a time from a serialized
/// stream rather than requiring the whole script to be built in memory
/// first — the shape a receiver applies a delta in as chunks arrive over
/// the wire.
///
/// # Errors
///
/// Returns [`DeltaError::TruncatedToken`] if the stream ends mid-token,
/// and the same basis/output errors as [`apply_delta`].
pub fn apply_delta_stream(
    basis: &mut (impl Read + Seek),
    delta: &mut impl Read,
    output: &mut impl Write,
    index: &DeltaSignatureIndex,
) -> Result<AppliedStats, DeltaError> {
    let mut stats = AppliedStats::default();
    while let Some(token) = read_delta_token(delta)? {
        match &token {
            DeltaToken::Literal(bytes) => {
                stats.literal_bytes += bytes.len() as u64;
                stats.total_bytes += bytes.len() as u64;
            }
            DeltaToken::Copy { len, .. } => stats.total_bytes += u64::from(*len),
        }
        apply_token(basis, output, index, &token)?;
    }
    Ok(stats)
}

fn apply_token(
    basis: &mut (impl Read + Seek),
    output: &mut impl Write,
    index: &DeltaSignatureIndex,
    token: &DeltaToken,
) -> Result<(), DeltaError> {
    match token {
        DeltaToken::Literal(bytes) => {
            output.write_all(bytes)?;
        }
        DeltaToken::Copy { index: block_index, len } => {
            let offset = block_index
                .checked_mul(u64::from(index.block_length()))
                .ok_or(DeltaError::InvalidCopyRange)?;
            basis.seek(SeekFrom::Start(offset))?;
            let mut buf = vec![0u8; *len as usize];
            basis.read_exact(&mut buf)?;
            output.write_all(&buf)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::num::{NonZeroU32, NonZeroU8};

    use proptest::prelude::*;
    use signature::{generate_file_signature, SignatureLayout};

    use crate::generate::generate_delta_slice;
    use crate::wire::write_delta_script;

    fn index_for(basis: &[u8], block_len: u32) -> DeltaSignatureIndex {
        let layout = SignatureLayout::new(basis.len() as u64, NonZeroU32::new(block_len).unwrap());
        let sig = generate_file_signature(Cursor::new(basis.to_vec()), layout, NonZeroU8::new(16).unwrap()).unwrap();
        DeltaSignatureIndex::from_signature(&sig).unwrap()
    }

    #[test]
    fn applying_a_script_reconstructs_the_input() {
        let basis = b"AAAAAAAABBBBBBBBCCCCCCCC".to_vec();
        let mut input = b"AAAAAAAA".to_vec();
        input.extend_from_slice(b"NEWNEWNEWNEW");
        input.extend_from_slice(b"CCCCCCCC");

        let index = index_for(&basis, 8);
        let script = generate_delta_slice(&input, &index);

        let mut output = Vec::new();
        apply_delta(&mut Cursor::new(&basis), &mut output, &index, &script).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn streamed_application_matches_in_memory_application() {
        let basis = b"0123456789abcdef0123456789abcdef".to_vec();
        let input = b"0123456789abcdefZZZZZZZZZZZZZZZZ".to_vec();

        let index = index_for(&basis, 8);
        let script = generate_delta_slice(&input, &index);

        let mut expected = Vec::new();
        apply_delta(&mut Cursor::new(&basis), &mut expected, &index, &script).unwrap();

        let mut encoded = Vec::new();
        write_delta_script(&mut encoded, &script).unwrap();

        let mut streamed = Vec::new();
        let stats = apply_delta_stream(&mut Cursor::new(&basis), &mut Cursor::new(encoded), &mut streamed, &index).unwrap();

        assert_eq!(streamed, expected);
        assert_eq!(streamed, input);
        assert_eq!(stats.total_bytes(), script.total_bytes());
        assert_eq!(stats.literal_bytes(), script.literal_bytes());
        assert_eq!(stats.copy_bytes(), script.copy_bytes());
    }

    #[test]
    fn identical_file_round_trips_through_pure_copies() {
        let data = b"the quick brown fox jumps over the lazy dog again".to_vec();
        let index = index_for(&data, 10);
        let script = generate_delta_slice(&data, &index);

        let mut output = Vec::new();
        apply_delta(&mut Cursor::new(&data), &mut output, &index, &script).unwrap();
        assert_eq!(output, data);
    }

    #[test]
    fn empty_script_produces_empty_output() {
        let basis = b"0123456789abcdef".to_vec();
        let index = index_for(&basis, 8);
        let script = DeltaScript::new(vec![], 0, 0);

        let mut output = Vec::new();
        apply_delta(&mut Cursor::new(&basis), &mut output, &index, &script).unwrap();
        assert!(output.is_empty());
    }

    proptest! {
        #[test]
        fn generate_then_apply_always_reconstructs_the_input(
            basis in prop::collection::vec(any::<u8>(), 0..=200),
            input in prop::collection::vec(any::<u8>(), 0..=200),
            block_len in 1u32..=16,
        ) {
            let layout = SignatureLayout::new(basis.len() as u64, NonZeroU32::new(block_len).unwrap());
            let sig = generate_file_signature(Cursor::new(basis.clone()), layout, NonZeroU8::new(16).unwrap()).unwrap();
            let index = DeltaSignatureIndex::from_signature(&sig).unwrap_or_else(|| DeltaSignatureIndex::empty(block_len));

            let script = generate_delta_slice(&input, &index);

            let mut output = Vec::new();
            apply_delta(&mut Cursor::new(&basis), &mut output, &index, &script).unwrap();

            prop_assert_eq!(output, input);
        }
    }
}
