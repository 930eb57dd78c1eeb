use std::io::Read;

use checksums::RollingChecksum;

use crate::{DeltaError, DeltaScript, DeltaSignatureIndex, DeltaToken};

/// Reads all of `input` and produces a script reconstructing it against
/// the basis file `index` was built from.
///
/// # Errors
///
/// Returns [`DeltaError::Io`] if reading `input` fails.
pub fn generate_delta(mut input: impl Read, index: &DeltaSignatureIndex) -> Result<DeltaScript, DeltaError> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    Ok(generate_delta_slice(&data, index))
}

/// As [`generate_delta`], operating directly on an in-memory buffer.
///
/// Slides a window of `index.block_length()` bytes across `data` one byte
/// at a time, using the rolling checksum to avoid recomputing the window's
/// weak sum from scratch on every step. A weak-checksum hit is confirmed
/// against the candidate block's strong digest before being committed as
/// a [`DeltaToken::Copy`]; everything else accumulates as a pending
/// [`DeltaToken::Literal`] run, flushed whenever a copy interrupts it or
/// the input ends.
#[must_use]
pub fn generate_delta_slice(data: &[u8], index: &DeltaSignatureIndex) -> DeltaScript {
    let block_len = index.block_length() as usize;
    let mut tokens = Vec::new();
    let mut literal = Vec::new();
    let mut literal_bytes = 0u64;

    if block_len == 0 || data.len() < block_len {
        if !data.is_empty() {
            literal_bytes = data.len() as u64;
            tokens.push(DeltaToken::Literal(data.to_vec()));
        }
        return DeltaScript::new(tokens, data.len() as u64, literal_bytes);
    }

    let mut pos = 0usize;
    let mut rolling: Option<RollingChecksum> = None;

    while data.len() - pos >= block_len {
        let window = &data[pos..pos + block_len];
        let current = rolling.take().unwrap_or_else(|| {
            let mut r = RollingChecksum::new();
            r.update(window);
            r
        });

        if let Some(block_index) = index.find(current.value(), window) {
            if !literal.is_empty() {
                literal_bytes += literal.len() as u64;
                tokens.push(DeltaToken::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(DeltaToken::Copy { index: block_index, len: block_len as u32 });
            pos += block_len;
            rolling = None;
        } else {
            literal.push(data[pos]);
            let mut next = current;
            next.roll(data[pos], data[pos + block_len])
                .expect("window has a block_len byte count, never empty");
            rolling = Some(next);
            pos += 1;
        }
    }

    literal.extend_from_slice(&data[pos..]);
    if !literal.is_empty() {
        literal_bytes += literal.len() as u64;
        tokens.push(DeltaToken::Literal(literal));
    }

    DeltaScript::new(tokens, data.len() as u64, literal_bytes)
}
