//! Non-negotiated protocol parameters.
//!
//! Both peers must agree on these at compile time: there is no handshake
//! that exchanges or negotiates them, so a sender and receiver built from
//! different versions of this crate are not wire-compatible. Keeping them
//! in one place makes that assumption visible rather than scattered across
//! every module that needs a block length or a channel capacity.

use std::num::NonZeroU32;
use std::num::NonZeroU8;

/// Fixed block length used for every file's signature and delta, in bytes.
///
/// Real rsync derives a per-file block length from the square root of the
/// file's size; this engine deliberately does not, since that would make
/// the value something the two peers would need to agree on per file
/// rather than at compile time. A mid-sized fixed block keeps delta
/// overhead low on both tiny config files and large media without any
/// per-file negotiation.
pub const BLOCK_LEN: u32 = 700;

/// Truncated length, in bytes, of each block's strong (MD5) digest.
pub const STRONG_LEN: u8 = 8;

/// Capacity of every bounded channel connecting pipeline stages.
///
/// Small and fixed, the way the engine documentation describes
/// backpressure: a slow consumer stalls its producers once this many
/// items are in flight, rather than letting memory use grow unbounded.
pub const CHANNEL_CAPACITY: usize = 32;

/// Maximum number of bytes carried in a single `signatureData`/`deltaData`
/// wire chunk.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// `BLOCK_LEN` as a [`NonZeroU32`], for APIs that require it.
#[must_use]
pub fn block_len() -> NonZeroU32 {
    NonZeroU32::new(BLOCK_LEN).expect("BLOCK_LEN is a nonzero compile-time constant")
}

/// `STRONG_LEN` as a [`NonZeroU8`], for APIs that require it.
#[must_use]
pub fn strong_len() -> NonZeroU8 {
    NonZeroU8::new(STRONG_LEN).expect("STRONG_LEN is a nonzero compile-time constant")
}

/// Number of worker threads each signature/delta/patch pool runs.
///
/// Sized from the available parallelism rather than a fixed constant, the
/// only one of these parameters that is intentionally host-dependent: it
/// shapes local resource use, not wire compatibility.
#[must_use]
pub fn worker_pool_size() -> usize {
    std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(4)
}
