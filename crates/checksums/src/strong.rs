//! Strong per-block digest used to confirm a weak-checksum match.
//!
//! A single algorithm (MD5) is used throughout; unlike upstream rsync this
//! engine has no protocol negotiation, so there is nothing to select
//! between.

use digest::Digest;

/// Number of bytes in a full-length strong digest.
pub const DIGEST_LEN: usize = 16;

/// Streaming MD5 hasher used for both signature blocks and whole-block
/// verification during delta application.
#[derive(Clone, Debug, Default)]
pub struct StrongHash {
    inner: md5::Md5,
}

impl StrongHash {
    /// Creates a hasher with empty state.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: md5::Md5::new() }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalizes the digest, consuming the hasher.
    #[must_use]
    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        self.inner.finalize().into()
    }

    /// Computes the digest for `data` in one call.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Truncates a full digest to the first `strong_len` bytes, matching the
/// wire's per-session `strongLen` parameter.
#[must_use]
pub fn truncate(digest: &[u8; DIGEST_LEN], strong_len: usize) -> Vec<u8> {
    let len = strong_len.min(DIGEST_LEN);
    digest[..len].to_vec()
}
