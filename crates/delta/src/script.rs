use crate::DeltaToken;

/// An ordered sequence of [`DeltaToken`]s that reconstructs a file from a
/// basis file plus the literal bytes it carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeltaScript {
    tokens: Vec<DeltaToken>,
    total_bytes: u64,
    literal_bytes: u64,
}

impl DeltaScript {
    /// Builds a script from its tokens and precomputed byte totals.
    #[must_use]
    pub fn new(tokens: Vec<DeltaToken>, total_bytes: u64, literal_bytes: u64) -> Self {
        Self { tokens, total_bytes, literal_bytes }
    }

    /// The script's tokens, in application order.
    #[must_use]
    pub fn tokens(&self) -> &[DeltaToken] {
        &self.tokens
    }

    /// Consumes the script, returning its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<DeltaToken> {
        self.tokens
    }

    /// Total number of bytes the reconstructed file will contain.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Number of bytes carried as literals (not found in the basis).
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Number of bytes reconstructed by copying from the basis.
    #[must_use]
    pub const fn copy_bytes(&self) -> u64 {
        self.total_bytes - self.literal_bytes
    }

    /// `true` if the script has no tokens (the source was empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
