/// One instruction in a [`crate::DeltaScript`]: either bytes that were not
/// found in the basis and must be sent verbatim, or a range of the basis
/// file that can be copied as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaToken {
    /// Bytes with no matching basis block; carried verbatim.
    Literal(Vec<u8>),
    /// A run of `len` bytes starting at basis block `index`.
    Copy {
        /// 0-based basis block index.
        index: u64,
        /// Number of bytes to copy; equal to the basis block length for
        /// every block this matcher can produce (it only matches
        /// full-length blocks), but kept explicit for clarity at the call
        /// site and to allow future fine-grained copies.
        len: u32,
    },
}

impl DeltaToken {
    /// Number of output bytes this token contributes.
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        match self {
            Self::Literal(bytes) => bytes.len() as u64,
            Self::Copy { len, .. } => u64::from(*len),
        }
    }

    /// `true` if this is a [`DeltaToken::Literal`].
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_byte_len_matches_its_bytes() {
        let token = DeltaToken::Literal(vec![1, 2, 3, 4]);
        assert_eq!(token.byte_len(), 4);
        assert!(token.is_literal());
    }

    #[test]
    fn copy_byte_len_matches_its_len_field() {
        let token = DeltaToken::Copy { index: 7, len: 700 };
        assert_eq!(token.byte_len(), 700);
        assert!(!token.is_literal());
    }
}
