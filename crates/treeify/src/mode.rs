use wire::{MODE_REG_EXEC, MODE_REG_NONEXEC};

/// `true` if any of the owner/group/other execute bits are set in a raw
/// platform mode.
#[must_use]
pub const fn is_executable(mode: u32) -> bool {
    mode & 0o111 != 0
}

/// The permission bits this engine writes a regular file with:
/// `0755` if the source had any execute bit set, `0644` otherwise.
///
/// Matches the type bits already carried in `MODE_REG_EXEC` /
/// `MODE_REG_NONEXEC` so the result can be applied directly with
/// `fs::Permissions::from_mode`.
#[must_use]
pub const fn derive_regular_mode(source_mode: u32) -> u32 {
    if is_executable(source_mode) {
        MODE_REG_EXEC
    } else {
        MODE_REG_NONEXEC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_execute_bit_selects_exec_mode() {
        assert_eq!(derive_regular_mode(0o100), MODE_REG_EXEC);
        assert_eq!(derive_regular_mode(0o010), MODE_REG_EXEC);
        assert_eq!(derive_regular_mode(0o001), MODE_REG_EXEC);
    }

    #[test]
    fn no_execute_bit_selects_nonexec_mode() {
        assert_eq!(derive_regular_mode(0o644), MODE_REG_NONEXEC);
        assert_eq!(derive_regular_mode(0o666), MODE_REG_NONEXEC);
    }
}
