/// What kind of filesystem object an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// Anything else the platform reports (device, socket, fifo, ...).
    /// Supported entry types are Regular, Directory, and Symlink; callers
    /// that care about protocol validity reject this variant themselves.
    Other,
}

/// The raw stat information gathered for one tree entry.
///
/// This is deliberately a thin wrapper over what the platform reports, not
/// yet a wire `FileInfo`: mode derivation (`0755`/`0644`), skip/up-to-date
/// classification, and local reconciliation policy all live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStat {
    kind: EntryKind,
    len: u64,
    mode: u32,
    modified_secs: u64,
    modified_nanos: u32,
    link_target: Option<String>,
}

impl EntryStat {
    /// Builds a stat record from its already-gathered parts.
    #[must_use]
    pub fn from_raw_parts(
        kind: EntryKind,
        len: u64,
        mode: u32,
        modified_secs: u64,
        modified_nanos: u32,
        link_target: Option<String>,
    ) -> Self {
        Self { kind, len, mode, modified_secs, modified_nanos, link_target }
    }

    /// The entry's type.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Byte length; only meaningful for [`EntryKind::Regular`], zero
    /// otherwise.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Raw platform mode bits (permissions and, on unix, the type bits).
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// `true` if any of the owner/group/other execute bits are set.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.mode & 0o111 != 0
    }

    /// Modification time, seconds since the Unix epoch.
    #[must_use]
    pub const fn modified_secs(&self) -> u64 {
        self.modified_secs
    }

    /// Modification time, nanoseconds within the second.
    #[must_use]
    pub const fn modified_nanos(&self) -> u32 {
        self.modified_nanos
    }

    /// The symlink's target, present only for [`EntryKind::Symlink`].
    #[must_use]
    pub fn link_target(&self) -> Option<&str> {
        self.link_target.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_bit_is_detected_from_any_owner_group_or_other() {
        let exec = EntryStat::from_raw_parts(EntryKind::Regular, 0, 0o100, 0, 0, None);
        let not_exec = EntryStat::from_raw_parts(EntryKind::Regular, 0, 0o644, 0, 0, None);
        assert!(exec.is_executable());
        assert!(!not_exec.is_executable());
    }

    #[test]
    fn link_target_is_absent_for_non_symlinks() {
        let stat = EntryStat::from_raw_parts(EntryKind::Regular, 10, 0o644, 0, 0, None);
        assert_eq!(stat.link_target(), None);
    }
}
