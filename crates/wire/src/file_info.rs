use std::io::{Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::primitives::{read_string, write_string};
use crate::WireError;

const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFLNK: u32 = 0o120_000;

/// Directory mode applied to every directory this engine creates.
pub const MODE_DIR: u32 = S_IFDIR | 0o755;
/// Regular-file mode applied when the source file had any execute bit set.
pub const MODE_REG_EXEC: u32 = S_IFREG | 0o755;
/// Regular-file mode applied when the source file had no execute bit set.
pub const MODE_REG_NONEXEC: u32 = S_IFREG | 0o644;

/// The file type a [`FileInfo`]'s mode field discriminates between.
///
/// Any other type is a hard protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// A regular file.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
}

impl FileType {
    /// Classifies a raw mode's type bits.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnsupportedMode`] if the type bits do not match
    /// regular, directory, or symlink.
    pub fn from_mode(mode: u32) -> Result<Self, WireError> {
        match mode & S_IFMT {
            S_IFREG => Ok(Self::Regular),
            S_IFDIR => Ok(Self::Directory),
            S_IFLNK => Ok(Self::Symlink),
            _ => Err(WireError::UnsupportedMode(mode)),
        }
    }
}

/// The per-entry descriptor exchanged on the wire during the file-list
/// phase and retained in memory for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Slash-separated path relative to the tree root.
    pub path: String,
    /// Size in bytes; meaningful only for regular files.
    pub size: i64,
    /// Raw mode bitfield: permission bits plus a type discriminator.
    pub mode: u32,
    /// Modification time, seconds since the Unix epoch.
    pub mtime_secs: u64,
    /// Modification time, nanoseconds within the second.
    pub mtime_nanos: u32,
    /// Symlink target, present only when `file_type() == FileType::Symlink`.
    pub link: Option<String>,
}

impl FileInfo {
    /// Builds the sentinel record that terminates the file-list phase.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            path: crate::SENTINEL_PATH.to_string(),
            size: 0,
            mode: 0,
            mtime_secs: 0,
            mtime_nanos: 0,
            link: None,
        }
    }

    /// Returns `true` if this is the end-of-list sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.path == crate::SENTINEL_PATH
    }

    /// Classifies this entry's file type from its mode.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnsupportedMode`] for an unsupported type.
    pub fn file_type(&self) -> Result<FileType, WireError> {
        FileType::from_mode(self.mode)
    }

    /// Modification time as a [`SystemTime`].
    #[must_use]
    pub fn mod_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::new(self.mtime_secs, self.mtime_nanos)
    }
}

/// Writes one `FileInfo` record: `string path`, then the fixed 24-byte
/// `[size][mode][sec][nsec]` block, then `string link` if the mode
/// indicates a symlink.
pub fn write_file_info(w: &mut impl Write, info: &FileInfo) -> Result<(), WireError> {
    write_string(w, &info.path)?;
    w.write_all(&info.size.to_be_bytes())?;
    w.write_all(&info.mode.to_be_bytes())?;
    w.write_all(&info.mtime_secs.to_be_bytes())?;
    w.write_all(&info.mtime_nanos.to_be_bytes())?;
    if !info.is_sentinel() && FileType::from_mode(info.mode) == Ok(FileType::Symlink) {
        write_string(w, info.link.as_deref().unwrap_or(""))?;
    }
    Ok(())
}

/// Reads one `FileInfo` record written by [`write_file_info`].
pub fn read_file_info(r: &mut impl Read) -> Result<FileInfo, WireError> {
    let path = read_string(r)?;

    let mut size_buf = [0u8; 8];
    r.read_exact(&mut size_buf)?;
    let size = i64::from_be_bytes(size_buf);

    let mut mode_buf = [0u8; 4];
    r.read_exact(&mut mode_buf)?;
    let mode = u32::from_be_bytes(mode_buf);

    let mut sec_buf = [0u8; 8];
    r.read_exact(&mut sec_buf)?;
    let mtime_secs = u64::from_be_bytes(sec_buf);

    let mut nsec_buf = [0u8; 4];
    r.read_exact(&mut nsec_buf)?;
    let mtime_nanos = u32::from_be_bytes(nsec_buf);

    let is_sentinel = path == crate::SENTINEL_PATH;
    let link = if !is_sentinel && FileType::from_mode(mode) == Ok(FileType::Symlink) {
        Some(read_string(r)?)
    } else {
        None
    };

    Ok(FileInfo {
        path,
        size,
        mode,
        mtime_secs,
        mtime_nanos,
        link,
    })
}
