use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use wire::{FileInfo, FileType};

use crate::TreeifyError;

/// What a receiver must do with one incoming [`FileInfo`], having compared
/// it against whatever currently lives at its local path.
///
/// This mirrors the file state machine in the wire-protocol's §4.6:
/// `Skip` and the two immediate-materialization variants are terminal by
/// themselves, while `Missing` and `Differing` mean the caller still has
/// to drive a whole-file fetch or a signature/delta round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The local entry already matches; no action needed.
    Skip,
    /// Create the directory (idempotent: absent locally, or the local
    /// entry was the wrong type and has already been removed).
    Directory,
    /// Create or replace the symlink to match the incoming target.
    Symlink,
    /// No usable local copy exists; the whole file must be fetched.
    Missing,
    /// A local copy exists but its content may differ; exchange a
    /// signature and apply a delta.
    Differing,
}

enum LocalEntry {
    Regular { len: u64, mtime_secs: i64, mtime_nanos: i64 },
    Directory,
    Symlink { target: String },
    Other,
}

fn local_entry(path: &Path) -> Result<Option<LocalEntry>, TreeifyError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(TreeifyError::io(path, err)),
    };

    let file_type = meta.file_type();
    if file_type.is_symlink() {
        let target = fs::read_link(path).map_err(|err| TreeifyError::io(path, err))?;
        let target = target.to_string_lossy().into_owned();
        Ok(Some(LocalEntry::Symlink { target }))
    } else if file_type.is_dir() {
        Ok(Some(LocalEntry::Directory))
    } else if file_type.is_file() {
        Ok(Some(LocalEntry::Regular {
            len: meta.len(),
            mtime_secs: meta.mtime(),
            mtime_nanos: meta.mtime_nsec(),
        }))
    } else {
        Ok(Some(LocalEntry::Other))
    }
}

fn remove_entry(path: &Path, entry: &LocalEntry) -> Result<(), TreeifyError> {
    match entry {
        LocalEntry::Directory => fs::remove_dir_all(path),
        LocalEntry::Regular { .. } | LocalEntry::Symlink { .. } | LocalEntry::Other => fs::remove_file(path),
    }
    .map_err(|err| TreeifyError::io(path, err))
}

/// Decides what a receiver must do with `file` at `local_path`, given
/// whatever currently exists there.
///
/// When a mismatched-type or empty-regular-file local entry blocks
/// materialization, it is removed as a side effect before returning the
/// classification that follows from its absence — matching §4.3 item 2's
/// "removed and reclassified as missing" rule.
///
/// # Errors
///
/// Returns [`TreeifyError::UnsupportedMode`] if `file`'s mode does not
/// decode to a supported type, and [`TreeifyError::Io`] if stat, readlink,
/// or the removal of a blocking local entry fails.
pub fn classify(file: &FileInfo, local_path: &Path) -> Result<Classification, TreeifyError> {
    let file_type = file.file_type().map_err(|_| TreeifyError::UnsupportedMode(file.mode))?;
    let existing = local_entry(local_path)?;

    match file_type {
        FileType::Directory => match existing {
            Some(LocalEntry::Directory) => Ok(Classification::Skip),
            Some(other) => {
                remove_entry(local_path, &other)?;
                Ok(Classification::Directory)
            }
            None => Ok(Classification::Directory),
        },
        FileType::Symlink => {
            let wants = file.link.as_deref().unwrap_or("");
            match existing {
                Some(LocalEntry::Symlink { target }) if target == wants => Ok(Classification::Skip),
                Some(_) => Ok(Classification::Symlink),
                None => Ok(Classification::Symlink),
            }
        }
        FileType::Regular => match existing {
            Some(LocalEntry::Regular { len, mtime_secs, mtime_nanos })
                if len == file.size.max(0) as u64
                    && mtime_secs == file.mtime_secs as i64
                    && mtime_nanos == file.mtime_nanos as i64 =>
            {
                Ok(Classification::Skip)
            }
            Some(LocalEntry::Regular { len, .. }) if len == 0 => {
                remove_entry(local_path, &LocalEntry::Regular { len: 0, mtime_secs: 0, mtime_nanos: 0 })?;
                Ok(Classification::Missing)
            }
            Some(LocalEntry::Regular { .. }) => Ok(Classification::Differing),
            Some(other) => {
                remove_entry(local_path, &other)?;
                Ok(Classification::Missing)
            }
            None => Ok(Classification::Missing),
        },
    }
}
