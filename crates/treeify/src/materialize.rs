use std::fs::{self, File};
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use filetime::{set_file_mtime, FileTime};
use wire::MODE_DIR;

use crate::mode::derive_regular_mode;
use crate::TreeifyError;

/// Creates `path` as a directory, `mkdir -p`-style: parents are created as
/// needed, and an already-existing directory is not an error. Always ends
/// up mode `0755` regardless of any prior mode.
///
/// # Errors
///
/// Returns [`TreeifyError::Io`] if directory creation or the permission
/// change fails.
pub fn materialize_directory(path: &Path) -> Result<(), TreeifyError> {
    fs::create_dir_all(path).map_err(|err| TreeifyError::io(path, err))?;
    fs::set_permissions(path, fs::Permissions::from_mode(MODE_DIR & 0o777))
        .map_err(|err| TreeifyError::io(path, err))?;
    Ok(())
}

/// Creates `path` as a symlink to `target`, removing whatever (file,
/// directory, or stale symlink) currently occupies `path` first.
///
/// This replacement is not atomic: a concurrent reader of `path` can
/// briefly observe it absent between the removal and the new `symlink`
/// call. That is a known, deliberately preserved limitation (see the
/// protocol design notes on symlink replacement).
///
/// # Errors
///
/// Returns [`TreeifyError::Io`] if removing the existing entry or creating
/// the new symlink fails.
pub fn materialize_symlink(path: &Path, target: &str) -> Result<(), TreeifyError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(|err| TreeifyError::io(path, err))?,
        Ok(_) => fs::remove_file(path).map_err(|err| TreeifyError::io(path, err))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(TreeifyError::io(path, err)),
    }
    std::os::unix::fs::symlink(target, path).map_err(|err| TreeifyError::io(path, err))
}

/// Creates `path` fresh and copies exactly `size` bytes from `reader` into
/// it, then sets its mode from `source_mode` (`0755`/`0644`) and its mtime
/// from `(mtime_secs, mtime_nanos)`.
///
/// # Errors
///
/// Returns [`TreeifyError::Io`] if creating the file, copying, or setting
/// permissions/mtime fails, including a short read (fewer than `size`
/// bytes available from `reader`). On a short read the caller is
/// responsible for draining any remaining declared bytes off the wire so
/// the stream stays framed; this function does not know about the wire.
pub fn create_whole_file(
    path: &Path,
    reader: &mut impl Read,
    size: u64,
    source_mode: u32,
    mtime_secs: u64,
    mtime_nanos: u32,
) -> Result<(), TreeifyError> {
    let mut file = File::create(path).map_err(|err| TreeifyError::io(path, err))?;
    let copied = io::copy(&mut reader.take(size), &mut file).map_err(|err| TreeifyError::io(path, err))?;
    if copied != size {
        return Err(TreeifyError::io(
            path,
            io::Error::new(io::ErrorKind::UnexpectedEof, format!("copied {copied} of {size} declared bytes")),
        ));
    }
    fs::set_permissions(path, fs::Permissions::from_mode(derive_regular_mode(source_mode) & 0o777))
        .map_err(|err| TreeifyError::io(path, err))?;
    set_mtime(path, mtime_secs, mtime_nanos)?;
    Ok(())
}

/// Writes a new version of `dest` via a sibling temporary file, atomically
/// renaming it over `dest` on success, rather than truncating `dest` in
/// place. `write` receives the open temp file to fill with content; this
/// function applies the mode and renames afterward.
///
/// # Errors
///
/// Returns [`TreeifyError::Io`] if creating the temp file, running
/// `write`, setting permissions, or the final rename fails. On failure the
/// temp file is removed and `dest` is left untouched.
pub fn replace_with_temp_file(
    dest: &Path,
    source_mode: u32,
    write: impl FnOnce(&mut File) -> io::Result<()>,
) -> Result<(), TreeifyError> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(
        ".{}.rsync-tmp-{}",
        dest.file_name().and_then(|n| n.to_str()).unwrap_or("tmp"),
        std::process::id()
    ));

    let result = (|| -> io::Result<()> {
        let mut tmp = File::create(&tmp_path)?;
        write(&mut tmp)?;
        tmp.set_permissions(fs::Permissions::from_mode(derive_regular_mode(source_mode) & 0o777))?;
        drop(tmp);
        fs::rename(&tmp_path, dest)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result.map_err(|err| TreeifyError::io(dest, err))
}

/// Sets `path`'s modification time from a wire `(seconds, nanoseconds)`
/// pair.
///
/// # Errors
///
/// Returns [`TreeifyError::Io`] if the underlying `utimes`-family call
/// fails.
pub fn set_mtime(path: &Path, secs: u64, nanos: u32) -> Result<(), TreeifyError> {
    let time = FileTime::from_unix_time(secs as i64, nanos);
    set_file_mtime(path, time).map_err(|err| TreeifyError::io(path, err))
}
