use std::io::{BufWriter, Write};
use std::path::Path;

use walk::Traverser;
use wire::{write_file_info, FileInfo};

use crate::session::FileTable;
use crate::stats::StatsCollector;
use crate::EngineError;

/// The visit callback's signature only allows a [`walk::WalkError`], but
/// real failures here are wire/I/O errors stashed in `error` by the
/// caller; this just signals the walk to stop.
fn abort(path: &Path) -> walk::WalkError {
    walk::WalkError::Io { path: path.to_path_buf(), source: std::io::Error::other("aborted") }
}

/// Walks `root` with `traverser`, writing one `FileInfo` record per entry
/// to `writer` and building the in-memory [`FileTable`] the rest of the
/// session addresses entries by.
///
/// This is phase 1: unidirectional, run to completion before any phase-2
/// stage starts, terminated by the sentinel record.
///
/// # Errors
///
/// Returns [`EngineError::Wire`] if an entry's mode does not decode to a
/// supported file type, and [`EngineError::Io`] if the walk or the write
/// fails.
pub fn emit_file_list(
    writer: &mut impl Write,
    root: &Path,
    traverser: &Traverser<'_>,
    stats: &StatsCollector,
) -> Result<FileTable, EngineError> {
    let mut writer = BufWriter::new(writer);
    let mut table = FileTable::new();
    let mut error: Option<EngineError> = None;

    let walk_result = traverser(root, &mut |absolute, relative, stat| {
        let info = FileInfo {
            path: relative.to_string(),
            size: stat.len() as i64,
            mode: stat.mode(),
            mtime_secs: stat.modified_secs(),
            mtime_nanos: stat.modified_nanos(),
            link: stat.link_target().map(str::to_string),
        };

        if let Err(err) = info.file_type() {
            error = Some(err.into());
            return Err(abort(absolute));
        }

        if let Err(err) = write_file_info(&mut writer, &info) {
            error = Some(err.into());
            return Err(abort(absolute));
        }

        table.push(info, absolute.to_path_buf());
        stats.record_seen();
        tracing::trace!(path = relative, "announced file-list entry");
        Ok(())
    });

    if let Some(err) = error {
        return Err(err);
    }
    walk_result.map_err(|err| EngineError::Io(std::io::Error::other(err.to_string())))?;

    write_file_info(&mut writer, &FileInfo::sentinel())?;
    writer.flush()?;
    tracing::debug!(files = table.len(), "file list emitted");
    Ok(table)
}
