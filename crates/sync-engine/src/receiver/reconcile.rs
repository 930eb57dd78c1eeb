use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crossbeam_channel::Sender;
use treeify::Classification;
use wire::{read_file_info, FileInfo};

use crate::session::{resolve_path, FileTable};
use crate::stats::StatsCollector;
use crate::EngineError;

/// Phase 1: reads `FileInfo` records off `reader` until the sentinel, then
/// deletes whatever under `root` the list did not announce.
///
/// This is the only part of reconciliation that touches `reader`, so it
/// must run to completion before anything else reads phase-2 frames off the
/// same stream. The classification pass that decides what each listed entry
/// needs lives separately in [`classify`], which needs only the table this
/// returns and can run concurrently with the pipeline stages downstream of
/// it — see that function's docs for why it must.
///
/// # Errors
///
/// Returns [`EngineError::Wire`] if a `FileInfo` record is malformed, and
/// [`EngineError::Io`] if reading the list or deleting extraneous entries
/// fails.
pub fn build_table(mut reader: impl Read, root: &Path) -> Result<FileTable, EngineError> {
    let mut table = FileTable::new();
    loop {
        let info: FileInfo = read_file_info(&mut reader)?;
        if info.is_sentinel() {
            break;
        }
        let local_path = resolve_path(root, &info.path);
        table.push(info, local_path);
    }
    tracing::debug!(files = table.len(), "file list received");

    let keep: HashSet<_> = table.iter().map(|(_, _, path)| path.to_path_buf()).collect();
    treeify::delete_extraneous(root, &keep)?;

    Ok(table)
}

/// The classification pass: iterates `table` in id order and decides what
/// each entry needs. Directories and symlinks are materialized here,
/// synchronously, since neither needs anything from the network. An entry
/// needing a whole file is sent on `missing_tx`; one needing a
/// signature/delta exchange is sent on `differing_tx` for the signature
/// worker pool to pick up. Both channels close when this function returns,
/// which is how the downstream worker pools learn classification is done.
///
/// Must be started only after its consumers — the signature worker pool
/// reading `differing_rx` and, transitively through the outbound
/// multiplexer, whatever reads `missing_rx` — are already running. `table`
/// can hold more listed entries than either channel's bounded capacity, and
/// nothing here ever stops to drain a channel it isn't also filling; a
/// `send` on a full channel with no consumer yet spawned deadlocks the
/// whole session permanently once the entry count crosses that capacity.
///
/// A single entry's classification or materialization failure is logged
/// and the entry is skipped rather than aborting the session; this
/// function otherwise cannot fail.
pub fn classify(table: &FileTable, stats: &StatsCollector, missing_tx: Sender<u32>, differing_tx: Sender<u32>) {
    for (id, info, path) in table.iter() {
        stats.record_seen();
        match treeify::classify(info, path) {
            Ok(Classification::Skip) => stats.record_skipped(),
            Ok(Classification::Directory) => {
                if let Err(err) = treeify::materialize_directory(path) {
                    tracing::warn!(id, path = %path.display(), %err, "failed to create directory");
                }
            }
            Ok(Classification::Symlink) => {
                let target = info.link.as_deref().unwrap_or("");
                if let Err(err) = treeify::materialize_symlink(path, target) {
                    tracing::warn!(id, path = %path.display(), %err, "failed to create symlink");
                }
            }
            Ok(Classification::Missing) => {
                let _ = missing_tx.send(id);
            }
            Ok(Classification::Differing) => {
                let _ = differing_tx.send(id);
            }
            Err(err) => {
                tracing::warn!(id, path = %path.display(), %err, "failed to classify entry, skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::thread;

    use crossbeam_channel::unbounded;
    use tempfile::TempDir;
    use wire::{write_file_info, MODE_REG_NONEXEC};

    fn encode(infos: &[FileInfo]) -> Vec<u8> {
        let mut buf = Vec::new();
        for info in infos {
            write_file_info(&mut buf, info).unwrap();
        }
        write_file_info(&mut buf, &FileInfo::sentinel()).unwrap();
        buf
    }

    #[test]
    fn new_file_is_classified_missing() {
        let dir = TempDir::new().unwrap();
        let infos = vec![FileInfo {
            path: "a.txt".to_string(),
            size: 5,
            mode: MODE_REG_NONEXEC,
            mtime_secs: 1,
            mtime_nanos: 0,
            link: None,
        }];
        let buf = encode(&infos);

        let stats = StatsCollector::new();
        let (missing_tx, missing_rx) = unbounded();
        let (differing_tx, differing_rx) = unbounded();
        let table = build_table(Cursor::new(buf), dir.path()).unwrap();
        classify(&table, &stats, missing_tx, differing_tx);

        assert_eq!(table.len(), 1);
        assert_eq!(missing_rx.try_recv().unwrap(), 0);
        assert!(differing_rx.try_recv().is_err());
        assert_eq!(stats.finalize().files_seen, 1);
    }

    #[test]
    fn extraneous_local_file_is_removed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stale.txt"), b"old").unwrap();
        let buf = encode(&[]);

        let stats = StatsCollector::new();
        let (missing_tx, _missing_rx) = unbounded();
        let (differing_tx, _differing_rx) = unbounded();
        let table = build_table(Cursor::new(buf), dir.path()).unwrap();
        classify(&table, &stats, missing_tx, differing_tx);

        assert!(!dir.path().join("stale.txt").exists());
    }

    #[test]
    fn directory_entry_is_materialized_inline() {
        let dir = TempDir::new().unwrap();
        let infos = vec![FileInfo {
            path: "sub".to_string(),
            size: 0,
            mode: wire::MODE_DIR,
            mtime_secs: 1,
            mtime_nanos: 0,
            link: None,
        }];
        let buf = encode(&infos);

        let stats = StatsCollector::new();
        let (missing_tx, missing_rx) = unbounded();
        let (differing_tx, _differing_rx) = unbounded();
        let table = build_table(Cursor::new(buf), dir.path()).unwrap();
        classify(&table, &stats, missing_tx, differing_tx);

        assert!(dir.path().join("sub").is_dir());
        assert!(missing_rx.try_recv().is_err());
    }

    #[test]
    fn classification_does_not_deadlock_past_channel_capacity() {
        let dir = TempDir::new().unwrap();
        let infos: Vec<FileInfo> = (0..(crate::params::CHANNEL_CAPACITY * 3))
            .map(|i| FileInfo {
                path: format!("f-{i:04}.txt"),
                size: 0,
                mode: MODE_REG_NONEXEC,
                mtime_secs: 1,
                mtime_nanos: 0,
                link: None,
            })
            .collect();
        let buf = encode(&infos);

        let stats = StatsCollector::new();
        let (missing_tx, missing_rx) = crossbeam_channel::bounded(crate::params::CHANNEL_CAPACITY);
        let (differing_tx, _differing_rx) = crossbeam_channel::bounded(crate::params::CHANNEL_CAPACITY);
        let table = build_table(Cursor::new(buf), dir.path()).unwrap();

        // Every entry here is brand new, so every one lands on missing_tx.
        // With no consumer draining missing_rx, classify must still return
        // rather than blocking forever on the channel once it fills past
        // capacity.
        let handle = thread::spawn(move || classify(&table, &stats, missing_tx, differing_tx));
        let mut drained = 0;
        while drained < infos.len() {
            if missing_rx.recv_timeout(std::time::Duration::from_secs(5)).is_err() {
                break;
            }
            drained += 1;
        }
        handle.join().unwrap();
        assert_eq!(drained, infos.len());
    }
}
