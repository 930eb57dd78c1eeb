#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Sender and receiver pipelines for the delta-synchronization protocol.
//!
//! This crate owns the two public entry points a host process calls:
//! [`send_files`] walks a source tree and serves it over a bidirectional
//! stream; [`receive_files`] reads that stream and reconciles a local
//! destination tree to match. Everything else in this crate — the wire
//! codec, checksums, signature and delta math, filesystem walking, and
//! local reconciliation — lives in its own crate; this one only wires
//! those together into the concurrent pipelines the protocol calls for.
//!
//! Both entry points run a small set of worker threads connected by
//! bounded [`crossbeam_channel`]s: a single writer serializes everything
//! onto the outbound stream, a single reader demultiplexes everything
//! arriving on the inbound stream, and fixed-size pools do the
//! signature/delta/patch work in between. See [`params`] for the
//! compile-time constants both peers must agree on, and [`cancel`] for
//! the cooperative cancellation every stage observes.

mod cancel;
mod chunk_pipe;
mod error;
pub mod params;
mod receiver;
mod sender;
mod session;
mod stats;
pub mod transport;

pub use cancel::CancellationToken;
pub use error::EngineError;
pub use receiver::{receive_files, receive_files_with_cancellation};
pub use sender::{send_files, send_files_with_cancellation};
pub use session::{resolve_path, FileTable};
pub use stats::EngineStats;

pub use walk::Traverser;

#[cfg(test)]
mod tests {
    use std::fs;
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    fn read_tree(root: &std::path::Path) -> Vec<(String, Vec<u8>)> {
        let mut out = Vec::new();
        walk::walk(root, &mut |absolute, relative, stat| {
            if stat.kind() == walk::EntryKind::Regular {
                out.push((relative.to_string(), fs::read(absolute).unwrap()));
            }
            Ok(())
        })
        .unwrap();
        out.sort();
        out
    }

    fn run_session(source: &std::path::Path, dest: &std::path::Path) -> (EngineStats, EngineStats) {
        let (sender_half, receiver_half) = transport::duplex().unwrap();
        let (sender_read, sender_write) = sender_half;
        let (receiver_read, receiver_write) = receiver_half;

        let dest = dest.to_path_buf();
        let receiver_handle =
            thread::spawn(move || receive_files(receiver_read, receiver_write, &dest).unwrap());

        let source = source.to_path_buf();
        let sender_stats =
            send_files(sender_read, sender_write, &source, &walk::default_traverser).unwrap();

        let receiver_stats = receiver_handle.join().unwrap();
        (sender_stats, receiver_stats)
    }

    #[test]
    fn empty_to_nonempty_converges() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::write(source.path().join("a.txt"), b"hello\n").unwrap();
        fs::create_dir(source.path().join("dir")).unwrap();
        fs::write(source.path().join("dir/b.txt"), b"world\n").unwrap();

        let (sender_stats, receiver_stats) = run_session(source.path(), dest.path());

        assert_eq!(read_tree(dest.path()), read_tree(source.path()));
        assert_eq!(sender_stats.files_seen, 3);
        assert_eq!(receiver_stats.files_fetched_whole, 2);
    }

    #[test]
    fn pure_deletion_removes_extraneous_entries_only() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::write(source.path().join("keep.txt"), b"keep").unwrap();
        fs::write(dest.path().join("keep.txt"), b"keep").unwrap();
        fs::write(dest.path().join("remove.txt"), b"gone").unwrap();

        let mtime = fs::metadata(source.path().join("keep.txt")).unwrap().modified().unwrap();
        filetime::set_file_mtime(source.path().join("keep.txt"), filetime::FileTime::from_system_time(mtime))
            .unwrap();
        filetime::set_file_mtime(dest.path().join("keep.txt"), filetime::FileTime::from_system_time(mtime)).unwrap();

        let (_sender_stats, receiver_stats) = run_session(source.path(), dest.path());

        assert!(!dest.path().join("remove.txt").exists());
        assert!(dest.path().join("keep.txt").exists());
        assert_eq!(receiver_stats.files_fetched_whole, 0);
        assert_eq!(receiver_stats.files_patched, 0);
    }

    #[test]
    fn type_change_replaces_file_with_symlink() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::write(source.path().join("y"), b"target contents").unwrap();
        std::os::unix::fs::symlink("y", source.path().join("x")).unwrap();
        fs::write(dest.path().join("x"), b"was a regular file").unwrap();

        run_session(source.path(), dest.path());

        let meta = fs::symlink_metadata(dest.path().join("x")).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(fs::read_link(dest.path().join("x")).unwrap().to_str().unwrap(), "y");
    }

    #[test]
    fn idempotent_second_session_transfers_nothing() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::write(source.path().join("a.txt"), b"hello\n").unwrap();
        fs::create_dir(source.path().join("dir")).unwrap();
        fs::write(source.path().join("dir/b.txt"), b"world\n").unwrap();

        run_session(source.path(), dest.path());
        let (_sender_stats, receiver_stats) = run_session(source.path(), dest.path());

        assert_eq!(receiver_stats.files_fetched_whole, 0);
        assert_eq!(receiver_stats.files_patched, 0);
        assert!(receiver_stats.files_skipped >= 2);
    }

    #[test]
    fn source_truncated_to_empty_converges_against_stale_nonempty_destination() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::write(dest.path().join("a.txt"), b"stale contents").unwrap();
        fs::write(source.path().join("a.txt"), b"").unwrap();

        let dest_ft = filetime::FileTime::from_system_time(fs::metadata(dest.path().join("a.txt")).unwrap().modified().unwrap());
        let source_ft = filetime::FileTime::from_unix_time(dest_ft.unix_seconds() + 1, 0);
        filetime::set_file_mtime(source.path().join("a.txt"), source_ft).unwrap();

        let (_sender_stats, receiver_stats) = run_session(source.path(), dest.path());

        assert_eq!(fs::read(dest.path().join("a.txt")).unwrap(), b"");
        assert_eq!(receiver_stats.files_patched, 1);
    }

    #[test]
    fn delta_transfer_patches_a_single_changed_byte() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let content: Vec<u8> = (0..16 * 1024).map(|i| ((i * 2654435761u32) % 256) as u8).collect();
        let mut stale = content.clone();
        stale[15 * 1024] = stale[15 * 1024].wrapping_sub(1);
        fs::write(source.path().join("a.bin"), &content).unwrap();
        fs::write(dest.path().join("a.bin"), &stale).unwrap();

        let dest_mtime = filetime::FileTime::from_system_time(
            fs::metadata(dest.path().join("a.bin")).unwrap().modified().unwrap(),
        );
        let source_mtime = filetime::FileTime::from_unix_time(dest_mtime.unix_seconds() - 60, 0);
        filetime::set_file_mtime(source.path().join("a.bin"), source_mtime).unwrap();

        let (_sender_stats, receiver_stats) = run_session(source.path(), dest.path());

        assert_eq!(fs::read(dest.path().join("a.bin")).unwrap(), content);
        assert_eq!(receiver_stats.files_patched, 1);
        assert_eq!(receiver_stats.files_fetched_whole, 0);

        let converged_mtime = filetime::FileTime::from_system_time(
            fs::metadata(dest.path().join("a.bin")).unwrap().modified().unwrap(),
        );
        assert_eq!(converged_mtime, source_mtime);
    }

    #[test]
    fn cancelling_mid_session_returns_without_hanging_or_panicking() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        for i in 0..32 {
            let name = format!("file-{i:03}.bin");
            let content: Vec<u8> = (0..4096).map(|b| ((b + i) % 251) as u8).collect();
            fs::write(source.path().join(&name), &content).unwrap();
        }

        let (sender_half, receiver_half) = transport::duplex().unwrap();
        let (sender_read, sender_write) = sender_half;
        let (receiver_read, receiver_write) = receiver_half;

        let cancel = CancellationToken::new();
        let receiver_cancel = cancel.clone();
        let dest_path = dest.path().to_path_buf();
        let receiver_handle = thread::spawn(move || {
            receive_files_with_cancellation(receiver_read, receiver_write, &dest_path, &receiver_cancel)
        });

        cancel.cancel();

        let source_path = source.path().to_path_buf();
        let sender_result =
            send_files_with_cancellation(sender_read, sender_write, &source_path, &walk::default_traverser, &cancel);
        assert!(sender_result.is_ok() || matches!(sender_result, Err(EngineError::Cancelled)));

        let (result_tx, result_rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = result_tx.send(receiver_handle.join());
        });
        let joined = result_rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("receiver session did not return promptly after cancellation");
        joined.expect("receiver thread panicked");
    }

    #[test]
    fn many_small_files_converge() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        for i in 0..64 {
            let name = format!("file-{i:03}.bin");
            let content: Vec<u8> = (0..((i % 17) * 37 + 1)).map(|b| (b % 251) as u8).collect();
            fs::write(source.path().join(&name), &content).unwrap();
            if i % 2 == 0 {
                let mut stale = content.clone();
                if let Some(byte) = stale.first_mut() {
                    *byte = byte.wrapping_add(1);
                }
                fs::write(dest.path().join(&name), &stale).unwrap();
            }
        }

        run_session(source.path(), dest.path());
        assert_eq!(read_tree(dest.path()), read_tree(source.path()));
    }
}
