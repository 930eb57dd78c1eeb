use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Summary counters returned by [`crate::send_files`] and
/// [`crate::receive_files`] once a session completes.
///
/// These describe what the *receiver's* classification and patch stages
/// did; a sender-side call still returns one, but most fields stay zero
/// since the sender never classifies or patches anything itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Entries the file list announced.
    pub files_seen: u64,
    /// Entries classified [`treeify::Classification::Skip`].
    pub files_skipped: u64,
    /// Entries fetched as a whole file.
    pub files_fetched_whole: u64,
    /// Entries reconciled via a signature/delta exchange.
    pub files_patched: u64,
    /// Total bytes carried as delta literal payload.
    pub literal_bytes: u64,
    /// Total bytes reconstructed by copying from a local basis file.
    pub delta_copy_bytes: u64,
}

/// Thread-safe accumulator for [`EngineStats`], shared by every worker in
/// a session's pipelines.
#[derive(Clone, Debug, Default)]
pub struct StatsCollector(Arc<Counters>);

#[derive(Debug, Default)]
struct Counters {
    files_seen: AtomicU64,
    files_skipped: AtomicU64,
    files_fetched_whole: AtomicU64,
    files_patched: AtomicU64,
    literal_bytes: AtomicU64,
    delta_copy_bytes: AtomicU64,
}

impl StatsCollector {
    /// Builds a fresh, all-zero collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more entry seen in the file list.
    pub fn record_seen(&self) {
        self.0.files_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one entry that needed no action.
    pub fn record_skipped(&self) {
        self.0.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one entry fetched as a whole file.
    pub fn record_fetched_whole(&self) {
        self.0.files_fetched_whole.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one entry reconciled by patching, plus its delta's literal
    /// and copy byte counts.
    pub fn record_patched(&self, literal_bytes: u64, copy_bytes: u64) {
        self.0.files_patched.fetch_add(1, Ordering::Relaxed);
        self.0.literal_bytes.fetch_add(literal_bytes, Ordering::Relaxed);
        self.0.delta_copy_bytes.fetch_add(copy_bytes, Ordering::Relaxed);
    }

    /// Snapshots the current counters into an [`EngineStats`].
    #[must_use]
    pub fn finalize(&self) -> EngineStats {
        EngineStats {
            files_seen: self.0.files_seen.load(Ordering::Relaxed),
            files_skipped: self.0.files_skipped.load(Ordering::Relaxed),
            files_fetched_whole: self.0.files_fetched_whole.load(Ordering::Relaxed),
            files_patched: self.0.files_patched.load(Ordering::Relaxed),
            literal_bytes: self.0.literal_bytes.load(Ordering::Relaxed),
            delta_copy_bytes: self.0.delta_copy_bytes.load(Ordering::Relaxed),
        }
    }
}
