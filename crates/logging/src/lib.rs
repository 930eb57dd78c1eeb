#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Thin `tracing` initialization for the delta-synchronization engine.
//!
//! This crate carries no logic of its own: it installs a global
//! `tracing_subscriber::fmt` subscriber once per process, honoring
//! `RUST_LOG` (or a caller-supplied default filter), and gets out of the
//! way. Every stage in `sync-engine`'s pipelines emits spans and events
//! through `tracing` directly; nothing here is load-bearing for
//! correctness, only for observability.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a global `tracing` subscriber reading its level filter from
/// `RUST_LOG`, falling back to `default_filter` (e.g. `"info"`) when the
/// environment variable is unset.
///
/// Safe to call more than once (including concurrently, and including
/// from tests run in the same process): only the first call installs a
/// subscriber, every later call is a no-op.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
