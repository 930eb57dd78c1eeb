use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session-wide cooperative cancellation, shared by every pipeline stage.
///
/// Nothing here interrupts a blocking read or write in progress; a stage
/// observes cancellation between items (before taking the next one off a
/// channel, before opening the next file) and unwinds cleanly rather than
/// being torn down mid-operation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Builds a fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Marks the session cancelled. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// `true` once [`Self::cancel`] has been called on this token or any
    /// of its clones.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn cancelling_a_clone_is_visible_on_the_original() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
