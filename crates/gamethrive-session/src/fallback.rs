//! The one-shot fallback timer.

use tokio::task::AbortHandle;

/// A handle to an armed fallback timer task.
///
/// Dropping the handle does NOT cancel the timer; only [`cancel`] does.
/// The session cancels it when a session call succeeds; a failed call
/// leaves it armed so it can still force a retry.
///
/// [`cancel`]: FallbackTimer::cancel
#[derive(Debug)]
pub(crate) struct FallbackTimer {
    handle: AbortHandle,
}

impl FallbackTimer {
    pub fn new(handle: AbortHandle) -> Self {
        Self { handle }
    }

    /// Stops the timer if it hasn't fired yet.
    pub fn cancel(self) {
        self.handle.abort();
    }
}
