//! One running SDK per app id per process.
//!
//! Two sessions for the same app would each own a call guard, so both
//! could register the device and race to persist the player id. `start`
//! claims the app id here first; the claim lives as long as any
//! [`GameThrive`](crate::GameThrive) handle does.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::AbortHandle;

static RUNNING: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// A claimed app id. Dropping it stops the channel event loop and frees
/// the app id for the next `start`.
#[derive(Debug)]
pub(crate) struct InstanceClaim {
    app_id: String,
    event_loop: Mutex<Option<AbortHandle>>,
}

impl InstanceClaim {
    /// Claims `app_id`, or returns `None` if an SDK for it is running.
    pub(crate) fn acquire(app_id: &str) -> Option<Self> {
        if !lock(&RUNNING).insert(app_id.to_string()) {
            return None;
        }
        Some(Self {
            app_id: app_id.to_string(),
            event_loop: Mutex::new(None),
        })
    }

    /// Ties the event loop task to this claim.
    pub(crate) fn attach_event_loop(&self, handle: AbortHandle) {
        *lock(&self.event_loop) = Some(handle);
    }
}

impl Drop for InstanceClaim {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.event_loop).take() {
            handle.abort();
        }
        lock(&RUNNING).remove(&self.app_id);
        tracing::debug!(app_id = %self.app_id, "SDK instance released");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_same_app_twice_returns_none() {
        let claim = InstanceClaim::acquire("instance-test-a");
        assert!(claim.is_some());
        assert!(InstanceClaim::acquire("instance-test-a").is_none());
    }

    #[test]
    fn test_acquire_after_drop_succeeds() {
        drop(InstanceClaim::acquire("instance-test-b"));
        assert!(InstanceClaim::acquire("instance-test-b").is_some());
    }

    #[test]
    fn test_acquire_other_app_succeeds() {
        let _first = InstanceClaim::acquire("instance-test-c");
        assert!(InstanceClaim::acquire("instance-test-d").is_some());
    }
}
