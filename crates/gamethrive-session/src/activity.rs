//! Foreground activity tracking.
//!
//! The SDK reports how long the app spent in the foreground. Time is
//! counted in whole seconds from "last observed" to each suspend or close,
//! added to a durable counter, and sent to the backend in an activity
//! ping when the app comes back (and once at startup).
//!
//! ```text
//!   resume ──→ [foreground] ──→ suspend/close
//!     │             │                 │
//!     │             │                 └─ counter += whole seconds
//!     └─ last_observed = now, then report() if counter ≥ threshold
//! ```
//!
//! The counter lives in the identity store rather than in memory: the
//! process may be killed at any point after a suspend, and the seconds
//! counted so far must still be reported on the next launch.

use std::time::Duration;

use gamethrive_backend::{Backend, BackendRequest, Endpoint};
use gamethrive_platform::{IdentityStore, StoredValue, keys};
use gamethrive_protocol::ActivityPing;
use tokio::time::Instant;

use crate::RegistrationSession;

/// What a call to [`ActivityTracker::report`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingOutcome {
    /// No player id yet; nothing sent.
    NotRegistered,
    /// Accumulated time (in seconds) is below the threshold; kept.
    BelowThreshold(u64),
    /// Another ping is awaiting its response; this one was skipped.
    InFlight,
    /// A ping reporting this many seconds succeeded.
    Sent(u64),
    /// The ping failed; the accumulated time is kept for next time.
    Failed,
}

/// Counts foreground seconds and reports them.
///
/// Shares state with the [`RegistrationSession`] it was built from: the
/// player id comes from there, and the clock and in-flight flag live
/// under the session's lock.
pub struct ActivityTracker<B: Backend> {
    session: RegistrationSession<B>,
}

impl<B: Backend> Clone for ActivityTracker<B> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<B: Backend> ActivityTracker<B> {
    pub fn new(session: RegistrationSession<B>) -> Self {
        Self { session }
    }

    /// The app is being suspended. Counts the foreground time so far.
    pub async fn on_suspend(&self) {
        self.record_foreground_time().await;
    }

    /// The app is closing. Same bookkeeping as a suspend.
    pub async fn on_close(&self) {
        self.record_foreground_time().await;
    }

    /// The app is back in the foreground. Restarts the clock and reports
    /// accumulated time if there's enough of it.
    pub async fn on_resume(&self) -> PingOutcome {
        self.session.lock_state().await.activity.last_observed = Instant::now();
        self.report().await
    }

    /// Seconds counted but not yet reported.
    pub async fn accumulated_secs(&self) -> u64 {
        let _state = self.session.lock_state().await;
        self.stored_counter()
    }

    async fn record_foreground_time(&self) {
        let mut state = self.session.lock_state().await;
        let now = Instant::now();
        let secs = now
            .saturating_duration_since(state.activity.last_observed)
            .as_secs();
        if secs == 0 {
            return;
        }

        // Advance by whole seconds only, so the fractional remainder is
        // counted next time instead of dropped.
        state.activity.last_observed += Duration::from_secs(secs);
        let total = self.stored_counter().saturating_add(secs);
        self.session.persist(keys::ACTIVE_TIME, StoredValue::Counter(total));
        tracing::debug!(secs, total, "foreground time recorded");
    }

    /// Sends an activity ping if a player id is known and at least the
    /// configured threshold of seconds has accumulated.
    ///
    /// On success only the reported amount is subtracted from the
    /// counter, so seconds recorded while the ping was in flight are kept.
    pub async fn report(&self) -> PingOutcome {
        let (request, reported) = {
            let mut state = self.session.lock_state().await;

            if state.activity.ping_in_flight {
                tracing::debug!("activity ping already in flight, skipped");
                return PingOutcome::InFlight;
            }
            let Some(player_id) = state.player_id.clone() else {
                return PingOutcome::NotRegistered;
            };

            let accumulated = self.stored_counter();
            if accumulated < self.session.config().ping_threshold_secs {
                tracing::debug!(accumulated, "activity below ping threshold");
                return PingOutcome::BelowThreshold(accumulated);
            }

            let request = match BackendRequest::put(
                Endpoint::OnFocus(player_id),
                &ActivityPing::new(accumulated),
            ) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "could not build activity ping");
                    return PingOutcome::Failed;
                }
            };

            state.activity.ping_in_flight = true;
            state.activity.last_observed = Instant::now();
            (request, accumulated)
        };

        let result = self.session.backend().execute(request).await;

        let _state_guard = {
            let mut state = self.session.lock_state().await;
            state.activity.ping_in_flight = false;
            state
        };

        match result {
            Ok(_) => {
                let remaining = self.stored_counter().saturating_sub(reported);
                if remaining == 0 {
                    if let Err(e) = self.session.store().remove(keys::ACTIVE_TIME) {
                        tracing::warn!(error = %e, "failed to clear active time");
                    }
                } else {
                    self.session
                        .persist(keys::ACTIVE_TIME, StoredValue::Counter(remaining));
                }
                tracing::info!(active_time = reported, "activity reported");
                PingOutcome::Sent(reported)
            }
            Err(e) => {
                tracing::warn!(error = %e, active_time = reported, "activity ping failed, time kept");
                PingOutcome::Failed
            }
        }
    }

    /// Reads the stored counter. Callers hold the session lock. A missing
    /// or unreadable counter counts as zero.
    fn stored_counter(&self) -> u64 {
        match self.session.store().counter(keys::ACTIVE_TIME) {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read active time, starting from zero");
                0
            }
        }
    }
}
